use super::*;

fn run(whitelist: &[&str], chunks: &[&str]) -> Vec<XmlEvent> {
    let mut parser = Parser::new(whitelist.iter().copied());
    let mut events = Vec::new();
    for chunk in chunks {
        parser.write(chunk, |e| events.push(e));
    }
    parser.close(|e| events.push(e));
    events
}

#[test]
fn splits_think_tag_from_content() {
    let events = run(&["think"], &["<think>pondering</think>Answer: 42"]);
    assert_eq!(
        events,
        vec![
            XmlEvent::OpenTag("think".into()),
            XmlEvent::Text("p".into()),
            XmlEvent::Text("o".into()),
            XmlEvent::Text("n".into()),
            XmlEvent::Text("d".into()),
            XmlEvent::Text("e".into()),
            XmlEvent::Text("r".into()),
            XmlEvent::Text("i".into()),
            XmlEvent::Text("n".into()),
            XmlEvent::Text("g".into()),
            XmlEvent::CloseTag("think".into()),
            XmlEvent::Text("A".into()),
            XmlEvent::Text("n".into()),
            XmlEvent::Text("s".into()),
            XmlEvent::Text("w".into()),
            XmlEvent::Text("e".into()),
            XmlEvent::Text("r".into()),
            XmlEvent::Text(":".into()),
            XmlEvent::Text(" ".into()),
            XmlEvent::Text("4".into()),
            XmlEvent::Text("2".into()),
        ]
    );
}

fn text_of(events: &[XmlEvent]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            XmlEvent::Text(s) => Some(s.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn arbitrary_chunk_boundaries_reconstruct_same_text() {
    let whole = run(&["think"], &["<think>pondering</think>Answer: 42"]);
    let chunked = run(
        &["think"],
        &["<thi", "nk>pon", "deri", "ng</th", "ink>An", "swer: 42"],
    );
    assert_eq!(text_of(&whole), text_of(&chunked));
    let whole_tags: Vec<_> = whole.iter().filter(|e| !matches!(e, XmlEvent::Text(_))).collect();
    let chunked_tags: Vec<_> = chunked.iter().filter(|e| !matches!(e, XmlEvent::Text(_))).collect();
    assert_eq!(whole_tags, chunked_tags);
}

#[test]
fn non_whitelisted_tag_degrades_to_text() {
    let events = run(&["think"], &["<b>bold</b>"]);
    assert_eq!(text_of(&events), "<b>bold</b>");
}

#[test]
fn self_closing_tag_emits_open_then_close() {
    let events = run(&["think"], &["before<think/>after"]);
    assert!(events.contains(&XmlEvent::OpenTag("think".into())));
    assert!(events.contains(&XmlEvent::CloseTag("think".into())));
    assert_eq!(text_of(&events), "beforeafter");
}

#[test]
fn invalid_tag_start_preserves_bytes() {
    let events = run(&["think"], &["a < b and <think>c</think>"]);
    assert_eq!(text_of(&events), "a < b and c");
    assert!(events.contains(&XmlEvent::OpenTag("think".into())));
}

#[test]
fn close_flushes_pending_partial_tag_as_text() {
    let mut parser = Parser::new(["think"]);
    let mut events = Vec::new();
    parser.write("hello <thi", |e| events.push(e));
    parser.close(|e| events.push(e));
    assert_eq!(text_of(&events), "hello <thi");
}

#[test]
#[should_panic]
fn write_after_close_panics() {
    let mut parser = Parser::new(["think"]);
    parser.close(|_| {});
    parser.write("oops", |_| {});
}
