//! A character-fed, whitelist-gated streaming XML-tag splitter.
//!
//! The agent loop uses this to lift `<think>...</think>` content out of an
//! assistant's streamed text into a separate reasoning channel without ever
//! buffering the surrounding content. It only understands bare open/close
//! tags from a fixed whitelist — not general XML/HTML.

use std::mem;

/// States of the tag-splitting state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Outside any tag; ordinary text is flowing through.
    Text,
    /// Just saw `<`; about to decide open vs close vs "not a tag after all".
    TagStart,
    /// Accumulating an opening tag name, e.g. `<thi`.
    OpeningTag,
    /// Accumulating a closing tag name, e.g. `</thi`.
    ClosingTag,
}

/// Events emitted while feeding the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    Text(String),
    OpenTag(String),
    CloseTag(String),
}

/// Incremental callback-driven splitter. Feed it chunks with [`write`](Parser::write);
/// call [`close`](Parser::close) once at end of stream to flush the trailing buffer.
///
/// Concatenating every [`XmlEvent::Text`] plus the exact tag bytes reconstructs
/// the input losslessly up to the last complete tag (or the current buffer, once
/// closed). Self-closing syntax `<tag/>` emits an `OpenTag` immediately followed
/// by a `CloseTag`. Any partial tag that cannot be a prefix of a whitelisted name
/// is flushed back out as literal text instead of being silently dropped.
pub struct Parser {
    whitelist: Vec<String>,
    state: State,
    /// Bytes consumed since the state last left `Text`, including the `<`.
    pending: String,
    closed: bool,
}

impl Parser {
    /// Create a parser that only recognizes tags named in `whitelist`.
    pub fn new(whitelist: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            whitelist: whitelist.into_iter().map(Into::into).collect(),
            state: State::Text,
            pending: String::new(),
            closed: false,
        }
    }

    /// Feed a chunk of text, invoking `on_event` for each event in order.
    ///
    /// May be called repeatedly with arbitrary chunk boundaries; never blocks.
    pub fn write(&mut self, chunk: &str, mut on_event: impl FnMut(XmlEvent)) {
        assert!(!self.closed, "write() called after close()");
        for ch in chunk.chars() {
            self.feed_char(ch, &mut on_event);
        }
    }

    /// Flush any pending buffer as text. After this, `write` must not be called again.
    pub fn close(&mut self, mut on_event: impl FnMut(XmlEvent)) {
        if !self.pending.is_empty() {
            on_event(XmlEvent::Text(mem::take(&mut self.pending)));
        }
        self.state = State::Text;
        self.closed = true;
    }

    fn feed_char(&mut self, ch: char, on_event: &mut impl FnMut(XmlEvent)) {
        match self.state {
            State::Text => {
                if ch == '<' {
                    self.state = State::TagStart;
                    self.pending.push(ch);
                } else {
                    on_event(XmlEvent::Text(ch.to_string()));
                }
            }
            State::TagStart => {
                self.pending.push(ch);
                if ch == '/' {
                    self.state = State::ClosingTag;
                } else if is_name_char(ch) {
                    self.state = State::OpeningTag;
                } else {
                    self.abort_to_text(on_event);
                }
            }
            State::OpeningTag => self.feed_tag_char(ch, false, on_event),
            State::ClosingTag => self.feed_tag_char(ch, true, on_event),
        }
    }

    fn feed_tag_char(&mut self, ch: char, closing: bool, on_event: &mut impl FnMut(XmlEvent)) {
        if ch == '>' {
            let self_closing = !closing && self.pending.ends_with('/');
            let name_end = if self_closing {
                self.pending.len() - 1
            } else {
                self.pending.len()
            };
            let prefix_len = if closing { 2 } else { 1 };
            let name = self.pending[prefix_len..name_end].to_string();
            self.pending.clear();
            self.state = State::Text;

            if self.whitelist.iter().any(|w| w == &name) {
                if closing {
                    on_event(XmlEvent::CloseTag(name));
                } else if self_closing {
                    on_event(XmlEvent::OpenTag(name.clone()));
                    on_event(XmlEvent::CloseTag(name));
                } else {
                    on_event(XmlEvent::OpenTag(name));
                }
            } else {
                // Not whitelisted: re-emit the literal bytes we swallowed, plus `>`.
                let literal = if closing {
                    format!("</{name}>")
                } else if self_closing {
                    format!("<{name}/>")
                } else {
                    format!("<{name}>")
                };
                on_event(XmlEvent::Text(literal));
            }
            return;
        }

        let candidate_name_char = is_name_char(ch) || (!closing && ch == '/' && self.pending.ends_with(|c: char| is_name_char(c)));
        if !candidate_name_char {
            if ch == '<' {
                // The abandoned tag attempt flushes as text; `<` restarts a fresh attempt.
                self.abort_to_text(on_event);
                self.pending.push(ch);
                self.state = State::TagStart;
            } else {
                self.pending.push(ch);
                self.abort_to_text(on_event);
            }
            return;
        }

        self.pending.push(ch);

        // Prune: if the partial name so far cannot be a prefix of any
        // whitelisted tag, this can never resolve into a recognized tag;
        // flush it as text immediately instead of buffering unboundedly.
        let prefix_len = if closing { 2 } else { 1 };
        let partial = &self.pending[prefix_len..];
        let could_match = self
            .whitelist
            .iter()
            .any(|w| w.starts_with(partial) || partial.starts_with(w.as_str()));
        if !could_match {
            self.abort_to_text(on_event);
        }
    }

    /// Give up on the current tag attempt: flush everything buffered so far as text.
    fn abort_to_text(&mut self, on_event: &mut impl FnMut(XmlEvent)) {
        on_event(XmlEvent::Text(mem::take(&mut self.pending)));
        self.state = State::Text;
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

#[cfg(test)]
#[path = "lib.test.rs"]
mod tests;
