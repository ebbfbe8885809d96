/// Accumulates `ToolCallDelta` fragments into one completed call.
///
/// Parallel tool use is disabled at the wire (§6, §9), so once an id is
/// established, fragments for any other id are dropped rather than
/// starting a second in-flight call (§4.F step 4).
#[derive(Debug, Default)]
pub struct ToolCallBuilder {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

impl ToolCallBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one delta. Returns `false` if the delta was dropped because a
    /// different call is already in flight.
    pub fn feed(&mut self, id: Option<String>, name: Option<String>, arguments_fragment: Option<String>) -> bool {
        if let Some(id) = &id {
            match &self.id {
                None => self.id = Some(id.clone()),
                Some(existing) if existing != id => return false,
                _ => {}
            }
        }
        if let Some(name) = name {
            self.name = Some(name);
        }
        if let Some(fragment) = arguments_fragment {
            self.arguments.push_str(&fragment);
        }
        true
    }

    pub fn is_in_flight(&self) -> bool {
        self.id.is_some()
    }

    /// Consumes the builder, returning `(id, name, raw_arguments_json)` if
    /// an id was ever established.
    pub fn finish(self) -> Option<(String, String, String)> {
        let id = self.id?;
        let name = self.name.unwrap_or_default();
        Some((id, name, self.arguments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_argument_fragments_in_order() {
        let mut b = ToolCallBuilder::new();
        b.feed(Some("call-1".into()), Some("read".into()), Some("{\"pa".into()));
        b.feed(None, None, Some("th\":\"a\"}".into()));
        let (id, name, args) = b.finish().unwrap();
        assert_eq!(id, "call-1");
        assert_eq!(name, "read");
        assert_eq!(args, "{\"path\":\"a\"}");
    }

    #[test]
    fn second_tool_call_id_is_dropped() {
        let mut b = ToolCallBuilder::new();
        assert!(b.feed(Some("call-1".into()), Some("read".into()), Some("{}".into())));
        assert!(!b.feed(Some("call-2".into()), Some("shell".into()), Some("{}".into())));
        let (id, name, _) = b.finish().unwrap();
        assert_eq!(id, "call-1");
        assert_eq!(name, "read");
    }
}
