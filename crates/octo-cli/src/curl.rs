//! Reconstructs a failed outbound HTTP request as a `curl` command so a
//! stream/compaction error (§7) carries something a human can immediately
//! re-run, with any auth header redacted before it ever reaches an error
//! message, log, or history item.

const REDACTED_HEADERS: &[&str] = &["authorization", "x-api-key"];

pub struct CurlRequest {
    pub method: &'static str,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CurlRequest {
    /// Renders as a single-line `curl` invocation. Header values matching
    /// [`REDACTED_HEADERS`] (case-insensitively) are replaced with
    /// `[redacted]` rather than echoed into the command text.
    pub fn to_curl(&self) -> String {
        let mut out = format!("curl -sS -X {} '{}'", self.method, self.url);
        for (name, value) in &self.headers {
            let value = if REDACTED_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
                "[redacted]"
            } else {
                value.as_str()
            };
            out.push_str(&format!(" -H '{name}: {value}'"));
        }
        if !self.body.is_empty() {
            out.push_str(&format!(" -d '{}'", self.body.replace('\'', "'\\''")));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_auth_headers_but_keeps_others() {
        let req = CurlRequest {
            method: "POST",
            url: "https://api.example.com/v1".to_string(),
            headers: vec![
                ("x-api-key".to_string(), "sk-super-secret".to_string()),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body: "{\"a\":1}".to_string(),
        };
        let rendered = req.to_curl();
        assert!(!rendered.contains("sk-super-secret"));
        assert!(rendered.contains("[redacted]"));
        assert!(rendered.contains("application/json"));
        assert!(rendered.contains("-d '{\"a\":1}'"));
    }
}
