//! Mailgun `message-headers` decoding.

use std::collections::HashMap;

use tracing::warn;

/// Decode Mailgun's message-headers JSON string into a header map.
///
/// Mailgun provides headers as a JSON array of [name, value] pairs, e.g.:
/// `[["Message-Id", "<abc123@example.com>"], ["Subject", "Hello"], ...]`
///
/// Names are lower-cased. A repeated header keeps its last value. Entries
/// that are not exactly a `[name, value]` pair are skipped.
pub fn parse_message_headers(raw: &str) -> Result<HashMap<String, String>, serde_json::Error> {
    let mut headers = HashMap::new();

    if raw.trim().is_empty() {
        return Ok(headers);
    }

    let pairs: Vec<Vec<String>> = serde_json::from_str(raw)?;

    for pair in pairs {
        match <[String; 2]>::try_from(pair) {
            Ok([name, value]) => {
                headers.insert(name.to_lowercase(), value);
            }
            Err(pair) => {
                warn!(entries = pair.len(), "message_header_pair_malformed");
            }
        }
    }

    Ok(headers)
}
