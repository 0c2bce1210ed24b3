//! Tunables of a [`RankedCollection`](crate::RankedCollection).

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SIZE, DEFAULT_VALUE, MAX_STRING_LEN};

/// Construction options.
///
/// Missing fields take their defaults, so a host can configure only what it
/// cares about:
///
/// ```
/// use insertion_ranking::RankingOptions;
///
/// let options = RankingOptions::from_json_str(r#"{"initial_capacity": 1024}"#).unwrap();
/// assert_eq!(options.initial_capacity, 1024);
/// assert!(options.write_header);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingOptions {
    /// Element slots reserved up front.
    pub initial_capacity: usize,
    /// Payload length of an element after its first value is set.
    pub initial_payload_slots: usize,
    /// Longest string value accepted by `set_value` and while loading.
    pub max_string_len: usize,
    /// Whether saved files start with the magic/version header. Loading
    /// expects the header exactly when this is set.
    pub write_header: bool,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_SIZE,
            initial_payload_slots: DEFAULT_VALUE,
            max_string_len: MAX_STRING_LEN,
            write_header: true,
        }
    }
}

impl RankingOptions {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let options = RankingOptions::from_json_str("{}").unwrap();
        assert_eq!(options, RankingOptions::default());
    }

    #[test]
    fn partial_document() {
        let options =
            RankingOptions::from_json_str(r#"{"write_header": false, "max_string_len": 16}"#)
                .unwrap();
        assert!(!options.write_header);
        assert_eq!(options.max_string_len, 16);
        assert_eq!(options.initial_capacity, DEFAULT_SIZE);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(RankingOptions::from_json_str(r#"{"initial_capacity": "big"}"#).is_err());
    }
}
