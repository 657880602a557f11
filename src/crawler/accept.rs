//! Accept predicates deciding which discovered neighbors are kept

use crate::crawler::json_path::JsonPath;
use serde_json::Value;

/// Classifies a neighbor record as worth keeping and expanding
pub trait AcceptPredicate {
    fn accepts(&self, neighbor: &Value) -> bool;
}

impl<F> AcceptPredicate for F
where
    F: Fn(&Value) -> bool,
{
    fn accepts(&self, neighbor: &Value) -> bool {
        self(neighbor)
    }
}

/// Accepts neighbors whose field at `path` equals `expected` exactly
#[derive(Debug, Clone)]
pub struct FieldEquals {
    path: JsonPath,
    expected: String,
}

impl FieldEquals {
    pub fn new(path: impl Into<JsonPath>, expected: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            expected: expected.into(),
        }
    }
}

impl AcceptPredicate for FieldEquals {
    fn accepts(&self, neighbor: &Value) -> bool {
        self.path
            .lookup_string(neighbor)
            .is_some_and(|value| value == self.expected)
    }
}
