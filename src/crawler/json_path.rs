//! Defensive field-path lookups over JSON responses
//!
//! A miss anywhere along a path (missing key, index out of range, wrong
//! container kind) yields `None` rather than an error. API responses are
//! treated as "maybe has data", never as a schema to enforce.

use serde_json::Value;
use std::fmt;

/// One step of a [`JsonPath`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object member access
    Key(String),
    /// Array element access
    Index(usize),
}

/// A field-access path into a JSON document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    /// Parses a dotted path such as `recenttracks.@attr.totalPages`
    ///
    /// Purely numeric segments become array indices; every other segment is
    /// an object key. The empty string is the root path.
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split('.')
            .filter(|s| !s.is_empty())
            .map(|s| match s.parse::<usize>() {
                Ok(index) => Segment::Index(index),
                Err(_) => Segment::Key(s.to_string()),
            })
            .collect();

        Self { segments }
    }

    /// Appends an object key segment
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(Segment::Key(key.into()));
        self
    }

    /// Appends an array index segment
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Walks the path and returns the value it points at, if any
    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match (segment, current) {
                (Segment::Key(key), Value::Object(map)) => map.get(key)?,
                (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Looks up a scalar and renders it as text
    ///
    /// Strings are returned as-is, numbers and booleans are formatted.
    /// Null, arrays and objects count as absent.
    pub fn lookup_string(&self, root: &Value) -> Option<String> {
        match self.lookup(root)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Looks up an unsigned integer
    ///
    /// The API renders counters as strings, so numeric strings are accepted.
    /// Returns `Some(Err(..))` when a value is present but not a number.
    pub fn lookup_u64(&self, root: &Value) -> Option<Result<u64, String>> {
        let value = self.lookup(root)?;
        let parsed = match value {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
                .ok_or_else(|| format!("{} is not an integer", n)),
            Value::String(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| format!("'{}' is not an integer", s)),
            other => Err(format!("{} is not an integer", other)),
        };
        Some(parsed)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Key(k) => k.clone(),
                Segment::Index(i) => i.to_string(),
            })
            .collect();
        write!(f, "{}", parts.join("."))
    }
}

impl From<&str> for JsonPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}
