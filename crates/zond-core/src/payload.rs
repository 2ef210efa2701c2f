use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped in payload values: everything non-alphanumeric except
/// the few marks the collect endpoint tolerates bare.
const VALUE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

/// Ordered `key=value` pairs for a single hit.
///
/// Values are percent-escaped as they are appended; insertion order is the
/// wire order. Built per emitted event and discarded after dispatch.
#[derive(Clone, Debug, Default)]
pub struct Payload {
    pairs: Vec<(&'static str, String)>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, escaping the value.
    pub fn push(&mut self, key: &'static str, value: &str) {
        self.pairs
            .push((key, utf8_percent_encode(value, VALUE_SET).to_string()));
    }

    /// Append a field whose value is already wire-safe.
    pub fn push_raw(&mut self, key: &'static str, value: impl Into<String>) {
        self.pairs.push((key, value.into()));
    }

    /// Append a field only when the value is non-empty.
    pub fn push_text(&mut self, key: &'static str, value: &str) {
        if !value.is_empty() {
            self.push(key, value);
        }
    }

    /// Append an optional field, skipping `None` and empty values.
    pub fn push_opt(&mut self, key: &'static str, value: Option<&str>) {
        if let Some(value) = value {
            self.push_text(key, value);
        }
    }

    /// Append every pair from another payload, preserving order.
    pub fn extend(&mut self, other: Payload) {
        self.pairs.extend(other.pairs);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Render the `&`-joined query string.
    pub fn render(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}
