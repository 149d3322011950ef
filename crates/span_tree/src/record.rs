//! Span records as they appear in a trace export

use std::cmp::Ordering;
use std::fmt;
use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Identifier of a span, either numeric or textual.
///
/// Numbers keep the exact form they were exported in, so 64-bit unsigned
/// ids and float ids survive a round trip. Ordering puts every numeric id
/// before every textual id; numbers compare by value and strings lexically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpanId {
    Number(Number),
    Text(String),
}

impl SpanId {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Parse a user-typed id: anything that reads as a JSON number is numeric.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Ok(n) = raw.parse::<i64>() {
            return Self::Number(n.into());
        }
        if let Ok(n) = raw.parse::<u64>() {
            return Self::Number(n.into());
        }
        match raw.parse::<f64>().ok().and_then(Number::from_f64) {
            Some(n) => Self::Number(n),
            None => Self::Text(raw.to_string()),
        }
    }
}

impl From<i64> for SpanId {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for SpanId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl Ord for SpanId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SpanId::Number(a), SpanId::Number(b)) => compare_numbers(a, b),
            (SpanId::Number(_), SpanId::Text(_)) => Ordering::Less,
            (SpanId::Text(_), SpanId::Number(_)) => Ordering::Greater,
            (SpanId::Text(a), SpanId::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for SpanId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanId::Number(n) => write!(f, "{}", n),
            SpanId::Text(s) => f.write_str(s),
        }
    }
}

fn integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Exact numeric order; an integer sorts before a float of equal value
fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    match (integer(a), integer(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(x), None) => compare_integer_float(x, as_float(b)),
        (None, Some(y)) => compare_integer_float(y, as_float(a)).reverse(),
        (None, None) => {
            let (x, y) = (as_float(a), as_float(b));
            if x == y {
                Ordering::Equal
            } else {
                x.total_cmp(&y)
            }
        }
    }
}

fn compare_integer_float(x: i128, f: f64) -> Ordering {
    // float-to-int casts saturate, and every integer id fits well inside i128
    x.cmp(&(f.floor() as i128)).then(Ordering::Less)
}

fn as_float(n: &Number) -> f64 {
    n.as_f64().unwrap_or_default()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Where a span sent its work. Passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    #[serde(default)]
    pub service: Option<Label>,
    #[serde(default)]
    pub endpoint: Option<Endpoint>,
}

/// A single span from a trace export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanRecord {
    pub id: SpanId,
    /// Owning span; `null` and a missing key both mean "no parent"
    #[serde(default, rename = "parentId", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<SpanId>,
    pub name: String,
    /// Weight of the span in the flamegraph
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<Destination>,
}

impl SpanRecord {
    pub fn new(id: impl Into<SpanId>, name: impl Into<String>, duration: f64) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            name: name.into(),
            duration,
            destination: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<SpanId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = Some(destination);
        self
    }

    pub fn service_label(&self) -> Option<&str> {
        self.destination.as_ref()?.service.as_ref()?.label.as_deref()
    }

    pub fn endpoint_label(&self) -> Option<&str> {
        self.destination.as_ref()?.endpoint.as_ref()?.label.as_deref()
    }

    pub fn endpoint_type(&self) -> Option<&str> {
        self.destination.as_ref()?.endpoint.as_ref()?.kind.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ids_sort_before_text() {
        let mut ids = vec![
            SpanId::text("b"),
            SpanId::from(10),
            SpanId::text("a"),
            SpanId::from(2),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                SpanId::from(2),
                SpanId::from(10),
                SpanId::text("a"),
                SpanId::text("b"),
            ]
        );
    }

    #[test]
    fn test_mixed_numeric_forms_order_by_value() {
        let ids: Vec<SpanId> = ["18446744073709551615", "2.5", "-3", "2", "2.0", "9223372036854775807"]
            .into_iter()
            .map(|raw| serde_json::from_str(raw).unwrap())
            .collect();
        let mut sorted = ids.clone();
        sorted.sort();

        let shown: Vec<String> = sorted.iter().map(|id| id.to_string()).collect();
        assert_eq!(
            shown,
            vec!["-3", "2", "2.0", "2.5", "9223372036854775807", "18446744073709551615"]
        );
        assert_ne!(ids[3], ids[4]);
    }

    #[test]
    fn test_parse_user_id() {
        assert_eq!(SpanId::parse(" 42 "), SpanId::from(42));
        assert_eq!(SpanId::parse("abc-1"), SpanId::text("abc-1"));
        assert_eq!(SpanId::parse("18446744073709551615").to_string(), "18446744073709551615");
        assert_eq!(SpanId::parse("2.0"), serde_json::from_str::<SpanId>("2.0").unwrap());
        assert_eq!(SpanId::parse("NaN"), SpanId::text("NaN"));
    }

    #[test]
    fn test_null_parent_is_absent() {
        let span: SpanRecord =
            serde_json::from_str(r#"{"id": 1, "parentId": null, "name": "a", "duration": 3}"#).unwrap();
        assert_eq!(span.parent_id, None);
    }

    #[test]
    fn test_destination_lookup_short_circuits() {
        let span: SpanRecord = serde_json::from_str(
            r#"{"id": "x", "name": "a", "duration": 1, "destination": {"endpoint": {"type": "http"}}}"#,
        )
        .unwrap();
        assert_eq!(span.service_label(), None);
        assert_eq!(span.endpoint_label(), None);
        assert_eq!(span.endpoint_type(), Some("http"));

        let bare = SpanRecord::new(1, "a", 1.0);
        assert_eq!(bare.endpoint_type(), None);
    }

    #[test]
    fn test_missing_duration_is_rejected() {
        let result: Result<SpanRecord, _> = serde_json::from_str(r#"{"id": 1, "name": "a"}"#);
        assert!(result.is_err());
    }
}
