//! Parsed property values.

use serde::{Serialize, Serializer};

/// A parsed property value.
///
/// The closed set of shapes the property parser produces; everything the
/// engine renders into cells, frontmatter, or the index goes through here.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    List(Vec<String>),
    DateRange(DateRange),
}

/// A date or date range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub start: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl Value {
    /// Borrow the string content, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Number(_) | Self::List(_) | Self::DateRange(_) => None,
        }
    }

    /// Stringified form used in table cells and group keys.
    #[must_use]
    pub fn to_cell(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::List(items) => items.join(", "),
            Self::DateRange(range) => match &range.end {
                Some(end) => format!("{} – {}", range.start, end),
                None => range.start.clone(),
            },
        }
    }
}

/// Integral numbers print without a fractional part (`30`, not `30.0`).
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::String(s) => serializer.serialize_str(s),
            // Keep integral numbers integral in YAML and JSON output.
            #[allow(clippy::cast_possible_truncation)]
            Self::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Self::List(items) => items.serialize(serializer),
            Self::DateRange(range) => range.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cell_forms() {
        assert_eq!(Value::String("Infra".into()).to_cell(), "Infra");
        assert_eq!(Value::Number(30.0).to_cell(), "30");
        assert_eq!(Value::Number(2.5).to_cell(), "2.5");
        assert_eq!(
            Value::List(vec!["a".into(), "b".into()]).to_cell(),
            "a, b"
        );
        assert_eq!(
            Value::DateRange(DateRange {
                start: "2026-01-01".into(),
                end: None
            })
            .to_cell(),
            "2026-01-01"
        );
        assert_eq!(
            Value::DateRange(DateRange {
                start: "2026-01-01".into(),
                end: Some("2026-01-31".into())
            })
            .to_cell(),
            "2026-01-01 – 2026-01-31"
        );
    }

    #[test]
    fn test_integral_numbers_serialize_without_fraction() {
        assert_eq!(serde_yaml::to_string(&Value::Number(30.0)).unwrap(), "30\n");
        assert_eq!(
            serde_yaml::to_string(&Value::Number(2.5)).unwrap(),
            "2.5\n"
        );
        assert_eq!(
            serde_json::to_string(&Value::List(vec!["a".into()])).unwrap(),
            r#"["a"]"#
        );
    }

    #[test]
    fn test_date_range_serializes_structurally() {
        let json = serde_json::to_value(Value::DateRange(DateRange {
            start: "2026-01-01".into(),
            end: None,
        }))
        .unwrap();
        assert_eq!(json, serde_json::json!({ "start": "2026-01-01" }));
    }
}
