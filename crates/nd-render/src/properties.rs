//! Property parsing: records into typed, ordered property sets.
//!
//! Parsing is pure. It never suspends, which is what lets page tasks be
//! constructed under a single lock guard without a cache race.

use indexmap::IndexMap;
use nd_notion::{KnownProperty, PropertyValue, Record};
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::error::RenderError;
use crate::richtext;
use crate::value::{DateRange, Value};

/// Display name of the number property that fills [`RecordMeta::order`].
const ORDER_PROPERTY: &str = "order";

/// Parsed properties of one record.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedProperties {
    /// Derived meta fields.
    pub meta: RecordMeta,
    /// Parsed values keyed by display name. Properties without a value
    /// (empty select, unset number) are omitted.
    pub values: IndexMap<String, Value>,
    /// Display name to normalized key, in column order. This mapping fixes
    /// both table headers and frontmatter keys.
    pub keys: IndexMap<String, String>,
}

/// Meta fields derived from a record's properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordMeta {
    pub id: String,
    pub url: String,
    /// Rendered markdown of the title property.
    pub title: String,
    /// Value of the configured category property.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Value of the `order` number property, when present.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_order"
    )]
    pub order: Option<f64>,
}

fn serialize_order<S>(order: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match order {
        Some(n) => Value::Number(*n).serialize(serializer),
        None => serializer.serialize_none(),
    }
}

/// Parse a record's properties.
///
/// With an explicit `include` list, the parsed key order and membership
/// match the list exactly. Otherwise all properties are kept with the title
/// property moved first.
///
/// # Errors
///
/// Returns [`RenderError::MissingRequiredProperty`] when the record has no
/// title property, or when `category_property` is configured and the record
/// carries no value for it. Both errors name the record URL.
pub fn parse(
    record: &Record,
    include: Option<&[String]>,
    category_property: Option<&str>,
) -> Result<ParsedProperties, RenderError> {
    let mut all: IndexMap<String, Value> = IndexMap::new();
    let mut title_name: Option<String> = None;

    for (name, property) in &record.properties {
        match property {
            PropertyValue::Known(known) => {
                if matches!(known, KnownProperty::Title { .. }) {
                    title_name = Some(name.clone());
                }
                if let Some(value) = parse_known(known) {
                    all.insert(name.clone(), value);
                }
            }
            PropertyValue::Other(other) => {
                warn!(
                    property = %name,
                    kind = %other.property_type,
                    url = %record.url,
                    "unsupported property type"
                );
                all.insert(
                    name.clone(),
                    Value::String(format!(
                        "unsupported property type: {}",
                        other.property_type
                    )),
                );
            }
        }
    }

    let title = match &title_name {
        Some(name) => all
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        None => {
            return Err(RenderError::MissingRequiredProperty {
                property: "title".to_owned(),
                url: record.url.clone(),
            });
        }
    };

    let order = match all.get(ORDER_PROPERTY) {
        Some(Value::Number(n)) => Some(*n),
        _ => None,
    };

    let category = match category_property {
        Some(property) => match all.get(property).and_then(Value::as_str) {
            Some(value) if !value.is_empty() => Some(value.to_owned()),
            _ => {
                return Err(RenderError::MissingRequiredProperty {
                    property: property.to_owned(),
                    url: record.url.clone(),
                });
            }
        },
        None => None,
    };

    let (values, keys) = match include {
        Some(list) => {
            let mut values = IndexMap::new();
            let mut keys = IndexMap::new();
            for name in list {
                if let Some(value) = all.get(name) {
                    values.insert(name.clone(), value.clone());
                }
                keys.insert(name.clone(), slug::slugify(name));
            }
            (values, keys)
        }
        None => {
            let mut values = IndexMap::with_capacity(all.len());
            if let Some(name) = &title_name
                && let Some(value) = all.get(name)
            {
                values.insert(name.clone(), value.clone());
            }
            for (name, value) in &all {
                if Some(name) != title_name.as_ref() {
                    values.insert(name.clone(), value.clone());
                }
            }
            let keys = values
                .keys()
                .map(|name| (name.clone(), slug::slugify(name)))
                .collect();
            (values, keys)
        }
    };

    Ok(ParsedProperties {
        meta: RecordMeta {
            id: record.id.clone(),
            url: record.url.clone(),
            title,
            category,
            order,
        },
        values,
        keys,
    })
}

fn parse_known(property: &KnownProperty) -> Option<Value> {
    match property {
        KnownProperty::Title { title } => Some(Value::String(richtext::render_markdown(title))),
        KnownProperty::RichText { rich_text } => {
            Some(Value::String(richtext::render_markdown(rich_text)))
        }
        KnownProperty::Number { number } => number.map(Value::Number),
        KnownProperty::Select { select } => {
            select.as_ref().map(|s| Value::String(s.name.clone()))
        }
        KnownProperty::MultiSelect { multi_select } => Some(Value::List(
            multi_select.iter().map(|s| s.name.clone()).collect(),
        )),
        KnownProperty::Date { date } => date.as_ref().map(|d| {
            Value::DateRange(DateRange {
                start: d.start.clone(),
                end: d.end.clone(),
            })
        }),
        KnownProperty::Relation { relation } => {
            Some(Value::List(relation.iter().map(|r| r.id.clone()).collect()))
        }
        KnownProperty::Url { url } => url.clone().map(Value::String),
        KnownProperty::Email { email } => email.clone().map(Value::String),
        KnownProperty::PhoneNumber { phone_number } => phone_number.clone().map(Value::String),
        KnownProperty::CreatedTime { created_time } => {
            Some(Value::String(created_time.clone()))
        }
        KnownProperty::LastEditedTime { last_edited_time } => {
            Some(Value::String(last_edited_time.clone()))
        }
    }
}
