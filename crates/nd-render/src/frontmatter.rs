//! YAML frontmatter assembly.

use indexmap::IndexMap;
use serde_yaml::Mapping;
use tracing::debug;

use crate::error::RenderError;
use crate::properties::ParsedProperties;
use crate::value::Value;

fn yaml_str(value: &str) -> serde_yaml::Value {
    serde_yaml::Value::String(value.to_owned())
}

/// Build the frontmatter document for a page, `---` fences included.
///
/// Meta fields come first (`title`, `category`, `order`, `id`, `url`),
/// followed by the parsed property values under their normalized keys and
/// then the configured extra entries. A property whose normalized key is
/// already taken is skipped; an extra entry overwrites by key but keeps the
/// first position.
///
/// # Errors
///
/// Returns [`RenderError::Yaml`] when a value cannot be serialized.
pub fn build(
    properties: &ParsedProperties,
    extra: &IndexMap<String, serde_yaml::Value>,
) -> Result<String, RenderError> {
    let meta = &properties.meta;
    let mut doc = Mapping::new();
    doc.insert(yaml_str("title"), yaml_str(&meta.title));
    if let Some(category) = &meta.category {
        doc.insert(yaml_str("category"), yaml_str(category));
    }
    if let Some(order) = meta.order {
        doc.insert(yaml_str("order"), serde_yaml::to_value(Value::Number(order))?);
    }
    doc.insert(yaml_str("id"), yaml_str(&meta.id));
    doc.insert(yaml_str("url"), yaml_str(&meta.url));

    for (name, key) in &properties.keys {
        let Some(value) = properties.values.get(name) else {
            continue;
        };
        let key_value = yaml_str(key);
        if doc.contains_key(&key_value) {
            debug!(property = %name, key = %key, "frontmatter key already taken, property skipped");
            continue;
        }
        doc.insert(key_value, serde_yaml::to_value(value)?);
    }

    for (name, value) in extra {
        doc.insert(yaml_str(name), value.clone());
    }

    Ok(format!("---\n{}---\n\n", serde_yaml::to_string(&doc)?))
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::properties::RecordMeta;
    use crate::value::DateRange;

    fn properties() -> ParsedProperties {
        ParsedProperties {
            meta: RecordMeta {
                id: "page-1".to_owned(),
                url: "https://notion.example/page-1".to_owned(),
                title: "Terraform".to_owned(),
                category: Some("Tools".to_owned()),
                order: Some(30.0),
            },
            values: IndexMap::from([
                ("Name".to_owned(), Value::String("Terraform".to_owned())),
                (
                    "Tags".to_owned(),
                    Value::List(vec!["infra".to_owned(), "ops".to_owned()]),
                ),
                (
                    "When".to_owned(),
                    Value::DateRange(DateRange {
                        start: "2026-01-01".to_owned(),
                        end: None,
                    }),
                ),
            ]),
            keys: IndexMap::from([
                ("Name".to_owned(), "name".to_owned()),
                ("Tags".to_owned(), "tags".to_owned()),
                ("When".to_owned(), "when".to_owned()),
            ]),
        }
    }

    #[test]
    fn test_meta_fields_come_first() {
        let doc = build(&properties(), &IndexMap::new()).unwrap();
        assert_eq!(
            doc,
            "---\n\
             title: Terraform\n\
             category: Tools\n\
             order: 30\n\
             id: page-1\n\
             url: https://notion.example/page-1\n\
             name: Terraform\n\
             tags:\n\
             - infra\n\
             - ops\n\
             when:\n\
             \x20 start: 2026-01-01\n\
             ---\n\n"
        );
    }

    #[test]
    fn test_property_never_shadows_a_meta_field() {
        let mut props = properties();
        props
            .values
            .insert("Url".to_owned(), Value::String("other".to_owned()));
        props.keys.insert("Url".to_owned(), "url".to_owned());

        let doc = build(&props, &IndexMap::new()).unwrap();
        assert!(doc.contains("url: https://notion.example/page-1\n"));
        assert!(!doc.contains("url: other"));
    }

    #[test]
    fn test_extra_entries_overwrite_in_place() {
        let extra = IndexMap::from([
            (
                "category".to_owned(),
                serde_yaml::Value::String("Infra".to_owned()),
            ),
            ("weight".to_owned(), serde_yaml::Value::Number(5.into())),
        ]);
        let doc = build(&properties(), &extra).unwrap();

        let category_line = doc.lines().nth(2).unwrap();
        assert_eq!(category_line, "category: Infra");
        assert!(doc.contains("weight: 5\n"));
    }

    #[test]
    fn test_optional_meta_fields_are_omitted() {
        let props = ParsedProperties {
            meta: RecordMeta {
                id: "page-2".to_owned(),
                url: "https://notion.example/page-2".to_owned(),
                title: "Vault".to_owned(),
                category: None,
                order: None,
            },
            values: IndexMap::new(),
            keys: IndexMap::new(),
        };
        let doc = build(&props, &IndexMap::new()).unwrap();
        assert_eq!(
            doc,
            "---\ntitle: Vault\nid: page-2\nurl: https://notion.example/page-2\n---\n\n"
        );
    }
}
