//! Collection views: grouped markdown tables over member pages.
//!
//! Views render per reference site because the first column links to each
//! member's file, and relative paths depend on where the table lands.

use std::sync::Arc;

use indexmap::IndexMap;
use nd_config::ViewConfig;

use crate::error::RenderError;
use crate::link::LinkResolver;
use crate::table;
use crate::task::PageTask;
use crate::value::Value;

/// Group label for rows whose group property has no value. Keeps the
/// grouped heading from trailing off into `## {title} - `.
const UNGROUPED: &str = "(none)";

/// Render the configured views over a collection's member pages, joined by
/// blank lines. No views means an empty fragment.
///
/// # Errors
///
/// Returns [`RenderError::UnknownProperty`] when a view names a `group_by`
/// or include property the members were not parsed with.
pub(crate) fn render_views(
    tasks: &[Arc<PageTask>],
    views: &[ViewConfig],
    links: &LinkResolver,
) -> Result<String, RenderError> {
    let mut fragments = Vec::with_capacity(views.len());
    for view in views {
        fragments.push(render_view(tasks, view, links)?);
    }
    Ok(fragments.join("\n\n"))
}

fn render_view(
    tasks: &[Arc<PageTask>],
    view: &ViewConfig,
    links: &LinkResolver,
) -> Result<String, RenderError> {
    if tasks.is_empty() {
        return Ok(table::EMPTY_COLLECTION.to_owned());
    }

    // Column membership is validated against the first member; every member
    // of a collection is parsed with the same configuration.
    let keys = &tasks[0].properties.keys;
    let columns: Vec<&String> = match &view.include {
        Some(include) => {
            for name in include {
                if !keys.contains_key(name) {
                    return Err(RenderError::UnknownProperty {
                        name: name.clone(),
                        context: "view include",
                    });
                }
            }
            include.iter().collect()
        }
        None => keys.keys().collect(),
    };

    let groups: Vec<(Option<String>, Vec<&Arc<PageTask>>)> = match &view.group_by {
        Some(property) => {
            if !keys.contains_key(property) {
                return Err(RenderError::UnknownProperty {
                    name: property.clone(),
                    context: "view group-by",
                });
            }
            let mut groups: IndexMap<String, Vec<&Arc<PageTask>>> = IndexMap::new();
            for task in tasks {
                let group = task
                    .properties
                    .values
                    .get(property)
                    .map(Value::to_cell)
                    .filter(|group| !group.is_empty())
                    .unwrap_or_else(|| UNGROUPED.to_owned());
                groups.entry(group).or_default().push(task);
            }
            groups
                .into_iter()
                .map(|(group, members)| (Some(group), members))
                .collect()
        }
        None => vec![(None, tasks.iter().collect())],
    };

    let mut sections = Vec::with_capacity(groups.len());
    for (group, members) in &groups {
        let table = members_table(members, &columns, links);
        sections.push(match (&view.title, group) {
            (Some(title), Some(group)) => format!("## {title} - {group}\n\n{table}"),
            (Some(title), None) => format!("## {title}\n\n{table}"),
            (None, _) => table,
        });
    }
    Ok(sections.join("\n\n"))
}

fn members_table(members: &[&Arc<PageTask>], columns: &[&String], links: &LinkResolver) -> String {
    let headers: Vec<String> = columns.iter().map(|&name| name.clone()).collect();
    let rows: Vec<Vec<String>> = members
        .iter()
        .map(|task| {
            columns
                .iter()
                .enumerate()
                .map(|(index, &name)| {
                    let value = task
                        .properties
                        .values
                        .get(name)
                        .map_or_else(String::new, Value::to_cell);
                    let cell = table::escape_cell(&value);
                    if index == 0 {
                        format!("[{cell}]({})", links.resolve(&task.file))
                    } else {
                        cell
                    }
                })
                .collect()
        })
        .collect();
    let table = table::markdown_table(&headers, &rows);
    table.strip_suffix('\n').unwrap_or(&table).to_owned()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::properties::{ParsedProperties, RecordMeta};

    fn task(id: &str, title: &str, category: &str) -> Arc<PageTask> {
        Arc::new(PageTask {
            id: id.to_owned(),
            file: PathBuf::from(format!("docs/tools/{}.md", slug::slugify(title))),
            properties: ParsedProperties {
                meta: RecordMeta {
                    id: id.to_owned(),
                    url: format!("https://notion.example/{id}"),
                    title: title.to_owned(),
                    category: None,
                    order: None,
                },
                values: IndexMap::from([
                    ("Name".to_owned(), Value::String(title.to_owned())),
                    ("Category".to_owned(), Value::String(category.to_owned())),
                ]),
                keys: IndexMap::from([
                    ("Name".to_owned(), "name".to_owned()),
                    ("Category".to_owned(), "category".to_owned()),
                ]),
            },
        })
    }

    fn view(title: Option<&str>, group_by: Option<&str>) -> ViewConfig {
        ViewConfig {
            title: title.map(str::to_owned),
            group_by: group_by.map(str::to_owned),
            include: None,
        }
    }

    #[test]
    fn test_groups_keep_first_appearance_order() {
        let tasks = vec![
            task("p-1", "Terraform", "Tools"),
            task("p-2", "Nomad", "Platform"),
            task("p-3", "Vault", "Tools"),
        ];
        let links = LinkResolver::new("docs");
        let out = render_views(&tasks, &[view(Some("Stack"), Some("Category"))], &links).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "## Stack - Tools");
        assert!(lines[2].starts_with("| Name"));
        assert!(lines[4].starts_with("| [Terraform](./tools/terraform.md) "));
        assert!(lines[5].starts_with("| [Vault](./tools/vault.md)"));
        assert_eq!(lines[7], "## Stack - Platform");
        assert!(lines[11].starts_with("| [Nomad](./tools/nomad.md)"));

        // Every line of a table is padded to the same width.
        let widths: Vec<usize> = lines[2..=5].iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{widths:?}");
    }

    #[test]
    fn test_rows_without_group_value_form_a_named_group() {
        let tasks = vec![
            task("p-1", "Terraform", "Tools"),
            task("p-2", "Nomad", ""),
        ];
        let links = LinkResolver::new("docs");
        let out = render_views(&tasks, &[view(Some("Stack"), Some("Category"))], &links).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "## Stack - Tools");
        assert_eq!(lines[6], "## Stack - (none)");
        assert!(!out.contains("## Stack - \n"));
    }

    #[test]
    fn test_ungrouped_view_renders_one_table() {
        let tasks = vec![task("p-1", "Terraform", "Tools")];
        let links = LinkResolver::new("docs/tools");
        let out = render_views(&tasks, &[view(Some("All pages"), None)], &links).unwrap();

        let table = table::markdown_table(
            &["Name".to_owned(), "Category".to_owned()],
            &[vec![
                "[Terraform](./terraform.md)".to_owned(),
                "Tools".to_owned(),
            ]],
        );
        let expected = format!("## All pages\n\n{}", table.strip_suffix('\n').unwrap());
        assert_eq!(out, expected);
    }

    #[test]
    fn test_include_list_picks_and_orders_columns() {
        let tasks = vec![task("p-1", "Terraform", "Tools")];
        let links = LinkResolver::new("docs/tools");
        let mut config = view(None, None);
        config.include = Some(vec!["Category".to_owned(), "Name".to_owned()]);
        let out = render_views(&tasks, &[config], &links).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("| Category"));
        assert_eq!(lines[2], "| [Tools](./terraform.md) | Terraform |");
    }

    #[test]
    fn test_unknown_group_property_is_fatal() {
        let tasks = vec![task("p-1", "Terraform", "Tools")];
        let links = LinkResolver::new("docs");
        let err = render_views(&tasks, &[view(None, Some("Ghost"))], &links).unwrap_err();
        assert!(matches!(
            err,
            RenderError::UnknownProperty { context: "view group-by", .. }
        ));
    }

    #[test]
    fn test_unknown_include_property_is_fatal() {
        let tasks = vec![task("p-1", "Terraform", "Tools")];
        let links = LinkResolver::new("docs");
        let mut config = view(None, None);
        config.include = Some(vec!["Ghost".to_owned()]);
        let err = render_views(&tasks, &[config], &links).unwrap_err();
        assert!(matches!(
            err,
            RenderError::UnknownProperty { context: "view include", .. }
        ));
    }

    #[test]
    fn test_empty_member_list_renders_a_placeholder() {
        let links = LinkResolver::new("docs");
        let out = render_views(&[], &[view(Some("Stack"), None)], &links).unwrap();
        assert_eq!(out, "<!-- empty collection -->");
    }

    #[test]
    fn test_no_views_renders_nothing() {
        let tasks = vec![task("p-1", "Terraform", "Tools")];
        let links = LinkResolver::new("docs");
        assert_eq!(render_views(&tasks, &[], &links).unwrap(), "");
    }
}
