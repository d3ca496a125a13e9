//! Markdown table assembly.

/// Placeholder emitted for a collection with no rows.
pub(crate) const EMPTY_COLLECTION: &str = "<!-- empty collection -->";

/// Minimum column width, so the separator row is always valid markdown.
const MIN_WIDTH: usize = 3;

/// Make a value safe for a single table cell.
///
/// Newlines become `<br>` so multi-line values stay in their row, and pipes
/// are escaped so they cannot open a new column.
pub(crate) fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "<br>")
}

/// Render a markdown table with space-padded columns.
///
/// Column widths follow the widest cell (in characters). Rows shorter than
/// the header are padded with empty cells; surplus cells are dropped.
pub(crate) fn markdown_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .map(|header| header.chars().count().max(MIN_WIDTH))
        .collect();
    for row in rows {
        for (column, cell) in row.iter().enumerate().take(widths.len()) {
            widths[column] = widths[column].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_row(&mut out, headers, &widths);
    out.push('|');
    for width in &widths {
        out.push(' ');
        out.push_str(&"-".repeat(*width));
        out.push_str(" |");
    }
    out.push('\n');
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    out.push('|');
    for (column, width) in widths.iter().enumerate() {
        let cell = cells.get(column).map_or("", String::as_str);
        out.push(' ');
        out.push_str(cell);
        for _ in cell.chars().count()..*width {
            out.push(' ');
        }
        out.push_str(" |");
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn owned(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|&c| c.to_owned()).collect()
    }

    #[test]
    fn test_columns_are_padded_to_the_widest_cell() {
        let table = markdown_table(
            &owned(&["Name", "order"]),
            &[owned(&["Terraform", "30"]), owned(&["Vault", "20.5"])],
        );
        assert_eq!(
            table,
            "| Name      | order |\n\
             | --------- | ----- |\n\
             | Terraform | 30    |\n\
             | Vault     | 20.5  |\n"
        );
    }

    #[test]
    fn test_separator_keeps_a_minimum_width() {
        let table = markdown_table(&owned(&["a"]), &[owned(&["b"])]);
        assert_eq!(table, "| a   |\n| --- |\n| b   |\n");
    }

    #[test]
    fn test_short_rows_get_empty_cells() {
        let table = markdown_table(&owned(&["Name", "order"]), &[owned(&["Vault"])]);
        assert_eq!(
            table,
            "| Name  | order |\n\
             | ----- | ----- |\n\
             | Vault |       |\n"
        );
    }

    #[test]
    fn test_escape_cell_handles_pipes_and_newlines() {
        assert_eq!(escape_cell("a|b\nc"), "a\\|b<br>c");
        assert_eq!(escape_cell("plain"), "plain");
    }

    #[test]
    fn test_width_counts_characters_not_bytes() {
        let table = markdown_table(&owned(&["Célèbre"]), &[owned(&["oui"])]);
        assert_eq!(table, "| Célèbre |\n| ------- |\n| oui     |\n");
    }
}
