//! Table grid → GitHub pipe table.
//!
//! Produces the same layout docling's own table export does (tabulate's
//! `github` format): the first grid row is the header, every column is
//! padded to a common display width, and columns holding only numbers are
//! right-aligned. Widths are measured in terminal columns so that tables of
//! Japanese text stay aligned in a monospace view.

use crate::engine::schema::TableData;
use unicode_width::UnicodeWidthStr;

/// Extra width headers reserve over their own text.
const HEADER_PADDING: usize = 2;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Render a table grid; an empty grid renders as the empty string.
pub fn to_markdown(data: &TableData) -> String {
    let rows: Vec<Vec<String>> = data
        .grid
        .iter()
        .map(|row| row.iter().map(|c| c.text.replace('\n', "  ")).collect())
        .collect();
    let num_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    if num_cols == 0 {
        return String::new();
    }

    let cell = |r: usize, c: usize| rows[r].get(c).map(String::as_str).unwrap_or("");

    // The first row is always the header, even when it is the only row.
    let aligns: Vec<Align> = (0..num_cols)
        .map(|c| {
            let mut values = (1..rows.len())
                .map(|r| cell(r, c).trim())
                .filter(|t| !t.is_empty())
                .peekable();
            if values.peek().is_some() && values.all(|t| t.parse::<f64>().is_ok()) {
                Align::Right
            } else {
                Align::Left
            }
        })
        .collect();

    let widths: Vec<usize> = (0..num_cols)
        .map(|c| {
            let min = cell(0, c).width() + HEADER_PADDING;
            (1..rows.len()).map(|r| cell(r, c).width()).fold(min, usize::max)
        })
        .collect();

    let line = |r: usize| {
        let cells: Vec<String> = (0..num_cols)
            .map(|c| pad(cell(r, c), widths[c], aligns[c]))
            .collect();
        format!("| {} |", cells.join(" | "))
    };

    let mut out = Vec::with_capacity(rows.len() + 1);
    out.push(line(0));
    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    out.push(format!("|{}|", sep.join("|")));
    out.extend((1..rows.len()).map(line));
    out.join("\n")
}

fn pad(text: &str, width: usize, align: Align) -> String {
    let fill = " ".repeat(width.saturating_sub(text.width()));
    match align {
        Align::Left => format!("{text}{fill}"),
        Align::Right => format!("{fill}{text}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::schema::TableCell;

    fn grid(rows: &[&[&str]]) -> TableData {
        TableData {
            num_rows: rows.len(),
            num_cols: rows.first().map_or(0, |r| r.len()),
            grid: rows
                .iter()
                .map(|r| {
                    r.iter()
                        .map(|t| TableCell {
                            text: t.to_string(),
                        })
                        .collect()
                })
                .collect(),
        }
    }

    #[test]
    fn header_and_numeric_alignment() {
        let md = to_markdown(&grid(&[&["item", "qty"], &["spam", "42"], &["eggs", "451"]]));
        assert_eq!(
            md,
            "| item   |   qty |\n\
             |--------|-------|\n\
             | spam   |    42 |\n\
             | eggs   |   451 |"
        );
    }

    #[test]
    fn wide_cells_set_the_width() {
        let md = to_markdown(&grid(&[&["a"], &["longer text"]]));
        assert_eq!(md, "| a           |\n|-------------|\n| longer text |");
    }

    #[test]
    fn cjk_cells_use_display_width() {
        let md = to_markdown(&grid(&[&["項目", "x"], &["日本語", "y"]]));
        // "項目" is 4 columns → min width 6; "日本語" is 6 columns.
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "| 項目   | x   |");
        assert_eq!(lines[1], "|--------|-----|");
        assert_eq!(lines[2], "| 日本語 | y   |");
    }

    #[test]
    fn single_row_becomes_header_only_table() {
        let md = to_markdown(&grid(&[&["a", "bb"]]));
        assert_eq!(md, "| a   | bb   |\n|-----|------|");
        assert!(md.lines().any(|l| l.starts_with("|-")));
    }

    #[test]
    fn empty_grid_is_empty() {
        assert_eq!(to_markdown(&TableData::default()), "");
    }

    #[test]
    fn ragged_rows_and_newlines() {
        let md = to_markdown(&grid(&[&["h1", "h2"], &["line\nbreak"]]));
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].starts_with("| line  break |"), "got {:?}", lines[2]);
        assert!(lines[2].ends_with("|      |"), "got {:?}", lines[2]);
    }

    #[test]
    fn empty_cells_do_not_break_numeric_columns() {
        let md = to_markdown(&grid(&[&["n"], &["1"], &[""], &["10"]]));
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[2], "|   1 |");
        assert_eq!(lines[3], "|     |");
        assert_eq!(lines[4], "|  10 |");
    }
}
