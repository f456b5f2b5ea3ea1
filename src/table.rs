// 📐 Table Parser - pipe-delimited Markdown tables
// Each specification document carries exactly one table following the
// `| col | col |` / separator-row convention. The parser splits it into
// headers and rows; row width is the caller's problem, not ours.

use serde::{Deserialize, Serialize};

// ============================================================================
// PARSE RESULT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Locate a column by a case-insensitive keyword in the header row,
    /// falling back to a fixed position when no header matches.
    ///
    /// Keeps the original positional contract intact when columns are in
    /// their documented order, while surviving reordered tables.
    pub fn column_index(&self, keyword: &str, fallback: usize) -> usize {
        let keyword = keyword.to_lowercase();
        self.headers
            .iter()
            .position(|h| h.to_lowercase().contains(&keyword))
            .unwrap_or(fallback)
    }

    /// Cell at `index` in `row`, if the row is wide enough and non-empty.
    pub fn cell<'a>(&self, row: &'a [String], index: usize) -> Option<&'a str> {
        row.get(index).map(|c| c.as_str()).filter(|c| !c.is_empty())
    }
}

// ============================================================================
// PARSER
// ============================================================================

/// Parse the first pipe-delimited table out of `content`.
///
/// A line is table-like when its trimmed form starts with `|`. A collected
/// line containing `---` confirms the block (the header/body separator);
/// collection stops at the first non-table-like line after confirmation.
/// Fewer than 3 collected lines (header + separator + data) is no table.
pub fn parse_table(content: &str) -> Option<Table> {
    let mut table_lines: Vec<&str> = Vec::new();
    let mut confirmed = false;

    for line in content.lines() {
        let stripped = line.trim();
        if stripped.starts_with('|') {
            if stripped.contains("---") {
                confirmed = true;
            }
            table_lines.push(stripped);
        } else if confirmed {
            break;
        }
    }

    if !confirmed || table_lines.len() < 3 {
        return None;
    }

    let headers = split_row(table_lines[0]);
    let rows = table_lines[2..].iter().map(|l| split_row(l)).collect();
    Some(Table { headers, rows })
}

/// Split `| a | b | c |` into `["a", "b", "c"]`: the outer pipes produce
/// empty leading/trailing segments, which are dropped.
fn split_row(line: &str) -> Vec<String> {
    let cells: Vec<&str> = line.split('|').collect();
    if cells.len() < 2 {
        return Vec::new();
    }
    cells[1..cells.len() - 1]
        .iter()
        .map(|c| c.trim().to_string())
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_separator_only_is_no_table() {
        let content = "| Symbol | Timing |\n|---|---|\n";
        assert!(parse_table(content).is_none());
    }

    #[test]
    fn test_single_data_row() {
        let content = "| Symbol | Timing |\n|---|---|\n| \\(K_t\\) | state |\n";
        let table = parse_table(content).unwrap();
        assert_eq!(table.headers, vec!["Symbol", "Timing"]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0], vec!["\\(K_t\\)", "state"]);
    }

    #[test]
    fn test_stops_at_prose_after_table() {
        let content = "\
Intro prose.

| A | B |
|---|---|
| 1 | 2 |
| 3 | 4 |

Closing prose with | a stray pipe mid-line.";
        let table = parse_table(content).unwrap();
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_ragged_rows_are_kept() {
        let content = "| A | B | C |\n|---|---|---|\n| 1 | 2 |\n| 1 | 2 | 3 | 4 |\n";
        let table = parse_table(content).unwrap();
        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.rows[1].len(), 4);
    }

    #[test]
    fn test_no_separator_means_no_table() {
        let content = "| A | B |\n| 1 | 2 |\n| 3 | 4 |\n";
        assert!(parse_table(content).is_none());
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_table("").is_none());
    }

    #[test]
    fn test_column_index_by_keyword() {
        let content = "| # | Used in | Symbol |\n|---|---|---|\n| 1 | Euler | \\(c_t\\) |\n";
        let table = parse_table(content).unwrap();
        assert_eq!(table.column_index("symbol", 1), 2);
        assert_eq!(table.column_index("used", 6), 1);
    }

    #[test]
    fn test_column_index_falls_back_to_position() {
        let content = "| A | B | C |\n|---|---|---|\n| 1 | 2 | 3 |\n";
        let table = parse_table(content).unwrap();
        assert_eq!(table.column_index("symbol", 1), 1);
    }

    #[test]
    fn test_cell_skips_short_and_empty() {
        let table = parse_table("| A | B |\n|---|---|\n| 1 |  |\n").unwrap();
        let row = &table.rows[0];
        assert_eq!(table.cell(row, 0), Some("1"));
        assert_eq!(table.cell(row, 1), None);
        assert_eq!(table.cell(row, 5), None);
    }
}
