//! Table extraction (spec.md §4 Content Extractor, `tables[]`).
//!
//! A deliberately simple `<table>` → `{caption, headers, rows}` walk, not the
//! colspan/rowspan-aware tree `riptide-html::table_extraction` builds — the
//! data model (spec.md §3.1) wants flat rows, not a merge-aware grid.

use fathom_types::ExtractedTable;
use scraper::{ElementRef, Html, Selector};

pub fn extract_tables(document: &Html) -> Vec<ExtractedTable> {
    let Ok(table_selector) = Selector::parse("table") else {
        return Vec::new();
    };

    document
        .select(&table_selector)
        .map(extract_one_table)
        .collect()
}

fn extract_one_table(table: ElementRef) -> ExtractedTable {
    ExtractedTable {
        caption: extract_caption(table),
        headers: extract_headers(table),
        rows: extract_rows(table),
    }
}

fn extract_caption(table: ElementRef) -> Option<String> {
    let selector = Selector::parse("caption").ok()?;
    let text: String = table.select(&selector).next()?.text().collect();
    let cleaned = text.trim().to_string();
    (!cleaned.is_empty()).then_some(cleaned)
}

fn extract_headers(table: ElementRef) -> Vec<String> {
    let Ok(th_selector) = Selector::parse("thead th, tr:first-child th") else {
        return Vec::new();
    };
    table
        .select(&th_selector)
        .map(cell_text)
        .filter(|s| !s.is_empty())
        .collect()
}

fn extract_rows(table: ElementRef) -> Vec<Vec<String>> {
    let (Ok(row_selector), Ok(cell_selector)) = (
        Selector::parse("tbody tr, tr"),
        Selector::parse("td"),
    ) else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for row in table.select(&row_selector) {
        let cells: Vec<String> = row.select(&cell_selector).map(cell_text).collect();
        if !cells.is_empty() {
            rows.push(cells);
        }
    }
    rows
}

fn cell_text(element: ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_headers_and_rows() {
        let html = r#"<table>
            <caption>Pricing</caption>
            <thead><tr><th>Plan</th><th>Price</th></tr></thead>
            <tbody>
                <tr><td>Basic</td><td>$9</td></tr>
                <tr><td>Pro</td><td>$29</td></tr>
            </tbody>
        </table>"#;
        let doc = Html::parse_fragment(html);
        let tables = extract_tables(&doc);
        assert_eq!(tables.len(), 1);
        let table = &tables[0];
        assert_eq!(table.caption.as_deref(), Some("Pricing"));
        assert_eq!(table.headers, vec!["Plan", "Price"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["Basic", "$9"]);
    }

    #[test]
    fn handles_table_without_thead() {
        let html = "<table><tr><td>A</td><td>B</td></tr></table>";
        let doc = Html::parse_fragment(html);
        let tables = extract_tables(&doc);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 1);
    }

    #[test]
    fn no_tables_returns_empty() {
        let doc = Html::parse_document("<html><body><p>no tables here</p></body></html>");
        assert!(extract_tables(&doc).is_empty());
    }
}
