use std::path::Path;

use anyhow::{Context, Result};

use crate::core::models::cost::CostTable;

const MONTHLY_TITLE: &str = "Monthly Cost report";
const DAILY_TITLE: &str = "Daily Cost report";
const TOTAL_LABEL: &str = "Total Organization costs";
const TABLE_CLASS: &str = "cost-report";

/// Fallback stylesheet used when no stylesheet path is configured.
const DEFAULT_STYLESHEET: &str = r#"table.cost-report {
  border-collapse: collapse;
  font-family: sans-serif;
}
table.cost-report th, table.cost-report td {
  border: 1px solid #8cbf8c;
  padding: 4px 12px;
  text-align: left;
}
table.cost-report th {
  background-color: #2e7d32;
  color: #ffffff;
}
"#;

/// Read the configured stylesheet once per run. A missing or unreadable file
/// aborts the run; only an unconfigured path falls back to the built-in CSS.
pub fn load_stylesheet(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stylesheet {}", path.display())),
        None => Ok(DEFAULT_STYLESHEET.to_string()),
    }
}

/// Format a cost amount for display.
pub fn format_amount(amount: f64) -> String {
    format!("{:.2} USD", amount)
}

/// Escape text content for HTML. Account names come from an external
/// directory and are not trusted to be markup-free.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn push_row(out: &mut String, cells: [&str; 3]) {
    out.push_str("<tr>");
    for cell in cells {
        out.push_str("<td>");
        out.push_str(cell);
        out.push_str("</td>");
    }
    out.push_str("</tr>\n");
}

/// Render the table body: one row per account in table order, a blank spacer
/// row, then the grand-total row. Kept separate from the document shell so
/// it can be tested on its own.
fn table_rows(table: &CostTable) -> String {
    let mut out = String::new();
    for entry in &table.entries {
        push_row(
            &mut out,
            [
                &escape_html(&entry.account_id),
                &escape_html(&entry.account_name),
                &format_amount(entry.total),
            ],
        );
    }
    push_row(&mut out, ["", "", ""]);
    push_row(&mut out, ["", TOTAL_LABEL, &format_amount(table.grand_total)]);
    out
}

/// Render one reporting window as a complete HTML document.
fn render_window(title: &str, css: &str, table: &CostTable) -> String {
    format!(
        "<html>\n<head>\n<style>\n{css}\n</style>\n</head>\n<body>\n\
         <h1>{title}</h1>\n\
         <table class=\"{TABLE_CLASS}\">\n\
         <tr><th>Account ID</th><th>Name</th><th>Total Cost</th></tr>\n\
         {rows}\
         </table>\n</body>\n</html>\n",
        rows = table_rows(table),
    )
}

/// Render the combined report body: the monthly document followed by the
/// daily document, both embedding the same stylesheet.
pub fn render_report(css: &str, monthly: &CostTable, daily: &CostTable) -> String {
    let mut body = render_window(MONTHLY_TITLE, css, monthly);
    body.push_str(&render_window(DAILY_TITLE, css, daily));
    body
}
