//! Static print rendering.
//!
//! Produces a plain HTML table of every row in the current view (no
//! virtualization), visible columns only, with the same display text as the
//! grid cells.

use std::fmt::Write as _;

use super::builder::RenderContext;

/// Wrapper class of the print block.
pub const PRINT_CLASS: &str = "dyngrid-print";

/// Minimal HTML escaping for text and attribute content.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the view as a `<table>`.
pub fn print_table(ctx: &RenderContext<'_>) -> String {
    let visible: Vec<usize> = ctx
        .columns
        .iter()
        .enumerate()
        .filter(|(_, column)| column.visible)
        .map(|(col, _)| col)
        .collect();

    let mut out = String::from("<table>\n<thead>\n<tr>");
    for column in visible.iter().filter_map(|col| ctx.columns.get(*col)) {
        let _ = write!(out, "<th>{}</th>", html_escape(&column.name));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in 0..ctx.view.len() {
        out.push_str("<tr>");
        for &col in &visible {
            let Some(column) = ctx.columns.get(col) else {
                continue;
            };
            let _ = write!(
                out,
                "<td style=\"width:{}px\" class=\"{}\">{}</td>",
                column.width,
                column.column_type.as_str(),
                html_escape(&ctx.cell_text(row, col)),
            );
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    out
}
