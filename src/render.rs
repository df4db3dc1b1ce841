//! Plain-text rendering of previews, results and checklists.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::ast::{Cell, Preview, RowOrigin, SchemaOrigin};
use crate::backend::ResultView;
use crate::roadmap::Roadmap;

pub struct RenderOptions {
    /// Shown for a column the row has no value for.
    pub placeholder: String,
    pub ghost_marker: String,
    pub draft_marker: String,
    pub max_cell_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            placeholder: "…".to_string(),
            ghost_marker: "~".to_string(),
            draft_marker: "+".to_string(),
            max_cell_width: 24,
        }
    }
}

pub fn preview_table(preview: &Preview, options: &RenderOptions) -> String {
    let Some(schema) = &preview.schema else {
        return "(no structural preview)\n".to_string();
    };

    let origin = match schema.origin {
        SchemaOrigin::Parsed => "from draft",
        SchemaOrigin::Registry => "known table",
    };
    let mut output = format!("{} ({})\n", schema.table_name, origin);

    if schema.columns.is_empty() {
        output.push_str("(no columns yet)\n");
        return output;
    }

    let mut lines = vec![
        header_line(schema.columns.iter().map(|c| c.name.clone())),
        header_line(schema.columns.iter().map(|c| c.typ.as_str().to_string())),
    ];
    for row in &preview.rows {
        let marker = match row.origin {
            RowOrigin::Existing => &options.ghost_marker,
            RowOrigin::Draft => &options.draft_marker,
        };
        let mut line = vec![marker.clone()];
        line.extend(row.cells.iter().map(|cell| match cell {
            Cell::Value(v) => v.clone(),
            Cell::Missing => options.placeholder.clone(),
        }));
        lines.push(line);
    }

    output.push_str(&grid(&lines, 2, options.max_cell_width));
    output
}

fn header_line(cells: impl Iterator<Item = String>) -> Vec<String> {
    std::iter::once(" ".to_string()).chain(cells).collect()
}

pub fn result_table(view: &ResultView, options: &RenderOptions) -> String {
    match view {
        ResultView::Rows { columns, rows } => {
            let mut lines = vec![columns.clone()];
            lines.extend(rows.iter().cloned());
            grid(&lines, 1, options.max_cell_width)
        }
        ResultView::NoData { message } => format!("(no data) {message}\n"),
        ResultView::Failed(message) => format!("error: {message}\n"),
    }
}

pub fn checklist(roadmap: &Roadmap, progress: &[bool]) -> String {
    if roadmap.is_empty() {
        return "(no suggestions for this question)\n".to_string();
    }

    let mut output = String::new();
    for (i, step) in roadmap.steps.iter().enumerate() {
        let mark = if progress.get(i).copied().unwrap_or(false) {
            'x'
        } else {
            ' '
        };
        output.push_str(&format!("[{}] {}\n", mark, step.description));
    }
    output
}

/// Lay out rows as aligned columns separated by ` | `, with a rule after
/// the first `header_rows` lines. Rows may differ in length.
fn grid(lines: &[Vec<String>], header_rows: usize, max_width: usize) -> String {
    let cells: Vec<Vec<String>> = lines
        .iter()
        .map(|line| line.iter().map(|c| clip(c, max_width)).collect())
        .collect();

    let columns = cells.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|i| {
            cells
                .iter()
                .filter_map(|line| line.get(i))
                .map(|c| c.width())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut output = String::new();
    for (n, line) in cells.iter().enumerate() {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &w)| pad(line.get(i).map(String::as_str).unwrap_or(""), w))
            .collect();
        output.push_str(padded.join(" | ").trim_end());
        output.push('\n');

        if n + 1 == header_rows {
            let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
            output.push_str(&rule.join("-+-"));
            output.push('\n');
        }
    }
    output
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

/// Shorten `text` to at most `max` display columns, ending in an ellipsis.
fn clip(text: &str, max: usize) -> String {
    if text.width() <= max || max == 0 {
        return text.to_string();
    }
    let mut clipped = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        clipped.push(c);
        used += w;
    }
    clipped.push('…');
    clipped
}
