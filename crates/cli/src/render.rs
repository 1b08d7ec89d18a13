//! Grid output: aligned text table, CSV and JSON.

use std::io::Write;

use sheetsync_core::{col_to_letters, CellGrid, PendingChange};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest a column may get in the text table before cells are cut.
pub(crate) const MAX_CELL_WIDTH: usize = 24;

/// Display width of a string, counting CJK and emoji as two columns.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` to at most `width` display columns, marking the cut with "..".
/// Uses display width so CJK and emoji stay aligned.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if UnicodeWidthStr::width(s) <= width {
        return s.to_string();
    }
    let (budget, marker) = if width >= 3 { (width - 2, "..") } else { (width, "") };

    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = ch.width().unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out.push_str(marker);
    out
}

/// Exactly `width` display columns: padded with spaces or cut.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let cut = truncate_display(s, width);
    let used = UnicodeWidthStr::width(cut.as_str());
    format!("{}{}", cut, " ".repeat(width.saturating_sub(used)))
}

/// Text table with column labels across the top and 1-based row numbers.
pub(crate) fn table(grid: &CellGrid) -> String {
    if grid.is_empty() {
        return "(empty worksheet)\n".to_string();
    }

    let gutter = grid.row_count().to_string().len();
    let widths: Vec<usize> = (0..grid.width())
        .map(|c| {
            let label = col_to_letters(c).len();
            let widest = grid
                .rows()
                .iter()
                .map(|row| row.get(c).map_or(0, |v| UnicodeWidthStr::width(v.as_str())))
                .max()
                .unwrap_or(0);
            label.max(widest).min(MAX_CELL_WIDTH)
        })
        .collect();

    let mut out = String::new();
    out.push_str(&" ".repeat(gutter));
    for (c, w) in widths.iter().enumerate() {
        out.push_str("  ");
        out.push_str(&pad_right(&col_to_letters(c), *w));
    }
    out.push('\n');

    for (r, row) in grid.rows().iter().enumerate() {
        out.push_str(&format!("{:>gutter$}", r + 1));
        for (value, w) in row.iter().zip(&widths) {
            out.push_str("  ");
            out.push_str(&pad_right(value, *w));
        }
        out.push('\n');
    }

    // Padding on the last column is noise.
    out.lines().map(str::trim_end).collect::<Vec<_>>().join("\n") + "\n"
}

/// Grid as CSV, one record per row.
pub(crate) fn write_csv<W: Write>(grid: &CellGrid, out: W) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(out);
    for row in grid.rows() {
        writer.write_record(row).map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())
}

/// `{"worksheet": ..., "rows": [[...]]}` for scripting.
pub(crate) fn json(worksheet: &str, grid: &CellGrid) -> serde_json::Value {
    serde_json::json!({
        "worksheet": worksheet,
        "rows": grid.rows(),
    })
}

/// One line per pending change: `B2 = 9 (edit)`.
pub(crate) fn pending_lines(changes: &[PendingChange]) -> String {
    let mut out = String::new();
    for change in changes {
        let origin = match change.origin {
            sheetsync_core::ChangeOrigin::Edit => "edit",
            sheetsync_core::ChangeOrigin::Append => "append",
        };
        out.push_str(&format!(
            "{}{} = {} ({})\n",
            col_to_letters(change.col),
            change.row + 1,
            change.value,
            origin
        ));
    }
    out
}
