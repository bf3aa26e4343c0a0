//! Terminal rendering of the view-state
//!
//! Draws the classes as an aligned table, colored with crossterm when the
//! output is a terminal.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crossterm::style::{Color, Stylize};
use unicode_width::UnicodeWidthStr;

use space_cadet::{ClassEntity, Display, DocumentOpener, Result, ViewState};

const HEADERS: [&str; 3] = ["CLASS", "POSITION", "PATH"];
const UNPLACED: &str = "-";

/// Render `state` as a table, paths shown relative to `base` when possible
pub fn render_table(state: &ViewState, base: Option<&Path>, color: bool) -> String {
    let rows: Vec<[String; 3]> = state
        .entities()
        .iter()
        .map(|entity| row(entity, base))
        .collect();

    let mut widths = HEADERS.map(UnicodeWidthStr::width);
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.width());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths)
        .map(|(title, width)| paint(&pad(title, width), Color::DarkGrey, color))
        .collect();
    push_line(&mut out, &header);

    for [name, position, path] in &rows {
        let position_color = if position.as_str() == UNPLACED {
            Color::DarkGrey
        } else {
            Color::Yellow
        };
        push_line(
            &mut out,
            &[
                paint(&pad(name, widths[0]), Color::Cyan, color),
                paint(&pad(position, widths[1]), position_color, color),
                path.clone(),
            ],
        );
    }

    out.push_str(&format!(
        "{} classes, {} placed\n",
        state.len(),
        state.placed_count()
    ));
    out
}

fn row(entity: &ClassEntity, base: Option<&Path>) -> [String; 3] {
    let position = entity
        .position()
        .map(|position| position.to_string())
        .unwrap_or_else(|| UNPLACED.to_string());
    let path = Path::new(entity.path());
    let shown = base
        .and_then(|base| path.strip_prefix(base).ok())
        .unwrap_or(path);
    [
        entity.name().to_string(),
        position,
        shown.display().to_string(),
    ]
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        format!("{}", text.with(color))
    } else {
        text.to_string()
    }
}

fn push_line(out: &mut String, cells: &[String]) {
    out.push_str(cells.join("  ").trim_end());
    out.push('\n');
}

/// Display surface that prints a table on every render
pub struct TableDisplay<W: Write + Send> {
    writer: W,
    base: Option<PathBuf>,
    color: bool,
}

impl<W: Write + Send> TableDisplay<W> {
    pub fn new(writer: W, color: bool) -> Self {
        Self {
            writer,
            base: None,
            color,
        }
    }

    /// Show paths relative to `base`
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }
}

impl<W: Write + Send> Display for TableDisplay<W> {
    fn render(&mut self, state: &ViewState) -> Result<()> {
        let table = render_table(state, self.base.as_deref(), self.color);
        self.writer.write_all(table.as_bytes())?;
        self.writer.flush()?;
        Ok(())
    }

    fn dispose(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Opener for terminal hosts: reports the path on stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintOpener;

impl DocumentOpener for PrintOpener {
    fn open_document(&mut self, path: &str) -> Result<()> {
        writeln!(io::stderr(), "open {}", path)?;
        Ok(())
    }
}
