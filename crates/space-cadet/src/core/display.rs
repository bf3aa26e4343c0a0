//! Display surface abstractions
//!
//! The display draws the view-state and reports user actions back as
//! [`DisplayEvent`]s. Opening a document is left entirely to the host.

use serde::{Deserialize, Serialize};

use super::error::Result;
use super::types::{Position, ViewState};

/// A surface that draws the current view-state
pub trait Display: Send {
    /// Push the full state to the surface
    fn render(&mut self, state: &ViewState) -> Result<()>;

    /// Bring an already open surface to the front
    fn reveal(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release the surface; no further calls follow
    fn dispose(&mut self) {}
}

/// Host hook for opening a source file
pub trait DocumentOpener: Send {
    fn open_document(&mut self, path: &str) -> Result<()>;
}

/// Opener that does nothing, for hosts without an editor
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOpener;

impl DocumentOpener for NoopOpener {
    fn open_document(&mut self, _path: &str) -> Result<()> {
        Ok(())
    }
}

/// Inbound message from a display surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum DisplayEvent {
    /// Open the file at `path` in the host
    Open { path: String },
    /// The user dragged a node to `(x, y)`
    Move {
        path: String,
        x: f64,
        y: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl DisplayEvent {
    pub fn open(path: impl Into<String>) -> Self {
        Self::Open { path: path.into() }
    }

    pub fn move_to(path: impl Into<String>, x: f64, y: f64) -> Self {
        Self::Move {
            path: path.into(),
            x,
            y,
            name: None,
        }
    }

    pub fn move_named(path: impl Into<String>, name: impl Into<String>, x: f64, y: f64) -> Self {
        Self::Move {
            path: path.into(),
            x,
            y,
            name: Some(name.into()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Open { path } | Self::Move { path, .. } => path,
        }
    }

    /// Target position of a move event
    pub fn position(&self) -> Option<Position> {
        match self {
            Self::Move { x, y, .. } => Some(Position::new(*x, *y)),
            Self::Open { .. } => None,
        }
    }
}

/// Display that renders each state as one JSON line on a writer
pub struct JsonLinesDisplay<W: std::io::Write + Send> {
    writer: W,
}

impl<W: std::io::Write + Send> JsonLinesDisplay<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: std::io::Write + Send> Display for JsonLinesDisplay<W> {
    fn render(&mut self, state: &ViewState) -> Result<()> {
        serde_json::to_writer(&mut self.writer, state)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
