//! Explorer session: commands, the display panel and inbound events
//!
//! An [`Explorer`] is what a host wires up once per workspace. It owns the
//! reconciler and at most one open [`Panel`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info, span, warn, Level};

use super::reconciler::StateReconciler;
use crate::core::{
    Display, DisplayEvent, DocumentOpener, KeyValueStore, NoopOpener, Position, Result,
};

/// Builds a fresh display surface each time a panel opens
pub type DisplayFactory = Box<dyn FnMut() -> Box<dyn Display> + Send>;

/// Host commands the explorer answers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExplorerCommand {
    /// Open (or reveal) the explorer panel
    Explore,
    /// Extract again, keeping the positions of classes that survived
    Refresh,
    /// Forget all persisted state and close the panel
    Reset,
}

impl ExplorerCommand {
    pub const EXPLORE_ID: &'static str = "space-cadet.explore";
    pub const REFRESH_ID: &'static str = "space-cadet.refresh";
    pub const RESET_ID: &'static str = "space-cadet.reset";

    pub fn id(&self) -> &'static str {
        match self {
            ExplorerCommand::Explore => Self::EXPLORE_ID,
            ExplorerCommand::Refresh => Self::REFRESH_ID,
            ExplorerCommand::Reset => Self::RESET_ID,
        }
    }

    pub fn all() -> &'static [ExplorerCommand] {
        &[
            ExplorerCommand::Explore,
            ExplorerCommand::Refresh,
            ExplorerCommand::Reset,
        ]
    }
}

impl fmt::Display for ExplorerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ExplorerCommand {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            Self::EXPLORE_ID => Ok(ExplorerCommand::Explore),
            Self::REFRESH_ID => Ok(ExplorerCommand::Refresh),
            Self::RESET_ID => Ok(ExplorerCommand::Reset),
            _ => Err(format!("Unknown command: {}", s)),
        }
    }
}

/// Lifecycle of the explorer panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Closed,
    Visible,
    Hidden,
}

/// The single open display surface
pub struct Panel {
    display: Box<dyn Display>,
    visible: bool,
}

impl Panel {
    fn new(display: Box<dyn Display>) -> Self {
        Self {
            display,
            visible: true,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

/// One explorer session over a project
pub struct Explorer<S: KeyValueStore> {
    reconciler: StateReconciler<S>,
    project_root: Option<PathBuf>,
    opener: Box<dyn DocumentOpener>,
    display_factory: DisplayFactory,
    panel: Option<Panel>,
}

impl<S: KeyValueStore> Explorer<S> {
    /// Create a session; documents are not opened until an opener is set
    pub fn new<F>(reconciler: StateReconciler<S>, project_root: Option<PathBuf>, factory: F) -> Self
    where
        F: FnMut() -> Box<dyn Display> + Send + 'static,
    {
        Self {
            reconciler,
            project_root,
            opener: Box::new(NoopOpener),
            display_factory: Box::new(factory),
            panel: None,
        }
    }

    pub fn with_opener(mut self, opener: impl DocumentOpener + 'static) -> Self {
        self.opener = Box::new(opener);
        self
    }

    pub fn reconciler(&self) -> &StateReconciler<S> {
        &self.reconciler
    }

    pub fn reconciler_mut(&mut self) -> &mut StateReconciler<S> {
        &mut self.reconciler
    }

    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.panel.is_some()
    }

    pub fn panel_state(&self) -> PanelState {
        match &self.panel {
            None => PanelState::Closed,
            Some(panel) if panel.is_visible() => PanelState::Visible,
            Some(_) => PanelState::Hidden,
        }
    }

    /// Run a host command
    pub fn execute(&mut self, command: ExplorerCommand) -> Result<()> {
        let command_span = span!(Level::INFO, "execute", command = %command);
        let _enter = command_span.enter();

        match command {
            ExplorerCommand::Explore => self.explore(),
            ExplorerCommand::Refresh => self.refresh(),
            ExplorerCommand::Reset => {
                self.reconciler.reset()?;
                self.close();
                Ok(())
            }
        }
    }

    fn explore(&mut self) -> Result<()> {
        if let Some(panel) = self.panel.as_mut() {
            debug!("Revealing open panel");
            panel.visible = true;
            return panel.display.reveal();
        }

        info!("Opening explorer panel");
        let panel = self.panel.insert(Panel::new((self.display_factory)()));
        let state = self.reconciler.ensure(self.project_root.as_deref());
        panel.display.render(state)
    }

    /// Re-extract the project and re-render a visible panel
    ///
    /// Works with the panel closed too; the next explore shows the result.
    pub fn refresh(&mut self) -> Result<()> {
        let Some(root) = self.project_root.as_deref() else {
            warn!("No project root, nothing to refresh");
            return Ok(());
        };
        let state = self.reconciler.refresh(root);
        match self.panel.as_mut() {
            Some(panel) if panel.visible => panel.display.render(state),
            _ => Ok(()),
        }
    }

    /// Handle one inbound display event
    pub fn handle_event(&mut self, event: DisplayEvent) -> Result<()> {
        if self.panel.is_none() {
            warn!(?event, "Ignoring display event with no open panel");
            return Ok(());
        }

        match event {
            DisplayEvent::Open { path } => {
                debug!(path = %path, "Opening document");
                self.opener.open_document(&path)
            }
            DisplayEvent::Move { path, x, y, name } => {
                let moved = self
                    .reconciler
                    .apply_move(&path, name.as_deref(), Position::new(x, y))?;
                if moved {
                    self.render()?;
                }
                Ok(())
            }
        }
    }

    /// Track panel visibility; becoming visible re-renders the state
    pub fn set_visible(&mut self, visible: bool) -> Result<()> {
        let Some(panel) = self.panel.as_mut() else {
            return Ok(());
        };
        panel.visible = visible;
        if visible {
            let state = self.reconciler.ensure(self.project_root.as_deref());
            panel.display.render(state)?;
        }
        Ok(())
    }

    /// Dispose the open panel, if any
    pub fn close(&mut self) {
        if let Some(mut panel) = self.panel.take() {
            panel.display.dispose();
            info!("Closed explorer panel");
        }
    }

    fn render(&mut self) -> Result<()> {
        match self.panel.as_mut() {
            Some(panel) => panel.display.render(self.reconciler.state()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_ids_roundtrip() {
        for command in ExplorerCommand::all() {
            assert_eq!(command.to_string().parse::<ExplorerCommand>(), Ok(*command));
        }
        assert_eq!(ExplorerCommand::Explore.id(), "space-cadet.explore");
        assert_eq!(ExplorerCommand::Refresh.id(), "space-cadet.refresh");
        assert_eq!(ExplorerCommand::Reset.id(), "space-cadet.reset");
        assert!("space-cadet.other".parse::<ExplorerCommand>().is_err());
    }
}
