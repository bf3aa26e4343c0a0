//! Space Cadet - explore the classes of a TypeScript project on a canvas
//!
//! The library finds every class declared in a project, keeps a persisted
//! view-state of where the user placed each one, and drives a display panel
//! through an explorer session.
//!
//! # Quick Start
//!
//! ```no_run
//! use space_cadet::extract;
//!
//! for class in extract(".").unwrap() {
//!     println!("{} ({})", class.name(), class.path());
//! }
//! ```
//!
//! # Sessions
//!
//! Hosts wire a store, an extractor and a display together:
//!
//! ```no_run
//! use space_cadet::prelude::*;
//!
//! let reconciler = StateReconciler::typescript(MemoryStore::new(), ExplorerConfig::default());
//! let mut explorer = Explorer::new(reconciler, Some(".".into()), || {
//!     Box::new(JsonLinesDisplay::new(std::io::stdout())) as Box<dyn Display>
//! });
//!
//! explorer.execute(ExplorerCommand::Explore).unwrap();
//! explorer.handle_event(DisplayEvent::move_to("/work/app/src/a.ts", 10.0, 20.0)).unwrap();
//! ```

pub mod core;
pub mod plugins;
pub mod session;

pub use core::*;

use std::path::Path;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        ClassEntity, Display, DisplayEvent, DocumentOpener, ExplorerConfig, ExplorerError,
        Extractor, JsonFileStore, JsonLinesDisplay, KeyValueStore, MatchPolicy, MemoryStore,
        Position, Source, ViewState,
    };
    pub use crate::plugins::typescript::TypeScriptExtractor;
    pub use crate::session::{Explorer, ExplorerCommand, PanelState, StateReconciler};
}

/// Extract every class in the TypeScript project rooted at `project_root`
///
/// Uses the default configuration. Fails with
/// [`ExplorerError::ConfigNotFound`] when no `tsconfig.json` exists at or
/// above the root.
pub fn extract(project_root: impl AsRef<Path>) -> Result<Vec<ClassEntity>> {
    plugins::typescript::TypeScriptExtractor::new().extract(project_root.as_ref())
}

/// Extract with an explicit configuration
pub fn extract_with_config(
    project_root: impl AsRef<Path>,
    config: ExplorerConfig,
) -> Result<Vec<ClassEntity>> {
    plugins::typescript::TypeScriptExtractor::with_config(config).extract(project_root.as_ref())
}
