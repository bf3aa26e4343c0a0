//! Core extractor trait
//!
//! An extractor turns a project root into the flat list of classes it
//! declares. Each source language would provide its own implementation;
//! TypeScript lives in [`crate::plugins::typescript`].

use std::path::Path;

use super::error::Result;
use super::types::ClassEntity;

/// Core trait for class extractors
///
/// # Example
/// ```no_run
/// use space_cadet::core::Extractor;
/// use space_cadet::plugins::typescript::TypeScriptExtractor;
///
/// let extractor = TypeScriptExtractor::new();
/// let classes = extractor.extract(std::path::Path::new(".")).unwrap();
/// ```
pub trait Extractor: Send {
    /// Collect every class declared in the project rooted at `project_root`
    ///
    /// Entities come back unplaced, in an order that is stable for a fixed
    /// input.
    fn extract(&self, project_root: &Path) -> Result<Vec<ClassEntity>>;

    /// Get the name of this extractor
    fn name(&self) -> &'static str;
}
