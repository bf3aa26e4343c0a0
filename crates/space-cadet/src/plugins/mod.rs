//! Extractor plugins for supported source languages
//!
//! Each plugin implements [`crate::core::Extractor`] for one language.

pub mod typescript;

pub use typescript::TypeScriptExtractor;
