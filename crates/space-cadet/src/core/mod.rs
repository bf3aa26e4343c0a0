//! Core abstractions for class extraction and view-state handling
//!
//! This module defines the data model and the traits the extractor,
//! reconciler and hosts plug into.

mod config;
mod display;
mod error;
mod extractor;
pub mod logging;
mod store;
mod types;

pub use config::*;
pub use display::*;
pub use error::*;
pub use extractor::*;
pub use logging::*;
pub use store::*;
pub use types::*;
