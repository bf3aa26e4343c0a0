//! Host-facing session: state reconciliation and the explorer panel

mod explorer;
mod reconciler;

pub use explorer::*;
pub use reconciler::*;
