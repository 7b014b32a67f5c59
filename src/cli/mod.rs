//! Command-line facade
//!
//! Provides the commander entry point and help rendering.

pub mod commander;
pub mod help;

pub use commander::Commander;
pub use help::HelpRenderer;
