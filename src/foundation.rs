/// Shared primitive types, bounds and clamping helpers.
pub mod core;
/// Error type and result alias.
pub mod error;
