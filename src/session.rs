//! Generation orchestration, debounced auto-runs and the workspace context object.

/// Single-flight generation controller.
pub mod controller;
/// Single-slot debounced trigger.
pub mod debounce;
/// Observable generation state and run results.
pub mod state;
/// Shared editor state with auto-generation.
pub mod workspace;

pub use controller::{GenerateOpts, GenerationController, RunInput};
pub use debounce::{DEFAULT_DEBOUNCE_MS, DebouncedTrigger, RunTicket};
pub use state::{GenerationState, GifOutput, RunOutcome, SkipReason};
pub use workspace::Workspace;
