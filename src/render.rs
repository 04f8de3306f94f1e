/// Letterboxed canvas compositing and transparency resolution.
pub mod composite;

pub use composite::{CompositedFrame, DrawRect, composite, fit_rect, resolve_transparency};
