//! Container encoding: LZW compression and GIF89a framing.

/// GIF89a container writer.
pub mod container;
/// GIF-flavored LZW compressor.
pub mod lzw;

pub use container::{DisposalMethod, GifEncoder};
