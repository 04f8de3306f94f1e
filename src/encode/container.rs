//! GIF89a animation container.
//!
//! Layout produced by [`GifEncoder`]:
//!
//! ```text
//! "GIF89a" | logical screen descriptor (no global color table)
//! [NETSCAPE2.0 looping extension]            written once, before any frame
//! per frame: graphic control extension | image descriptor | local color table
//!            | LZW minimum code size | LZW data sub-blocks
//! trailer 0x3B
//! ```

use crate::encode::lzw::{lzw_encode, min_code_size, write_sub_blocks};
use crate::foundation::core::delay_ms_to_centis;
use crate::foundation::error::{GifError, GifResult};
use crate::palette::mapper::IndexedFrame;
use crate::store::settings::Repeat;

const EXTENSION_INTRODUCER: u8 = 0x21;
const GRAPHIC_CONTROL_LABEL: u8 = 0xF9;
const APPLICATION_LABEL: u8 = 0xFF;
const IMAGE_SEPARATOR: u8 = 0x2C;
const TRAILER: u8 = 0x3B;

/// What a viewer does with a frame's area before drawing the next one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisposalMethod {
    /// Leave the frame in place.
    Keep = 1,
    /// Clear the frame's area to the background (transparent).
    Background = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EncoderState {
    Empty,
    Writing,
    Finished,
}

/// Streaming GIF89a writer: `Empty -> (write_frame)* -> Finished`.
#[derive(Debug)]
pub struct GifEncoder {
    buf: Vec<u8>,
    width: u16,
    height: u16,
    state: EncoderState,
    frames_written: usize,
}

impl GifEncoder {
    /// Start a container for a `width x height` canvas and write the global header.
    pub fn new(width: u32, height: u32, repeat: Repeat) -> GifResult<Self> {
        let to_u16 = |v: u32, axis: &str| {
            u16::try_from(v)
                .ok()
                .filter(|v| *v > 0)
                .ok_or_else(|| GifError::validation(format!("canvas {axis} {v} out of range")))
        };
        let width = to_u16(width, "width")?;
        let height = to_u16(height, "height")?;

        let mut buf = Vec::with_capacity(1024);
        buf.extend_from_slice(b"GIF89a");
        buf.extend_from_slice(&width.to_le_bytes());
        buf.extend_from_slice(&height.to_le_bytes());
        // No global color table, 8-bit color resolution.
        buf.push(0b0111_0000);
        buf.push(0); // background color index
        buf.push(0); // pixel aspect ratio

        let loop_count = match repeat {
            Repeat::Infinite => Some(0),
            Repeat::Finite(n) => Some(n),
            Repeat::None => None,
        };
        if let Some(n) = loop_count {
            buf.extend_from_slice(&[EXTENSION_INTRODUCER, APPLICATION_LABEL, 0x0B]);
            buf.extend_from_slice(b"NETSCAPE2.0");
            buf.extend_from_slice(&[0x03, 0x01]);
            buf.extend_from_slice(&n.to_le_bytes());
            buf.push(0);
        }

        Ok(Self {
            buf,
            width,
            height,
            state: EncoderState::Empty,
            frames_written: 0,
        })
    }

    /// Append one frame block. The frame is consumed.
    pub fn write_frame(&mut self, frame: IndexedFrame, delay_ms: u32) -> GifResult<()> {
        if self.state == EncoderState::Finished {
            return Err(GifError::encoder_misuse("write_frame called after finish"));
        }
        self.check_frame(&frame)?;

        let disposal = if frame.transparent_index.is_some() {
            DisposalMethod::Background
        } else {
            DisposalMethod::Keep
        };
        let packed = ((disposal as u8) << 2) | u8::from(frame.transparent_index.is_some());
        self.buf
            .extend_from_slice(&[EXTENSION_INTRODUCER, GRAPHIC_CONTROL_LABEL, 0x04, packed]);
        self.buf
            .extend_from_slice(&delay_ms_to_centis(delay_ms).to_le_bytes());
        self.buf.push(frame.transparent_index.unwrap_or(0));
        self.buf.push(0);

        let table_bits = frame.palette.table_bits();
        self.buf.push(IMAGE_SEPARATOR);
        self.buf.extend_from_slice(&0u16.to_le_bytes());
        self.buf.extend_from_slice(&0u16.to_le_bytes());
        self.buf
            .extend_from_slice(&(frame.width as u16).to_le_bytes());
        self.buf
            .extend_from_slice(&(frame.height as u16).to_le_bytes());
        // Local color table present, not interlaced, not sorted.
        self.buf.push(0x80 | (table_bits - 1));
        self.buf.extend_from_slice(&frame.palette.table_bytes());

        let mcs = min_code_size(table_bits);
        let data = lzw_encode(&frame.indices, mcs)?;
        self.buf.push(mcs);
        write_sub_blocks(&mut self.buf, &data);

        self.state = EncoderState::Writing;
        self.frames_written += 1;
        Ok(())
    }

    fn check_frame(&self, frame: &IndexedFrame) -> GifResult<()> {
        if frame.width == 0
            || frame.height == 0
            || frame.width > u32::from(self.width)
            || frame.height > u32::from(self.height)
        {
            return Err(GifError::validation(format!(
                "frame {}x{} does not fit canvas {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        if frame.indices.len() != frame.width as usize * frame.height as usize {
            return Err(GifError::validation(format!(
                "frame has {} indices, expected {}",
                frame.indices.len(),
                frame.width as usize * frame.height as usize
            )));
        }
        let colors = frame.palette.len();
        if colors == 0 {
            return Err(GifError::validation("frame palette is empty"));
        }
        if let Some(t) = frame.transparent_index
            && usize::from(t) >= colors
        {
            return Err(GifError::validation(format!(
                "transparent index {t} outside palette of {colors}"
            )));
        }
        if let Some(bad) = frame.indices.iter().find(|i| usize::from(**i) >= colors) {
            return Err(GifError::validation(format!(
                "pixel index {bad} outside palette of {colors}"
            )));
        }
        Ok(())
    }

    /// Write the trailer. Terminal: later writes and a second `finish` are misuse.
    pub fn finish(&mut self) -> GifResult<()> {
        if self.state == EncoderState::Finished {
            return Err(GifError::encoder_misuse("finish called twice"));
        }
        self.buf.push(TRAILER);
        self.state = EncoderState::Finished;
        Ok(())
    }

    /// Complete container bytes; only available after [`GifEncoder::finish`].
    pub fn bytes(&self) -> GifResult<&[u8]> {
        if self.state != EncoderState::Finished {
            return Err(GifError::encoder_misuse("bytes requested before finish"));
        }
        Ok(&self.buf)
    }

    /// Take the complete container bytes; only available after [`GifEncoder::finish`].
    pub fn into_bytes(self) -> GifResult<Vec<u8>> {
        if self.state != EncoderState::Finished {
            return Err(GifError::encoder_misuse("bytes requested before finish"));
        }
        Ok(self.buf)
    }

    /// Frame blocks written so far.
    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Canvas size declared in the header.
    pub fn canvas_size(&self) -> (u16, u16) {
        (self.width, self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/container.rs"]
mod tests;
