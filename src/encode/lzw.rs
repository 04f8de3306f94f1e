//! Variable-code-width LZW as used by GIF image data.
//!
//! Codes are packed least-significant-bit first. The stream opens with a clear code, grows
//! the code width as the dictionary fills (up to 12 bits), emits a clear code and restarts
//! when all 4096 codes are taken, and ends with the end-of-information code.

use std::collections::HashMap;

use crate::foundation::error::{GifError, GifResult};

const MAX_CODE_BITS: u8 = 12;
const MAX_CODES: u16 = 1 << MAX_CODE_BITS;

/// Longest data sub-block the container allows.
pub const MAX_SUB_BLOCK_LEN: usize = 255;

struct BitWriter {
    out: Vec<u8>,
    acc: u32,
    bits: u8,
}

impl BitWriter {
    fn new() -> Self {
        Self {
            out: Vec::new(),
            acc: 0,
            bits: 0,
        }
    }

    fn write(&mut self, code: u16, width: u8) {
        self.acc |= u32::from(code) << self.bits;
        self.bits += width;
        while self.bits >= 8 {
            self.out.push((self.acc & 0xff) as u8);
            self.acc >>= 8;
            self.bits -= 8;
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.bits > 0 {
            self.out.push((self.acc & 0xff) as u8);
        }
        self.out
    }
}

/// Smallest legal GIF minimum code size for a color table of `2^table_bits` entries.
pub fn min_code_size(table_bits: u8) -> u8 {
    table_bits.clamp(2, 8)
}

/// Compress palette indices into a raw LZW code stream (not yet split into sub-blocks).
///
/// Every index must be below `2^min_code_size`.
pub fn lzw_encode(indices: &[u8], min_code_size: u8) -> GifResult<Vec<u8>> {
    if !(2..=8).contains(&min_code_size) {
        return Err(GifError::validation(format!(
            "lzw minimum code size must be 2..=8, got {min_code_size}"
        )));
    }
    let clear = 1u16 << min_code_size;
    let eoi = clear + 1;
    if let Some(bad) = indices.iter().find(|i| u16::from(**i) >= clear) {
        return Err(GifError::validation(format!(
            "index {bad} does not fit minimum code size {min_code_size}"
        )));
    }

    let mut w = BitWriter::new();
    let mut dict: HashMap<(u16, u8), u16> = HashMap::new();
    let mut next = eoi + 1;
    let mut width = min_code_size + 1;

    w.write(clear, width);

    let Some((&first, rest)) = indices.split_first() else {
        w.write(eoi, width);
        return Ok(w.finish());
    };

    let mut prefix = u16::from(first);
    for &k in rest {
        if let Some(&code) = dict.get(&(prefix, k)) {
            prefix = code;
            continue;
        }

        w.write(prefix, width);
        if next < MAX_CODES {
            dict.insert((prefix, k), next);
            next += 1;
            if next > (1 << width) && width < MAX_CODE_BITS {
                width += 1;
            }
        } else {
            w.write(clear, width);
            dict.clear();
            next = eoi + 1;
            width = min_code_size + 1;
        }
        prefix = u16::from(k);
    }

    w.write(prefix, width);
    // The decoder adds one more entry after reading the final code and may widen before EOI.
    if next == (1 << width) && width < MAX_CODE_BITS {
        width += 1;
    }
    w.write(eoi, width);
    Ok(w.finish())
}

/// Frame `data` as length-prefixed sub-blocks followed by the zero-length terminator.
pub fn write_sub_blocks(out: &mut Vec<u8>, data: &[u8]) {
    for chunk in data.chunks(MAX_SUB_BLOCK_LEN) {
        out.push(chunk.len() as u8);
        out.extend_from_slice(chunk);
    }
    out.push(0);
}

#[cfg(test)]
#[path = "../../tests/unit/encode/lzw.rs"]
mod tests;
