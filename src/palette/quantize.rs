//! Bucketed median-cut palette reduction.
//!
//! Pixels are first binned into reduced-precision color buckets (`rgb444` or `rgb565`), so
//! time and memory are bounded by the bucket count rather than by the number of distinct
//! colors. Buckets are then split by weighted median cut until the palette budget is met.
//! An optional reserved color bypasses the histogram and always gets its own exact entry.

use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgb8;
use crate::foundation::error::{GifError, GifResult};

/// Largest palette a frame may carry.
pub const MAX_PALETTE_LEN: usize = 256;

/// Precision of the quantizer's color buckets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteFormat {
    /// 4 bits per channel, 4096 buckets.
    #[default]
    Rgb444,
    /// 5/6/5 bits per channel, 65536 buckets.
    Rgb565,
}

impl PaletteFormat {
    fn channel_bits(self) -> [u32; 3] {
        match self {
            Self::Rgb444 => [4, 4, 4],
            Self::Rgb565 => [5, 6, 5],
        }
    }

    fn bucket_count(self) -> usize {
        1 << self.channel_bits().iter().sum::<u32>()
    }

    fn bucket_of(self, c: Rgb8) -> usize {
        let [rb, gb, bb] = self.channel_bits();
        let r = usize::from(c[0] >> (8 - rb));
        let g = usize::from(c[1] >> (8 - gb));
        let b = usize::from(c[2] >> (8 - bb));
        (r << (gb + bb)) | (g << bb) | b
    }
}

/// Ordered color table of at most [`MAX_PALETTE_LEN`] entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb8>,
}

impl Palette {
    /// Build a palette from explicit colors.
    pub fn new(colors: Vec<Rgb8>) -> GifResult<Self> {
        if colors.len() > MAX_PALETTE_LEN {
            return Err(GifError::validation(format!(
                "palette has {} colors, at most {MAX_PALETTE_LEN} allowed",
                colors.len()
            )));
        }
        Ok(Self { colors })
    }

    /// Entries in index order.
    pub fn colors(&self) -> &[Rgb8] {
        &self.colors
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// `true` when the palette has no entries.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Index of the first entry exactly equal to `color`.
    pub fn position(&self, color: Rgb8) -> Option<u8> {
        self.colors
            .iter()
            .position(|c| *c == color)
            .and_then(|i| u8::try_from(i).ok())
    }

    /// Bits needed to address the padded color table (1..=8).
    pub fn table_bits(&self) -> u8 {
        let mut bits = 1u8;
        while (1usize << bits) < self.colors.len() {
            bits += 1;
        }
        bits
    }

    /// Color table bytes padded with black to `2^table_bits()` entries.
    pub fn table_bytes(&self) -> Vec<u8> {
        let size = 1usize << self.table_bits();
        let mut out = Vec::with_capacity(size * 3);
        for c in &self.colors {
            out.extend_from_slice(c);
        }
        out.resize(size * 3, 0);
        out
    }
}

/// Palette reduction parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuantizeOpts {
    /// Upper bound on palette entries (clamped to 1..=256).
    pub max_colors: usize,
    /// Bucket precision.
    pub format: PaletteFormat,
    /// Color that, when present in the input, is kept as an exact palette entry.
    pub reserved: Option<Rgb8>,
}

impl Default for QuantizeOpts {
    fn default() -> Self {
        Self {
            max_colors: MAX_PALETTE_LEN,
            format: PaletteFormat::default(),
            reserved: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Bucket {
    count: u64,
    sum: [u64; 3],
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    color: Rgb8,
    count: u64,
}

/// Reduce the RGB content of an RGBA8 buffer to a bounded palette.
///
/// Alpha is ignored; callers resolve transparency before quantizing. The result is fully
/// deterministic for identical input.
pub fn quantize(rgba: &[u8], opts: &QuantizeOpts) -> GifResult<Palette> {
    if !rgba.len().is_multiple_of(4) {
        return Err(GifError::validation("quantize expects an rgba8 buffer"));
    }
    if opts.reserved.is_some() && opts.max_colors < 2 {
        return Err(GifError::validation(
            "a reserved color needs room for at least one other palette entry",
        ));
    }
    let max_colors = opts.max_colors.clamp(1, MAX_PALETTE_LEN);

    let mut buckets = vec![Bucket::default(); opts.format.bucket_count()];
    let mut reserved_seen = false;
    for px in rgba.chunks_exact(4) {
        let c = [px[0], px[1], px[2]];
        if opts.reserved == Some(c) {
            reserved_seen = true;
            continue;
        }
        let b = &mut buckets[opts.format.bucket_of(c)];
        b.count += 1;
        for ch in 0..3 {
            b.sum[ch] += u64::from(c[ch]);
        }
    }

    let entries: Vec<Entry> = buckets
        .iter()
        .filter(|b| b.count > 0)
        .map(|b| Entry {
            color: mean_color(b.sum, b.count),
            count: b.count,
        })
        .collect();

    let slots = if reserved_seen {
        max_colors - 1
    } else {
        max_colors
    };
    let mut colors = if entries.len() <= slots {
        entries.iter().map(|e| e.color).collect()
    } else {
        median_cut(entries, slots)
    };

    if let Some(reserved) = opts.reserved.filter(|_| reserved_seen) {
        for c in colors.iter_mut().filter(|c| **c == reserved) {
            *c = nudge(*c);
        }
        colors.push(reserved);
    }

    Palette::new(colors)
}

fn mean_color(sum: [u64; 3], count: u64) -> Rgb8 {
    let half = count / 2;
    [
        ((sum[0] + half) / count).min(255) as u8,
        ((sum[1] + half) / count).min(255) as u8,
        ((sum[2] + half) / count).min(255) as u8,
    ]
}

/// Move a color one step away from where it is, keeping it in range.
fn nudge(c: Rgb8) -> Rgb8 {
    let mut out = c;
    out[2] = if c[2] > 0 { c[2] - 1 } else { 1 };
    out
}

fn channel_range(entries: &[Entry], ch: usize) -> u8 {
    let (lo, hi) = entries.iter().fold((u8::MAX, u8::MIN), |(lo, hi), e| {
        (lo.min(e.color[ch]), hi.max(e.color[ch]))
    });
    hi.saturating_sub(lo)
}

fn widest_channel(entries: &[Entry]) -> (usize, u8) {
    (0..3)
        .map(|ch| (ch, channel_range(entries, ch)))
        .fold((0, 0), |best, cur| if cur.1 > best.1 { cur } else { best })
}

fn median_cut(entries: Vec<Entry>, slots: usize) -> Vec<Rgb8> {
    if slots == 0 {
        return Vec::new();
    }
    let mut boxes: Vec<Vec<Entry>> = vec![entries];

    while boxes.len() < slots {
        let pick = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.len() > 1)
            .map(|(i, b)| {
                let (_, range) = widest_channel(b);
                let weight: u64 = b.iter().map(|e| e.count).sum();
                (i, range, weight)
            })
            .max_by(|a, b| a.1.cmp(&b.1).then(a.2.cmp(&b.2)).then(b.0.cmp(&a.0)));
        let Some((idx, _, _)) = pick else {
            break;
        };

        let mut target = boxes.swap_remove(idx);
        let (ch, _) = widest_channel(&target);
        target.sort_by_key(|e| (e.color[ch], e.color));

        let total: u64 = target.iter().map(|e| e.count).sum();
        let mut acc = 0u64;
        let mut split = 1;
        for (i, e) in target.iter().enumerate() {
            acc += e.count;
            if acc * 2 >= total {
                split = i + 1;
                break;
            }
        }
        let split = split.clamp(1, target.len() - 1);
        let upper = target.split_off(split);
        boxes.push(target);
        boxes.push(upper);
    }

    let mut colors: Vec<Rgb8> = boxes
        .iter()
        .map(|b| {
            let mut sum = [0u64; 3];
            let mut count = 0u64;
            for e in b {
                for ch in 0..3 {
                    sum[ch] += u64::from(e.color[ch]) * e.count;
                }
                count += e.count;
            }
            mean_color(sum, count.max(1))
        })
        .collect();
    colors.sort_unstable();
    colors.dedup();
    colors
}

#[cfg(test)]
#[path = "../../tests/unit/palette/quantize.rs"]
mod tests;
