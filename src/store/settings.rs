use std::path::Path;

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use crate::foundation::core::{clamp_canvas_size, clamp_delay_ms};
use crate::foundation::error::{GifError, GifResult};
use crate::palette::quantize::PaletteFormat;

/// Resampling quality used when a source is scaled onto the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingQuality {
    /// Bilinear.
    Low,
    /// Catmull-Rom.
    Medium,
    /// Lanczos3.
    #[default]
    High,
}

impl SmoothingQuality {
    pub(crate) fn filter(self) -> FilterType {
        match self {
            Self::Low => FilterType::Triangle,
            Self::Medium => FilterType::CatmullRom,
            Self::High => FilterType::Lanczos3,
        }
    }
}

/// A named canvas size offered to users.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizePreset {
    /// Display label, `WxH`.
    pub label: &'static str,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Built-in canvas presets.
pub const SIZE_PRESETS: &[SizePreset] = &[
    SizePreset {
        label: "400x400",
        width: 400,
        height: 400,
    },
    SizePreset {
        label: "480x480",
        width: 480,
        height: 480,
    },
    SizePreset {
        label: "640x640",
        width: 640,
        height: 640,
    },
    SizePreset {
        label: "800x600",
        width: 800,
        height: 600,
    },
    SizePreset {
        label: "1024x768",
        width: 1024,
        height: 768,
    },
];

/// Output canvas the compositor draws every frame onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasSettings {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Resampling filter selection.
    pub smoothing_quality: SmoothingQuality,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            smoothing_quality: SmoothingQuality::High,
        }
    }
}

impl CanvasSettings {
    /// Build settings with the size clamped to the supported bounds.
    pub fn new(width: u32, height: u32, smoothing_quality: SmoothingQuality) -> Self {
        let (width, height) = clamp_canvas_size(width, height);
        Self {
            width,
            height,
            smoothing_quality,
        }
    }

    /// Copy with a new (clamped) size.
    pub fn with_size(self, width: u32, height: u32) -> Self {
        Self::new(width, height, self.smoothing_quality)
    }

    /// Copy with the size of `preset`.
    pub fn apply_preset(self, preset: &SizePreset) -> Self {
        self.with_size(preset.width, preset.height)
    }

    /// Re-clamp after deserialization or direct field edits.
    pub fn validated(self) -> Self {
        Self::new(self.width, self.height, self.smoothing_quality)
    }
}

/// How many times the animation plays.
///
/// A loop count of zero means "forever" in the looping extension, so `Finite(0)` is normalized to
/// `Infinite` on parse and by [`GifSettings::validated`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    /// Loop forever.
    #[default]
    Infinite,
    /// Loop count written into the looping extension.
    Finite(u16),
    /// No looping extension at all; viewers play the animation once.
    None,
}

impl Repeat {
    /// `Finite(n)`, except that zero loops maps to `Infinite`.
    pub fn from_loop_count(n: u16) -> Self {
        match n {
            0 => Self::Infinite,
            n => Self::Finite(n),
        }
    }

    /// Same value with `Finite(0)` folded into `Infinite`.
    pub fn normalized(self) -> Self {
        match self {
            Self::Finite(n) => Self::from_loop_count(n),
            other => other,
        }
    }
}

impl std::str::FromStr for Repeat {
    type Err = GifError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "infinite" | "forever" | "loop" => Ok(Self::Infinite),
            "none" | "once" => Ok(Self::None),
            n => n.parse::<u16>().map(Self::from_loop_count).map_err(|_| {
                GifError::validation(format!(
                    "repeat must be 'infinite', 'none' or a loop count, got '{s}'"
                ))
            }),
        }
    }
}

/// Everything the core consumes from the settings surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GifSettings {
    /// Output canvas.
    pub canvas: CanvasSettings,
    /// Delay applied to every frame that follows the global delay.
    pub global_delay_ms: u32,
    /// Looping behavior.
    pub repeat: Repeat,
    /// Schedule a debounced generation after every change.
    pub auto_update: bool,
    /// Bucket precision used by the quantizer.
    pub palette_format: PaletteFormat,
}

impl Default for GifSettings {
    fn default() -> Self {
        Self {
            canvas: CanvasSettings::default(),
            global_delay_ms: 500,
            repeat: Repeat::Infinite,
            auto_update: false,
            palette_format: PaletteFormat::default(),
        }
    }
}

impl GifSettings {
    /// Parse settings JSON and clamp every bound.
    pub fn from_json_str(s: &str) -> GifResult<Self> {
        let parsed: Self = serde_json::from_str(s).map_err(|e| GifError::serde(e.to_string()))?;
        Ok(parsed.validated())
    }

    /// Read and parse a settings JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> GifResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("read settings '{}': {e}", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Serialize as pretty JSON.
    pub fn to_json_string(&self) -> GifResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| GifError::serde(e.to_string()))
    }

    /// Clamp canvas size and global delay into their supported ranges.
    pub fn validated(self) -> Self {
        Self {
            canvas: self.canvas.validated(),
            global_delay_ms: clamp_delay_ms(self.global_delay_ms),
            repeat: self.repeat.normalized(),
            ..self
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/settings.rs"]
mod tests;
