//! Sheet presets, print quality presets and inch/pixel conversion

use std::borrow::Cow;
use std::path::Path;

use tracing::{debug, warn};

use crate::geometry::plan;
use crate::types::{Error, LayoutPreset, RenderOptions, Result, SpacingType};

pub mod presets_io;

/// Preset used when a requested key is unknown
pub const DEFAULT_LAYOUT_KEY: &str = "4x6";

/// DPI used when a requested quality label is unknown
pub const DEFAULT_DPI: u32 = 300;

/// DPI at which custom presets are checked before use
pub const VALIDATION_DPI: u32 = 300;

/// Highest supported resolution; geometry clamps anything above it
pub const MAX_DPI: u32 = 4800;

// Float slack so products like 0.05 * 300 do not truncate one pixel short.
const PIXEL_EPSILON: f64 = 1e-9;

/// Built-in sheet arrangements
pub static BUILTIN_PRESETS: [LayoutPreset; 6] = [
    LayoutPreset {
        key: Cow::Borrowed("4x6"),
        width_in: 4.0,
        height_in: 6.0,
        cols: 2,
        rows: 3,
        photo_count: 6,
        spacing: SpacingType::None,
        supports_guides: false,
    },
    LayoutPreset {
        key: Cow::Borrowed("5x7"),
        width_in: 5.0,
        height_in: 7.0,
        cols: 2,
        rows: 3,
        photo_count: 6,
        spacing: SpacingType::None,
        supports_guides: true,
    },
    LayoutPreset {
        key: Cow::Borrowed("8x10"),
        width_in: 8.0,
        height_in: 10.0,
        cols: 4,
        rows: 5,
        photo_count: 20,
        spacing: SpacingType::None,
        supports_guides: false,
    },
    LayoutPreset {
        key: Cow::Borrowed("4x6-pair"),
        width_in: 4.0,
        height_in: 6.0,
        cols: 1,
        rows: 2,
        photo_count: 2,
        spacing: SpacingType::VerticalApart,
        supports_guides: true,
    },
    LayoutPreset {
        key: Cow::Borrowed("5x7-quad"),
        width_in: 5.0,
        height_in: 7.0,
        cols: 2,
        rows: 2,
        photo_count: 4,
        spacing: SpacingType::VerticalCentered,
        supports_guides: true,
    },
    LayoutPreset {
        key: Cow::Borrowed("5x7-grid"),
        width_in: 5.0,
        height_in: 7.0,
        cols: 2,
        rows: 3,
        photo_count: 6,
        spacing: SpacingType::GridAligned,
        supports_guides: true,
    },
];

/// Print quality presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    High,
    Standard,
}

impl Quality {
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "high" | "hq" | "300" => Some(Quality::High),
            "standard" | "normal" | "medium" | "200" => Some(Quality::Standard),
            _ => None,
        }
    }

    pub fn dpi(&self) -> u32 {
        match self {
            Quality::High => 300,
            Quality::Standard => 200,
        }
    }
}

/// Look up a built-in preset, falling back to the 4x6 sheet for unknown keys
pub fn get_layout(key: &str) -> &'static LayoutPreset {
    if let Some(preset) = BUILTIN_PRESETS.iter().find(|p| p.key == key) {
        return preset;
    }
    warn!(key, fallback = DEFAULT_LAYOUT_KEY, "unknown layout key");
    &BUILTIN_PRESETS[0]
}

/// Map a quality label to DPI, falling back to high quality
pub fn get_dpi(quality_key: &str) -> u32 {
    match Quality::from_key(quality_key) {
        Some(quality) => quality.dpi(),
        None => {
            warn!(quality_key, fallback = DEFAULT_DPI, "unknown quality key");
            DEFAULT_DPI
        }
    }
}

/// Convert inches to whole pixels, truncating toward zero.
///
/// Negative and non-finite inputs map to 0.
pub fn to_pixels(inches: f64, dpi: u32) -> u32 {
    let px = inches * dpi as f64;
    if !px.is_finite() || px <= 0.0 {
        return 0;
    }
    let px = (px + PIXEL_EPSILON).floor();
    if px >= u32::MAX as f64 {
        u32::MAX
    } else {
        px as u32
    }
}

impl LayoutPreset {
    /// Check that a preset is usable: positive dimensions and every cell on
    /// the sheet at [`VALIDATION_DPI`], with and without the default gap.
    pub fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(Error::Config("preset key must not be empty".to_string()));
        }
        if !(self.width_in.is_finite() && self.width_in > 0.0)
            || !(self.height_in.is_finite() && self.height_in > 0.0)
        {
            return Err(Error::Config(format!(
                "preset '{}': sheet size must be positive, got {}x{}",
                self.key, self.width_in, self.height_in
            )));
        }
        let max_side_in = u32::MAX as f64 / MAX_DPI as f64;
        if self.width_in > max_side_in || self.height_in > max_side_in {
            return Err(Error::Config(format!(
                "preset '{}': sheet {}x{} in is too large to rasterize at {} dpi",
                self.key, self.width_in, self.height_in, MAX_DPI
            )));
        }
        if self.cols == 0 || self.rows == 0 || self.photo_count == 0 {
            return Err(Error::Config(format!(
                "preset '{}': cols, rows and photo_count must be at least 1",
                self.key
            )));
        }

        for gap_enabled in [false, true] {
            let options = RenderOptions {
                dpi: VALIDATION_DPI,
                gap_enabled,
                ..Default::default()
            };
            let geometry = plan(self, &options);
            if let Some(cell) = geometry.placements.iter().find(|p| {
                p.right() > geometry.canvas_width_px || p.bottom() > geometry.canvas_height_px
            }) {
                return Err(Error::Config(format!(
                    "preset '{}': cell at ({}, {}) size {} leaves the {}x{} sheet",
                    self.key,
                    cell.x,
                    cell.y,
                    cell.size_px,
                    geometry.canvas_width_px,
                    geometry.canvas_height_px
                )));
            }
        }
        Ok(())
    }
}

/// Preset lookup table: built-ins plus optional custom presets
#[derive(Debug, Clone)]
pub struct PresetTable {
    presets: Vec<LayoutPreset>,
}

impl Default for PresetTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PresetTable {
    pub fn builtin() -> Self {
        Self {
            presets: BUILTIN_PRESETS.to_vec(),
        }
    }

    /// Add custom presets; a custom preset replaces a built-in with the same key
    pub fn with_custom(mut self, custom: Vec<LayoutPreset>) -> Result<Self> {
        for preset in custom {
            preset.validate()?;
            match self.presets.iter_mut().find(|p| p.key == preset.key) {
                Some(existing) => *existing = preset,
                None => self.presets.push(preset),
            }
        }
        Ok(self)
    }

    /// Built-ins extended with the presets in a tab-separated file
    pub fn from_file(path: &Path) -> Result<Self> {
        let custom = presets_io::read_presets(path)?;
        Self::builtin().with_custom(custom)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.presets.iter().any(|p| p.key == key)
    }

    /// Look up a preset, falling back to the default sheet for unknown keys
    pub fn get(&self, key: &str) -> &LayoutPreset {
        if let Some(preset) = self.presets.iter().find(|p| p.key == key) {
            return preset;
        }
        debug!(key, fallback = DEFAULT_LAYOUT_KEY, "unknown layout key");
        self.presets
            .iter()
            .find(|p| p.key == DEFAULT_LAYOUT_KEY)
            .unwrap_or(&self.presets[0])
    }

    pub fn presets(&self) -> &[LayoutPreset] {
        &self.presets
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.presets.iter().map(|p| p.key.as_ref())
    }
}
