//! Core types and structures for passport-sheet

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;
use tracing::warn;

use crate::editor::EditorTransform;
use crate::layout::{get_dpi, PresetTable, DEFAULT_LAYOUT_KEY, MAX_DPI};

/// Side length of one passport photo, in inches
pub const PHOTO_SIZE_IN: f64 = 2.0;

/// Default cutting gap between photos, in inches
pub const DEFAULT_GAP_IN: f64 = 0.05;

/// Default JPEG quality for exported sheets
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Geometry strategy used to place cells on a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpacingType {
    /// Uniform grid, centered on the sheet
    None,
    /// Photos stacked in one column with fixed top margin and a wide gap
    VerticalApart,
    /// Block (gaps included) centered horizontally and vertically
    VerticalCentered,
    /// Block anchored top-left with fixed margins and distinct row/column gaps
    GridAligned,
}

impl SpacingType {
    /// Parse the kebab-case name used in preset files
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "none" | "uniform" => Some(SpacingType::None),
            "vertical-apart" => Some(SpacingType::VerticalApart),
            "vertical-centered" => Some(SpacingType::VerticalCentered),
            "grid-aligned" => Some(SpacingType::GridAligned),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SpacingType::None => "none",
            SpacingType::VerticalApart => "vertical-apart",
            SpacingType::VerticalCentered => "vertical-centered",
            SpacingType::GridAligned => "grid-aligned",
        }
    }

    /// Whether the sheet gets a ruled measurement backdrop beneath the photos
    pub fn draws_backdrop(&self) -> bool {
        matches!(self, SpacingType::VerticalApart | SpacingType::GridAligned)
    }
}

/// A print sheet arrangement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPreset {
    /// Lookup key, e.g. `"4x6"`
    pub key: Cow<'static, str>,
    /// Physical sheet width (inches)
    pub width_in: f64,
    /// Physical sheet height (inches)
    pub height_in: f64,
    pub cols: u32,
    pub rows: u32,
    /// Number of cells actually emitted; authoritative over `cols * rows`
    pub photo_count: u32,
    pub spacing: SpacingType,
    /// Whether cutting guides and borders may be drawn on this sheet.
    /// Edge-to-edge sheets have no room for them.
    pub supports_guides: bool,
}

/// Per-render options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Pixels per inch
    pub dpi: u32,
    /// Space photos apart and draw cutting guides
    pub gap_enabled: bool,
    /// Requested gap between photos (inches)
    pub gap_size_in: f64,
    /// Draw an inset border inside each photo
    pub border_enabled: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dpi: 300,
            gap_enabled: false,
            gap_size_in: DEFAULT_GAP_IN,
            border_enabled: false,
        }
    }
}

impl RenderOptions {
    /// Requested gap in inches; zero unless gaps are enabled
    pub fn requested_gap_in(&self) -> f64 {
        if self.gap_enabled {
            self.gap_size_in.max(0.0)
        } else {
            0.0
        }
    }

    /// Border stroke width in pixels, scaled with resolution
    pub fn border_width_px(&self) -> f32 {
        (self.dpi as f32 / 150.0).max(0.5)
    }
}

/// Sheet composition configuration, as supplied by the options form or CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Preset key, e.g. `"5x7"`; unknown keys fall back to the default sheet
    pub layout_key: String,
    /// Quality label (`high`, `standard`); unknown labels mean high
    pub quality_key: String,
    /// Explicit DPI, overrides the quality label
    pub dpi_override: Option<u32>,
    pub gap_enabled: bool,
    pub gap_size_in: f64,
    pub border_enabled: bool,
    pub format: ImageFormat,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Adjustments applied to the photo before tiling
    pub edit: EditorTransform,
    /// Show progress output
    pub show_progress: bool,
    /// Enable detailed timing information
    pub benchmark: bool,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            layout_key: DEFAULT_LAYOUT_KEY.to_string(),
            quality_key: "high".to_string(),
            dpi_override: None,
            gap_enabled: false,
            gap_size_in: DEFAULT_GAP_IN,
            border_enabled: false,
            format: ImageFormat::Jpeg,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            edit: EditorTransform::default(),
            show_progress: true,
            benchmark: false,
        }
    }
}

impl SheetConfig {
    /// Per-render options. Fails for a DPI override of 0 or above
    /// [`MAX_DPI`], or a bad gap.
    pub fn render_options(&self) -> Result<RenderOptions> {
        let dpi = match self.dpi_override {
            Some(0) => return Err(Error::Config("DPI must be a positive integer".to_string())),
            Some(dpi) if dpi > MAX_DPI => {
                return Err(Error::Config(format!("DPI must be at most {}, got {}", MAX_DPI, dpi)))
            }
            Some(dpi) => dpi,
            None => get_dpi(&self.quality_key),
        };
        if !self.gap_size_in.is_finite() || self.gap_size_in < 0.0 {
            return Err(Error::Config(format!(
                "gap size must be a non-negative number of inches, got {}",
                self.gap_size_in
            )));
        }
        Ok(RenderOptions {
            dpi,
            gap_enabled: self.gap_enabled,
            gap_size_in: self.gap_size_in,
            border_enabled: self.border_enabled,
        })
    }

    /// Resolve the preset and render options against a preset table
    pub fn resolve<'a>(&self, table: &'a PresetTable) -> Result<(&'a LayoutPreset, RenderOptions)> {
        let options = self.render_options()?;
        let layout = table.get(&self.layout_key);
        if !layout.supports_guides && (options.gap_enabled || options.border_enabled) {
            warn!(
                layout = %layout.key,
                "cutting guides and borders are not available on edge-to-edge sheets; ignoring"
            );
        }
        Ok((layout, options))
    }
}

/// One photo slot on the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPlacement {
    /// Left edge (pixels)
    pub x: u32,
    /// Top edge (pixels)
    pub y: u32,
    /// Square side length (pixels)
    pub size_px: u32,
}

impl CellPlacement {
    pub fn right(&self) -> u32 {
        self.x + self.size_px
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.size_px
    }
}

/// Computed pixel geometry of a full sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetGeometry {
    pub canvas_width_px: u32,
    pub canvas_height_px: u32,
    pub cell_size_px: u32,
    /// Effective horizontal gap between columns (pixels)
    pub col_gap_px: u32,
    /// Effective vertical gap between rows (pixels)
    pub row_gap_px: u32,
    pub dpi: u32,
    pub spacing: SpacingType,
    /// Copied from the preset so the renderer can gate guide strokes
    pub supports_guides: bool,
    pub placements: Vec<CellPlacement>,
}

impl SheetGeometry {
    /// Check that every cell lies fully on the sheet
    pub fn is_within_bounds(&self) -> bool {
        self.placements.iter().all(|p| {
            p.right() <= self.canvas_width_px && p.bottom() <= self.canvas_height_px
        })
    }
}

/// Sheet output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Parse format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }

    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

/// passport-sheet error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Preset file parse error: {0}")]
    PresetParse(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_ignored_when_disabled() {
        let options = RenderOptions {
            gap_enabled: false,
            gap_size_in: 0.5,
            ..Default::default()
        };
        assert_eq!(options.requested_gap_in(), 0.0);

        let options = RenderOptions {
            gap_enabled: true,
            gap_size_in: -1.0,
            ..Default::default()
        };
        assert_eq!(options.requested_gap_in(), 0.0);
    }

    #[test]
    fn test_border_width_scales_with_dpi() {
        let at = |dpi| RenderOptions { dpi, ..Default::default() }.border_width_px();
        assert_eq!(at(300), 2.0);
        assert_eq!(at(150), 1.0);
        assert_eq!(at(30), 0.5);
    }

    #[test]
    fn test_spacing_names_round_trip() {
        for spacing in [
            SpacingType::None,
            SpacingType::VerticalApart,
            SpacingType::VerticalCentered,
            SpacingType::GridAligned,
        ] {
            assert_eq!(SpacingType::from_name(spacing.name()), Some(spacing));
        }
        assert_eq!(SpacingType::from_name("diagonal"), None);
    }

    #[test]
    fn test_sheet_config_resolves_with_fallbacks() {
        let table = PresetTable::builtin();
        let config = SheetConfig {
            layout_key: "bogus".to_string(),
            quality_key: "standard".to_string(),
            ..Default::default()
        };
        let (layout, options) = config.resolve(&table).unwrap();
        assert_eq!(layout.key, DEFAULT_LAYOUT_KEY);
        assert_eq!(options.dpi, 200);

        let config = SheetConfig {
            dpi_override: Some(600),
            ..Default::default()
        };
        assert_eq!(config.render_options().unwrap().dpi, 600);
    }

    #[test]
    fn test_sheet_config_rejects_bad_values() {
        let zero_dpi = SheetConfig {
            dpi_override: Some(0),
            ..Default::default()
        };
        assert!(matches!(zero_dpi.render_options(), Err(Error::Config(_))));

        let huge_dpi = SheetConfig {
            dpi_override: Some(500_000_000),
            ..Default::default()
        };
        assert!(matches!(huge_dpi.render_options(), Err(Error::Config(_))));
        let max_dpi = SheetConfig {
            dpi_override: Some(MAX_DPI),
            ..Default::default()
        };
        assert_eq!(max_dpi.render_options().unwrap().dpi, MAX_DPI);

        let negative_gap = SheetConfig {
            gap_size_in: -0.1,
            ..Default::default()
        };
        assert!(matches!(negative_gap.render_options(), Err(Error::Config(_))));
    }

    #[test]
    fn test_image_format_from_extension() {
        assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("tif"), None);
    }
}
