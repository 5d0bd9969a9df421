//! Sheet geometry: canvas size, cell size and cell placement
//!
//! Four placement strategies are supported, selected by the preset's
//! [`SpacingType`]:
//! - `None`: uniform grid centered on the sheet, optional cutting gap
//! - `VerticalApart`: one column, fixed 0.5" top margin and 1" gap
//! - `VerticalCentered`: block with the configured gap centered as one unit
//! - `GridAligned`: anchored at a 0.25" top-left margin, 0.5" column gap
//!   and 0.25" row gap
//!
//! All values are whole pixels; see [`crate::layout::to_pixels`].

use tracing::{debug, warn};

use crate::layout::{to_pixels, MAX_DPI};
use crate::types::{
    CellPlacement, LayoutPreset, RenderOptions, SheetGeometry, SpacingType, PHOTO_SIZE_IN,
};

/// Top margin for stacked pairs (inches)
pub const APART_TOP_MARGIN_IN: f64 = 0.5;
/// Gap between stacked pair photos (inches)
pub const APART_GAP_IN: f64 = 1.0;
/// Left and top margin of grid-aligned sheets (inches)
pub const ALIGNED_MARGIN_IN: f64 = 0.25;
/// Column gap of grid-aligned sheets (inches)
pub const ALIGNED_COL_GAP_IN: f64 = 0.5;
/// Row gap of grid-aligned sheets (inches)
pub const ALIGNED_ROW_GAP_IN: f64 = 0.25;

/// Compute the full pixel geometry of a sheet.
///
/// Never fails. The number of cells is always `layout.photo_count`; a gap that
/// would push cells off the sheet is shrunk until the block fits, and sheets
/// without guide support never get a gap. DPI above [`MAX_DPI`] is clamped.
pub fn compute_placements(layout: &LayoutPreset, options: &RenderOptions) -> SheetGeometry {
    if options.dpi > MAX_DPI {
        warn!(dpi = options.dpi, max = MAX_DPI, "dpi clamped");
    }
    let geometry = plan(layout, options);
    debug_assert!(
        geometry.is_within_bounds(),
        "preset '{}' places cells outside the {}x{} sheet",
        layout.key,
        geometry.canvas_width_px,
        geometry.canvas_height_px
    );
    debug!(
        layout = %layout.key,
        dpi = options.dpi,
        canvas_width = geometry.canvas_width_px,
        canvas_height = geometry.canvas_height_px,
        cell = geometry.cell_size_px,
        col_gap = geometry.col_gap_px,
        row_gap = geometry.row_gap_px,
        cells = geometry.placements.len(),
        "computed sheet geometry"
    );
    geometry
}

/// Geometry without the bounds assertion, used to vet untrusted presets
pub(crate) fn plan(layout: &LayoutPreset, options: &RenderOptions) -> SheetGeometry {
    let dpi = options.dpi.min(MAX_DPI);
    let sheet = Sheet {
        width: to_pixels(layout.width_in, dpi),
        height: to_pixels(layout.height_in, dpi),
        cell: to_pixels(PHOTO_SIZE_IN, dpi),
    };

    let (placements, col_gap_px, row_gap_px) = match layout.spacing {
        SpacingType::None | SpacingType::VerticalCentered => {
            let gap = if layout.supports_guides {
                to_pixels(options.requested_gap_in(), dpi)
            } else {
                0
            };
            centered_block(&sheet, layout, gap)
        }
        SpacingType::VerticalApart => vertical_apart(&sheet, layout, dpi),
        SpacingType::GridAligned => grid_aligned(&sheet, layout, dpi),
    };

    SheetGeometry {
        canvas_width_px: sheet.width,
        canvas_height_px: sheet.height,
        cell_size_px: sheet.cell,
        col_gap_px,
        row_gap_px,
        dpi,
        spacing: layout.spacing,
        supports_guides: layout.supports_guides,
        placements,
    }
}

struct Sheet {
    width: u32,
    height: u32,
    cell: u32,
}

/// Rows needed to hold every photo; at least the preset's row count
fn block_rows(layout: &LayoutPreset) -> u32 {
    let cols = layout.cols.max(1);
    layout.rows.max(layout.photo_count.div_ceil(cols))
}

/// Largest gap not exceeding `requested` that keeps `count` cells inside `extent`
fn fit_gap(requested: u32, extent: u32, cell: u32, count: u32) -> u32 {
    if count <= 1 {
        return requested;
    }
    let slack = extent.saturating_sub(count.saturating_mul(cell));
    requested.min(slack / (count - 1))
}

fn span(count: u32, cell: u32, gap: u32) -> u32 {
    let total = (count as u64 * cell as u64).saturating_add(count.saturating_sub(1) as u64 * gap as u64);
    total.min(u32::MAX as u64) as u32
}

/// `start + index * pitch`, saturating at `u32::MAX`
fn offset(start: u32, index: u32, pitch: u32) -> u32 {
    let pos = start as u64 + index as u64 * pitch as u64;
    pos.min(u32::MAX as u64) as u32
}

/// Uniform grid (and vertically centered block): one gap on both axes, block
/// centered on the sheet. The leading margin takes the floor of half the slack.
fn centered_block(sheet: &Sheet, layout: &LayoutPreset, requested_gap: u32) -> (Vec<CellPlacement>, u32, u32) {
    let cols = layout.cols.max(1);
    let rows = block_rows(layout);

    let gap = fit_gap(requested_gap, sheet.width, sheet.cell, cols)
        .min(fit_gap(requested_gap, sheet.height, sheet.cell, rows));

    let start_x = sheet.width.saturating_sub(span(cols, sheet.cell, gap)) / 2;
    let start_y = sheet.height.saturating_sub(span(rows, sheet.cell, gap)) / 2;
    let pitch = sheet.cell.saturating_add(gap);

    let placements = (0..layout.photo_count)
        .map(|i| CellPlacement {
            x: offset(start_x, i % cols, pitch),
            y: offset(start_y, i / cols, pitch),
            size_px: sheet.cell,
        })
        .collect();

    (placements, gap, gap)
}

/// Single column, each photo centered horizontally on its own
fn vertical_apart(sheet: &Sheet, layout: &LayoutPreset, dpi: u32) -> (Vec<CellPlacement>, u32, u32) {
    let top = to_pixels(APART_TOP_MARGIN_IN, dpi);
    let gap = to_pixels(APART_GAP_IN, dpi);
    let x = sheet.width.saturating_sub(sheet.cell) / 2;

    let placements = (0..layout.photo_count)
        .map(|i| CellPlacement {
            x,
            y: offset(top, i, sheet.cell.saturating_add(gap)),
            size_px: sheet.cell,
        })
        .collect();

    (placements, 0, gap)
}

/// Top-left anchored grid with distinct column and row gaps
fn grid_aligned(sheet: &Sheet, layout: &LayoutPreset, dpi: u32) -> (Vec<CellPlacement>, u32, u32) {
    let cols = layout.cols.max(1);
    let margin = to_pixels(ALIGNED_MARGIN_IN, dpi);
    let col_gap = to_pixels(ALIGNED_COL_GAP_IN, dpi);
    let row_gap = to_pixels(ALIGNED_ROW_GAP_IN, dpi);

    let placements = (0..layout.photo_count)
        .map(|i| CellPlacement {
            x: offset(margin, i % cols, sheet.cell.saturating_add(col_gap)),
            y: offset(margin, i / cols, sheet.cell.saturating_add(row_gap)),
            size_px: sheet.cell,
        })
        .collect();

    (placements, col_gap, row_gap)
}
