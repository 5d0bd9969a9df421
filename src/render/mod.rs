//! Composite rendering of a print sheet
//!
//! The sheet is always opaque RGB on a white background: an alpha channel
//! would print black or cause artifacts at some print services.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use tracing::debug;

use crate::types::{CellPlacement, Error, RenderOptions, Result, SheetGeometry};

pub mod backdrop;
pub mod font;

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub const CUT_GUIDE_COLOR: Rgb<u8> = Rgb([204, 204, 204]);
pub const BORDER_COLOR: Rgb<u8> = Rgb([51, 51, 51]);

/// Which decorations a render will draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decorations {
    pub backdrop: bool,
    pub cutting_guides: bool,
    pub borders: bool,
}

impl Decorations {
    pub fn resolve(geometry: &SheetGeometry, options: &RenderOptions) -> Self {
        Self {
            backdrop: geometry.spacing.draws_backdrop(),
            cutting_guides: geometry.supports_guides && options.gap_enabled,
            borders: geometry.supports_guides && options.border_enabled,
        }
    }
}

/// Render a sheet onto `surface`, replacing its size and contents.
///
/// `photo` is the already-edited source; it is center-cropped to a square and
/// resampled once to the cell size, then copied into every cell.
pub fn render(
    surface: &mut RgbImage,
    photo: &RgbImage,
    geometry: &SheetGeometry,
    options: &RenderOptions,
) -> Result<()> {
    let (pw, ph) = photo.dimensions();
    if pw == 0 || ph == 0 {
        return Err(Error::Render(format!("source image is empty ({}x{})", pw, ph)));
    }

    *surface = RgbImage::from_pixel(geometry.canvas_width_px, geometry.canvas_height_px, BACKGROUND);

    let decorations = Decorations::resolve(geometry, options);
    debug!(?decorations, cells = geometry.placements.len(), "rendering sheet");

    if decorations.backdrop {
        backdrop::draw_measurement_grid(surface, geometry.dpi);
    }

    let cell = fit_to_cell(photo, geometry.cell_size_px);
    let border_width = options.border_width_px();

    for placement in &geometry.placements {
        imageops::replace(surface, &cell, placement.x as i64, placement.y as i64);
        if decorations.cutting_guides {
            draw_cutting_guide(surface, placement);
        }
        if decorations.borders {
            draw_inset_border(surface, placement, border_width, BORDER_COLOR);
        }
    }

    Ok(())
}

/// Render into a freshly allocated surface
pub fn render_sheet(photo: &RgbImage, geometry: &SheetGeometry, options: &RenderOptions) -> Result<RgbImage> {
    let mut surface = RgbImage::new(0, 0);
    render(&mut surface, photo, geometry, options)?;
    Ok(surface)
}

/// Center-crop `photo` to a square and resample it to `size` x `size` (Lanczos3).
pub fn fit_to_cell(photo: &RgbImage, size: u32) -> RgbImage {
    let (w, h) = photo.dimensions();
    let side = w.min(h);
    if size == 0 || side == 0 {
        return RgbImage::new(size, size);
    }
    let square = imageops::crop_imm(photo, (w - side) / 2, (h - side) / 2, side, side).to_image();
    if side == size {
        return square;
    }
    imageops::resize(&square, size, size, FilterType::Lanczos3)
}

/// 1px light-gray outline on the cell bounds
fn draw_cutting_guide(surface: &mut RgbImage, placement: &CellPlacement) {
    if placement.size_px == 0 {
        return;
    }
    let rect = Rect::at(placement.x as i32, placement.y as i32).of_size(placement.size_px, placement.size_px);
    draw_hollow_rect_mut(surface, rect, CUT_GUIDE_COLOR);
}

/// Stroke of `width` pixels lying entirely inside the cell. A fractional last
/// ring is blended by its coverage.
pub fn draw_inset_border(surface: &mut RgbImage, placement: &CellPlacement, width: f32, color: Rgb<u8>) {
    let rings = width.ceil().max(0.0) as u32;
    for k in 0..rings {
        let size = match placement.size_px.checked_sub(2 * k) {
            Some(s) if s > 0 => s,
            _ => break,
        };
        let coverage = (width - k as f32).min(1.0);
        blend_square_ring(surface, placement.x + k, placement.y + k, size, color, coverage);
    }
}

fn blend_square_ring(surface: &mut RgbImage, x: u32, y: u32, size: u32, color: Rgb<u8>, coverage: f32) {
    let (w, h) = surface.dimensions();
    let mut blend = |px: u32, py: u32| {
        if px < w && py < h {
            let under = *surface.get_pixel(px, py);
            surface.put_pixel(px, py, mix(under, color, coverage));
        }
    };

    let last = size - 1;
    for i in 0..size {
        blend(x + i, y);
        if last > 0 {
            blend(x + i, y + last);
        }
    }
    for j in 1..last {
        blend(x, y + j);
        blend(x + last, y + j);
    }
}

fn mix(under: Rgb<u8>, over: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let a = alpha.clamp(0.0, 1.0);
    let channel = |u: u8, o: u8| (u as f32 * (1.0 - a) + o as f32 * a).round() as u8;
    Rgb([
        channel(under[0], over[0]),
        channel(under[1], over[1]),
        channel(under[2], over[2]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::compute_placements;
    use crate::layout::get_layout;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);

    fn red_photo(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, RED)
    }

    fn options(dpi: u32, gap_enabled: bool, border_enabled: bool) -> RenderOptions {
        RenderOptions {
            dpi,
            gap_enabled,
            border_enabled,
            ..Default::default()
        }
    }

    #[test]
    fn test_edge_to_edge_fills_sheet() {
        let opts = options(50, false, false);
        let geometry = compute_placements(get_layout("4x6"), &opts);
        let sheet = render_sheet(&red_photo(40, 30), &geometry, &opts).unwrap();
        assert_eq!(sheet.dimensions(), (200, 300));
        assert!(sheet.pixels().all(|p| *p == RED));
    }

    #[test]
    fn test_cutting_guides_and_gap() {
        let opts = options(50, true, false);
        let geometry = compute_placements(get_layout("5x7"), &opts);
        let first = geometry.placements[0];
        assert_eq!((first.x, first.y), (24, 23));

        let sheet = render_sheet(&red_photo(64, 64), &geometry, &opts).unwrap();
        assert_eq!(*sheet.get_pixel(24, 23), CUT_GUIDE_COLOR);
        assert_eq!(*sheet.get_pixel(123, 60), CUT_GUIDE_COLOR);
        assert_eq!(*sheet.get_pixel(60, 60), RED);
        // the 2px gap between columns stays white
        assert_eq!(*sheet.get_pixel(124, 60), BACKGROUND);
        assert_eq!(*sheet.get_pixel(125, 60), BACKGROUND);
        // margin
        assert_eq!(*sheet.get_pixel(5, 5), BACKGROUND);
    }

    #[test]
    fn test_border_stays_inside_cell() {
        let opts = options(150, false, true);
        let geometry = compute_placements(get_layout("5x7"), &opts);
        let first = geometry.placements[0];
        assert_eq!((first.x, first.y), (75, 75));

        let sheet = render_sheet(&red_photo(50, 50), &geometry, &opts).unwrap();
        assert_eq!(*sheet.get_pixel(75, 75), BORDER_COLOR);
        assert_eq!(*sheet.get_pixel(76, 76), RED);
        assert_eq!(*sheet.get_pixel(74, 74), BACKGROUND);
    }

    #[test]
    fn test_sheet_without_guides_skips_decorations() {
        let opts = options(50, true, true);
        let geometry = compute_placements(get_layout("4x6"), &opts);
        let decorations = Decorations::resolve(&geometry, &opts);
        assert!(!decorations.cutting_guides);
        assert!(!decorations.borders);
        let sheet = render_sheet(&red_photo(10, 10), &geometry, &opts).unwrap();
        assert!(sheet.pixels().all(|p| *p == RED));
    }

    #[test]
    fn test_half_pixel_border_is_blended() {
        let mut surface = red_photo(10, 10);
        let cell = CellPlacement { x: 0, y: 0, size_px: 10 };
        draw_inset_border(&mut surface, &cell, 0.5, BORDER_COLOR);
        assert_eq!(*surface.get_pixel(0, 0), Rgb([153, 26, 26]));
        assert_eq!(*surface.get_pixel(9, 5), Rgb([153, 26, 26]));
        assert_eq!(*surface.get_pixel(1, 1), RED);
    }

    #[test]
    fn test_backdrop_under_pair_layout() {
        let opts = options(50, false, false);
        let geometry = compute_placements(get_layout("4x6-pair"), &opts);
        let sheet = render_sheet(&red_photo(20, 20), &geometry, &opts).unwrap();
        // quarter-inch line in the gap between the two photos
        assert_eq!(*sheet.get_pixel(12, 160), backdrop::GRID_LINE_COLOR);
        // photos cover the backdrop
        assert_eq!(*sheet.get_pixel(100, 75), RED);
    }

    #[test]
    fn test_fit_to_cell_crops_center() {
        let mut photo = RgbImage::from_pixel(30, 10, Rgb([0, 0, 255]));
        for y in 0..10 {
            for x in 10..20 {
                photo.put_pixel(x, y, RED);
            }
        }
        let cell = fit_to_cell(&photo, 10);
        assert_eq!(cell.dimensions(), (10, 10));
        assert!(cell.pixels().all(|p| *p == RED));
    }

    #[test]
    fn test_empty_photo_is_rejected() {
        let opts = options(50, false, false);
        let geometry = compute_placements(get_layout("4x6"), &opts);
        let result = render_sheet(&RgbImage::new(0, 0), &geometry, &opts);
        assert!(matches!(result, Err(Error::Render(_))));
    }
}
