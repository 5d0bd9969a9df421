//! Ruled measurement backdrop drawn beneath the photos on margin layouts

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;

use super::font::{draw_text, text_width, GLYPH_HEIGHT};
use crate::layout::to_pixels;

pub const GRID_LINE_COLOR: Rgb<u8> = Rgb([228, 228, 228]);
pub const TICK_COLOR: Rgb<u8> = Rgb([140, 140, 140]);
pub const LABEL_COLOR: Rgb<u8> = Rgb([110, 110, 110]);

/// Spacing of the light grid lines (inches)
pub const GRID_STEP_IN: f64 = 0.25;
/// Length of the whole-inch ruler ticks (inches)
pub const TICK_LENGTH_IN: f64 = 0.125;

/// Interior positions (pixels) of every multiple of `step_in` inside `extent_px`
pub fn ruler_positions(extent_px: u32, dpi: u32, step_in: f64) -> Vec<u32> {
    let mut positions = Vec::new();
    if step_in <= 0.0 || to_pixels(step_in, dpi) == 0 {
        return positions;
    }
    let mut k = 1u32;
    loop {
        let pos = to_pixels(step_in * k as f64, dpi);
        if pos >= extent_px {
            break;
        }
        positions.push(pos);
        k += 1;
    }
    positions
}

/// Draw the quarter-inch grid plus inch ticks and labels along all four edges.
pub fn draw_measurement_grid(surface: &mut RgbImage, dpi: u32) {
    let (w, h) = surface.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let (right, bottom) = ((w - 1) as f32, (h - 1) as f32);

    for x in ruler_positions(w, dpi, GRID_STEP_IN) {
        draw_line_segment_mut(surface, (x as f32, 0.0), (x as f32, bottom), GRID_LINE_COLOR);
    }
    for y in ruler_positions(h, dpi, GRID_STEP_IN) {
        draw_line_segment_mut(surface, (0.0, y as f32), (right, y as f32), GRID_LINE_COLOR);
    }

    let tick = to_pixels(TICK_LENGTH_IN, dpi).max(1) as f32;
    let half_tick = (tick / 2.0).max(1.0);
    let scale = (dpi / 100).max(1);
    let pad = (2 * scale) as i32;
    let glyph_h = (GLYPH_HEIGHT * scale) as i32;

    // Half-inch marks between the labelled inch ticks
    for x in ruler_positions(w, dpi, 0.5) {
        draw_line_segment_mut(surface, (x as f32, 0.0), (x as f32, half_tick), TICK_COLOR);
        draw_line_segment_mut(surface, (x as f32, bottom - half_tick), (x as f32, bottom), TICK_COLOR);
    }
    for y in ruler_positions(h, dpi, 0.5) {
        draw_line_segment_mut(surface, (0.0, y as f32), (half_tick, y as f32), TICK_COLOR);
        draw_line_segment_mut(surface, (right - half_tick, y as f32), (right, y as f32), TICK_COLOR);
    }

    for (inch, x) in ruler_positions(w, dpi, 1.0).into_iter().enumerate() {
        let fx = x as f32;
        draw_line_segment_mut(surface, (fx, 0.0), (fx, tick), TICK_COLOR);
        draw_line_segment_mut(surface, (fx, bottom - tick), (fx, bottom), TICK_COLOR);

        let label = format!("{}\"", inch + 1);
        let lx = x as i32 + pad;
        draw_text(surface, lx, tick as i32 + pad, &label, LABEL_COLOR, scale);
        draw_text(surface, lx, h as i32 - tick as i32 - pad - glyph_h, &label, LABEL_COLOR, scale);
    }

    for (inch, y) in ruler_positions(h, dpi, 1.0).into_iter().enumerate() {
        let fy = y as f32;
        draw_line_segment_mut(surface, (0.0, fy), (tick, fy), TICK_COLOR);
        draw_line_segment_mut(surface, (right - tick, fy), (right, fy), TICK_COLOR);

        let label = format!("{}\"", inch + 1);
        let ly = y as i32 + pad;
        let label_w = text_width(&label, scale) as i32;
        draw_text(surface, tick as i32 + pad, ly, &label, LABEL_COLOR, scale);
        draw_text(surface, w as i32 - tick as i32 - pad - label_w, ly, &label, LABEL_COLOR, scale);
    }
}
