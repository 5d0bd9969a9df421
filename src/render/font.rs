//! 5x7 bitmap glyphs for ruler labels

use image::{Rgb, RgbImage};

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;

/// Rows of a glyph, 5 bits each (bit 4 is the leftmost column)
#[rustfmt::skip]
fn glyph_rows(ch: char) -> Option<[u8; 7]> {
    let rows = match ch {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '"' => [0b01010, 0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000],
        _ => return None,
    };
    Some(rows)
}

/// Width in pixels of `text` at the given scale, including 1-unit letter spacing
pub fn text_width(text: &str, scale: u32) -> u32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0;
    }
    n * GLYPH_WIDTH * scale + (n - 1) * scale
}

/// Draw `text` with its top-left corner at (x, y). Unknown characters are
/// skipped but still advance; pixels outside the image are clipped.
pub fn draw_text(img: &mut RgbImage, x: i32, y: i32, text: &str, color: Rgb<u8>, scale: u32) {
    let advance = ((GLYPH_WIDTH + 1) * scale) as i32;
    let mut pen_x = x;
    for ch in text.chars() {
        if let Some(rows) = glyph_rows(ch) {
            draw_glyph(img, pen_x, y, &rows, color, scale);
        }
        pen_x += advance;
    }
}

fn draw_glyph(img: &mut RgbImage, x: i32, y: i32, rows: &[u8; 7], color: Rgb<u8>, scale: u32) {
    let (w, h) = img.dimensions();
    for (row_idx, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                continue;
            }
            let px = x + (col * scale) as i32;
            let py = y + (row_idx as u32 * scale) as i32;
            for dy in 0..scale as i32 {
                for dx in 0..scale as i32 {
                    let (sx, sy) = (px + dx, py + dy);
                    if sx >= 0 && sy >= 0 && (sx as u32) < w && (sy as u32) < h {
                        img.put_pixel(sx as u32, sy as u32, color);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("1", 1), 5);
        assert_eq!(text_width("10", 2), 22);
    }

    #[test]
    fn test_draw_digit_marks_pixels() {
        let white = Rgb([255, 255, 255]);
        let black = Rgb([0, 0, 0]);
        let mut img = RgbImage::from_pixel(20, 20, white);
        draw_text(&mut img, 2, 2, "1", black, 2);
        // top row of '1' has its single bit at column 2
        assert_eq!(*img.get_pixel(2 + 4, 2), black);
        assert_eq!(*img.get_pixel(2, 2), white);
    }

    #[test]
    fn test_draw_clips_at_edges() {
        let mut img = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
        draw_text(&mut img, -3, -3, "8", Rgb([0, 0, 0]), 3);
        draw_text(&mut img, 2, 2, "88", Rgb([0, 0, 0]), 3);
    }
}
