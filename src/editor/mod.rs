//! Source photo adjustments: rotate, zoom, pan and square crop

use image::imageops;
use image::{Rgb, RgbImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use serde::{Deserialize, Serialize};

/// Fill for corners uncovered by rotation
const ROTATION_FILL: Rgb<u8> = Rgb([255, 255, 255]);

/// Editor state applied to the decoded photo before composition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditorTransform {
    /// Magnification of the square crop, 1.0 = largest square that fits
    pub zoom: f32,
    /// Clockwise rotation in degrees
    pub rotation_deg: f32,
    /// Horizontal pan, -1.0 (left edge) to 1.0 (right edge)
    pub pan_x: f32,
    /// Vertical pan, -1.0 (top edge) to 1.0 (bottom edge)
    pub pan_y: f32,
}

impl Default for EditorTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            rotation_deg: 0.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl EditorTransform {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Side length and top-left of the crop square inside a `width` x `height` image
    pub fn crop_square(&self, width: u32, height: u32) -> (u32, u32, u32) {
        let side = width.min(height);
        let zoom = if self.zoom.is_finite() { self.zoom.max(1.0) } else { 1.0 };
        let crop = ((side as f32 / zoom).round() as u32).clamp(side.min(1), side);

        let offset = |free: u32, pan: f32| {
            let pan = if pan.is_finite() { pan.clamp(-1.0, 1.0) } else { 0.0 };
            let pos = (free as f32 / 2.0 * (1.0 + pan)).round() as u32;
            pos.min(free)
        };
        (crop, offset(width - crop, self.pan_x), offset(height - crop, self.pan_y))
    }

    /// Apply the transform and return the square photo to be tiled
    pub fn apply(&self, photo: &RgbImage) -> RgbImage {
        let rotated;
        let source = if self.rotation_deg != 0.0 && self.rotation_deg.is_finite() {
            rotated = rotate_about_center(
                photo,
                self.rotation_deg.to_radians(),
                Interpolation::Bilinear,
                ROTATION_FILL,
            );
            &rotated
        } else {
            photo
        };

        let (crop, x, y) = self.crop_square(source.width(), source.height());
        imageops::crop_imm(source, x, y, crop, crop).to_image()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEFT: Rgb<u8> = Rgb([255, 0, 0]);
    const RIGHT: Rgb<u8> = Rgb([0, 0, 255]);

    fn split_photo() -> RgbImage {
        RgbImage::from_fn(40, 20, |x, _| if x < 20 { LEFT } else { RIGHT })
    }

    #[test]
    fn test_identity_crops_center_square() {
        let t = EditorTransform::default();
        assert!(t.is_identity());
        assert_eq!(t.crop_square(40, 20), (20, 10, 0));
        let out = t.apply(&split_photo());
        assert_eq!(out.dimensions(), (20, 20));
        assert_eq!(*out.get_pixel(0, 0), LEFT);
        assert_eq!(*out.get_pixel(19, 0), RIGHT);
    }

    #[test]
    fn test_zoom_shrinks_crop() {
        let t = EditorTransform { zoom: 2.0, ..Default::default() };
        assert_eq!(t.crop_square(40, 20), (10, 15, 5));
        // zoom below 1 is treated as 1
        let t = EditorTransform { zoom: 0.25, ..Default::default() };
        assert_eq!(t.crop_square(40, 20).0, 20);
    }

    #[test]
    fn test_pan_reaches_edges() {
        let left = EditorTransform { pan_x: -1.0, ..Default::default() }.apply(&split_photo());
        assert!(left.pixels().all(|p| *p == LEFT));

        let right = EditorTransform { pan_x: 5.0, ..Default::default() }.apply(&split_photo());
        assert!(right.pixels().all(|p| *p == RIGHT));
    }

    #[test]
    fn test_rotation_keeps_dimensions() {
        let t = EditorTransform { rotation_deg: 90.0, ..Default::default() };
        let out = t.apply(&split_photo());
        assert_eq!(out.dimensions(), (20, 20));
    }
}
