//! Editor guide overlay: face ovals and measurement grid
//!
//! Two canvas formats are supported, each with its own head-height table:
//! - `Square` (2x2 inch print, 1:1): head 50% to 68.75% of the canvas height,
//!   positioned from a fixed eye line a little below the middle.
//! - `Digital` (630x810 upload format): head 70% to 80% of the canvas height,
//!   with the crown of the ideal oval at 10% from the top.
//!
//! The three ovals (min/ideal/max) share one center; only their radii differ,
//! so only the ideal oval touches the computed chin line.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_ellipse_mut, draw_line_segment_mut};
use serde::Serialize;

/// Face oval width as a fraction of its height
pub const OVAL_ASPECT: f64 = 0.72;
/// Eye line to chin distance as a fraction of head height
pub const EYE_TO_CHIN: f64 = 0.48;
/// Eye line of the square format, fraction of canvas height from the top
pub const SQUARE_EYE_LINE: f64 = 0.52;
/// Crown of the digital format, fraction of canvas height from the top
pub const DIGITAL_CROWN: f64 = 0.10;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
const GRID_MINOR: Rgba<u8> = Rgba([0, 0, 0, 40]);
const GRID_MAJOR: Rgba<u8> = Rgba([0, 0, 0, 96]);
const LIMIT_COLOR: Rgba<u8> = Rgba([220, 53, 69, 200]);
const IDEAL_COLOR: Rgba<u8> = Rgba([40, 167, 69, 255]);
const MARKER_COLOR: Rgba<u8> = Rgba([0, 123, 255, 200]);

/// Editor canvas format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GuideFormat {
    /// 2x2 inch square
    Square,
    /// 630x810 digital submission
    Digital,
}

/// Head height as a fraction of canvas height
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeadRatios {
    pub min: f64,
    pub ideal: f64,
    pub max: f64,
}

impl GuideFormat {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "square" | "2x2" => Some(GuideFormat::Square),
            "digital" | "630x810" => Some(GuideFormat::Digital),
            _ => None,
        }
    }

    /// Native editor canvas size (width, height)
    pub fn canvas_size(&self) -> (u32, u32) {
        match self {
            GuideFormat::Square => (600, 600),
            GuideFormat::Digital => (630, 810),
        }
    }

    pub fn head_ratios(&self) -> HeadRatios {
        match self {
            GuideFormat::Square => HeadRatios { min: 0.50, ideal: 0.60, max: 0.6875 },
            GuideFormat::Digital => HeadRatios { min: 0.70, ideal: 0.75, max: 0.80 },
        }
    }

    /// (major divisions across the width, minor lines per major)
    pub fn grid_divisions(&self) -> (u32, u32) {
        match self {
            GuideFormat::Square => (4, 4),
            GuideFormat::Digital => (6, 5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ellipse {
    pub center_x: f64,
    pub center_y: f64,
    pub radius_x: f64,
    pub radius_y: f64,
}

impl Ellipse {
    pub fn top(&self) -> f64 {
        self.center_y - self.radius_y
    }

    pub fn bottom(&self) -> f64 {
        self.center_y + self.radius_y
    }
}

/// Face guide geometry for one canvas size
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GuideGeometry {
    pub min: Ellipse,
    pub ideal: Ellipse,
    pub max: Ellipse,
    /// Top of the ideal oval
    pub crown_y: f64,
    /// Bottom of the ideal oval
    pub chin_y: f64,
    pub eye_line_y: f64,
}

/// Compute the three face ovals and their reference lines
pub fn face_guides(format: GuideFormat, width: u32, height: u32) -> GuideGeometry {
    let (w, h) = (width as f64, height as f64);
    let ratios = format.head_ratios();
    let ideal_head = h * ratios.ideal;
    let ideal_ry = ideal_head / 2.0;

    let (center_y, eye_line_y) = match format {
        GuideFormat::Square => {
            let eye = h * SQUARE_EYE_LINE;
            let chin = eye + ideal_head * EYE_TO_CHIN;
            (chin - ideal_ry, eye)
        }
        GuideFormat::Digital => {
            let crown = h * DIGITAL_CROWN;
            let chin = crown + ideal_head;
            (crown + ideal_ry, chin - ideal_head * EYE_TO_CHIN)
        }
    };

    let oval = |ratio: f64| {
        let radius_y = h * ratio / 2.0;
        Ellipse {
            center_x: w / 2.0,
            center_y,
            radius_x: radius_y * OVAL_ASPECT,
            radius_y,
        }
    };
    let ideal = oval(ratios.ideal);

    GuideGeometry {
        min: oval(ratios.min),
        ideal,
        max: oval(ratios.max),
        crown_y: ideal.top(),
        chin_y: ideal.bottom(),
        eye_line_y,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridLine {
    pub orientation: Orientation,
    /// Pixel offset from the left (vertical) or top (horizontal) edge
    pub position: f64,
    pub major: bool,
}

/// Interior grid lines with square cells. The step is derived from the width;
/// every `minor_per_major`-th line is major.
pub fn measurement_grid(width: u32, height: u32, major_divisions: u32, minor_per_major: u32) -> Vec<GridLine> {
    let mut lines = Vec::new();
    if major_divisions == 0 || minor_per_major == 0 || width == 0 {
        return lines;
    }
    let minor_step = width as f64 / (major_divisions * minor_per_major) as f64;

    for (orientation, extent) in [
        (Orientation::Vertical, width as f64),
        (Orientation::Horizontal, height as f64),
    ] {
        let mut k = 1u32;
        loop {
            let position = minor_step * k as f64;
            if position >= extent - 1e-9 {
                break;
            }
            lines.push(GridLine {
                orientation,
                position,
                major: k % minor_per_major == 0,
            });
            k += 1;
        }
    }
    lines
}

/// Overlay canvas with two visibility flags. Every flag change clears and
/// repaints the whole canvas.
#[derive(Debug, Clone)]
pub struct GuideOverlay {
    format: GuideFormat,
    face_guide_visible: bool,
    grid_visible: bool,
    canvas: RgbaImage,
}

impl GuideOverlay {
    /// Overlay at the format's native canvas size, both guides hidden
    pub fn new(format: GuideFormat) -> Self {
        let (w, h) = format.canvas_size();
        Self::with_size(format, w, h)
    }

    pub fn with_size(format: GuideFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            face_guide_visible: false,
            grid_visible: false,
            canvas: RgbaImage::from_pixel(width, height, TRANSPARENT),
        }
    }

    pub fn format(&self) -> GuideFormat {
        self.format
    }

    pub fn face_guide_visible(&self) -> bool {
        self.face_guide_visible
    }

    pub fn grid_visible(&self) -> bool {
        self.grid_visible
    }

    pub fn set_face_guide_visible(&mut self, visible: bool) {
        self.face_guide_visible = visible;
        self.render();
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.grid_visible = visible;
        self.render();
    }

    /// Flip the face guide flag and repaint; returns the new state
    pub fn toggle_face_guide(&mut self) -> bool {
        self.set_face_guide_visible(!self.face_guide_visible);
        self.face_guide_visible
    }

    /// Flip the grid flag and repaint; returns the new state
    pub fn toggle_grid(&mut self) -> bool {
        self.set_grid_visible(!self.grid_visible);
        self.grid_visible
    }

    pub fn geometry(&self) -> GuideGeometry {
        face_guides(self.format, self.canvas.width(), self.canvas.height())
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Clear and repaint the overlay from the current flags
    pub fn render(&mut self) -> &RgbaImage {
        for pixel in self.canvas.pixels_mut() {
            *pixel = TRANSPARENT;
        }
        if self.grid_visible {
            self.paint_grid();
        }
        if self.face_guide_visible {
            self.paint_face_guides();
        }
        &self.canvas
    }

    fn paint_grid(&mut self) {
        let (w, h) = self.canvas.dimensions();
        let (major, minor) = self.format.grid_divisions();
        let (right, bottom) = (w.saturating_sub(1) as f32, h.saturating_sub(1) as f32);
        let lines = measurement_grid(w, h, major, minor);

        // Minor first so major lines win at crossings
        for line in lines.iter().filter(|l| !l.major).chain(lines.iter().filter(|l| l.major)) {
            let color = if line.major { GRID_MAJOR } else { GRID_MINOR };
            let p = line.position as f32;
            match line.orientation {
                Orientation::Vertical => draw_line_segment_mut(&mut self.canvas, (p, 0.0), (p, bottom), color),
                Orientation::Horizontal => draw_line_segment_mut(&mut self.canvas, (0.0, p), (right, p), color),
            }
        }
    }

    fn paint_face_guides(&mut self) {
        let geometry = self.geometry();
        for (oval, color) in [
            (geometry.min, LIMIT_COLOR),
            (geometry.max, LIMIT_COLOR),
            (geometry.ideal, IDEAL_COLOR),
        ] {
            let center = (oval.center_x.round() as i32, oval.center_y.round() as i32);
            let (rx, ry) = (oval.radius_x.round() as i32, oval.radius_y.round() as i32);
            for inset in 0..2 {
                draw_hollow_ellipse_mut(&mut self.canvas, center, rx - inset, ry - inset, color);
            }
        }

        let half_span = (geometry.max.radius_x * 1.15) as f32;
        let cx = geometry.ideal.center_x as f32;
        for y in [geometry.crown_y, geometry.eye_line_y, geometry.chin_y] {
            let y = y.round() as f32;
            draw_line_segment_mut(&mut self.canvas, (cx - half_span, y), (cx + half_span, y), MARKER_COLOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_square_ideal_oval() {
        let g = face_guides(GuideFormat::Square, 600, 600);
        assert!(close(g.ideal.radius_y, 180.0));
        assert!(close(g.ideal.radius_x, 129.6));
        assert!(close(g.ideal.center_x, 300.0));
        // chin sits EYE_TO_CHIN of the head below the eye line
        assert!(close(g.chin_y, 312.0 + 360.0 * EYE_TO_CHIN));
    }

    #[test]
    fn test_digital_ideal_oval() {
        let g = face_guides(GuideFormat::Digital, 630, 810);
        assert!(close(g.ideal.radius_y, 303.75));
        assert!(close(g.crown_y, 81.0));
        assert!(close(g.ideal.center_y, 81.0 + 303.75));
        assert!(g.eye_line_y > g.crown_y && g.eye_line_y < g.chin_y);
    }

    #[test]
    fn test_ovals_share_center_not_chin() {
        for format in [GuideFormat::Square, GuideFormat::Digital] {
            let (w, h) = format.canvas_size();
            let g = face_guides(format, w, h);
            assert_eq!(g.min.center_y, g.ideal.center_y);
            assert_eq!(g.max.center_y, g.ideal.center_y);
            assert!(g.min.bottom() < g.chin_y);
            assert!(g.max.bottom() > g.chin_y);
            assert!(g.min.radius_y < g.ideal.radius_y && g.ideal.radius_y < g.max.radius_y);
        }
    }

    #[test]
    fn test_square_head_range() {
        let g = face_guides(GuideFormat::Square, 600, 600);
        assert!(close(g.min.radius_y * 2.0, 300.0));
        assert!(close(g.max.radius_y * 2.0, 412.5));
    }

    #[test]
    fn test_measurement_grid_lines() {
        let lines = measurement_grid(600, 600, 4, 4);
        let vertical: Vec<&GridLine> = lines
            .iter()
            .filter(|l| l.orientation == Orientation::Vertical)
            .collect();
        // 16 minor steps, borders excluded
        assert_eq!(vertical.len(), 15);
        assert!(close(vertical[0].position, 37.5));
        assert!(!vertical[0].major);
        assert!(vertical[3].major);
        assert!(close(vertical[3].position, 150.0));
        assert_eq!(lines.iter().filter(|l| l.major).count(), 6);
    }

    #[test]
    fn test_measurement_grid_degenerate() {
        assert!(measurement_grid(600, 600, 0, 4).is_empty());
        assert!(measurement_grid(0, 600, 4, 4).is_empty());
    }

    #[test]
    fn test_overlay_toggles_and_clears() {
        let mut overlay = GuideOverlay::new(GuideFormat::Square);
        assert!(overlay.canvas().pixels().all(|p| p[3] == 0));

        assert!(overlay.toggle_grid());
        assert_eq!(*overlay.canvas().get_pixel(150, 10), GRID_MAJOR);

        assert!(overlay.toggle_face_guide());
        let g = overlay.geometry();
        let row = g.ideal.center_y.round() as u32;
        let right = (g.ideal.center_x + g.ideal.radius_x).round() as u32;
        let hit = (right - 3..=right + 3).any(|x| *overlay.canvas().get_pixel(x, row) == IDEAL_COLOR);
        assert!(hit, "ideal oval not drawn near x={}", right);

        assert!(!overlay.toggle_grid());
        assert_eq!(overlay.canvas().get_pixel(150, 10)[3], 0);

        assert!(!overlay.toggle_face_guide());
        assert!(overlay.canvas().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_overlay_render_is_idempotent() {
        let mut overlay = GuideOverlay::new(GuideFormat::Digital);
        overlay.set_grid_visible(true);
        overlay.set_face_guide_visible(true);
        let first = overlay.canvas().clone();
        let second = overlay.render().clone();
        assert_eq!(first, second);
    }
}
