//! passport-sheet: compose passport photos onto printable sheets
//!
//! Takes one square portrait and tiles copies of it onto a standard print
//! sheet (4x6, 5x7, 8x10 inches) at a chosen resolution, with optional
//! cutting guides, borders and a ruled measurement backdrop. Geometry is
//! computed by pure functions in [`geometry`]; pixels are only touched in
//! [`render`]. The [`guides`] module produces the editor's face-oval and grid
//! overlay, which is never part of the exported sheet.

pub mod editor;
pub mod geometry;
pub mod guides;
pub mod image_io;
pub mod layout;
pub mod parallel;
pub mod render;
pub mod types;

use std::path::{Path, PathBuf};
use std::time::Instant;

use image::RgbImage;
use layout::PresetTable;
use types::{Result, SheetConfig, SheetGeometry};

/// Load a photo, apply the editor transform and flatten it to opaque RGB
pub fn prepare_photo(input_path: &Path, config: &SheetConfig) -> Result<RgbImage> {
    let decoded = image_io::load_image(input_path)?;
    let flat = image_io::flatten_onto_white(&decoded);
    if config.edit.is_identity() {
        Ok(flat)
    } else {
        Ok(config.edit.apply(&flat))
    }
}

/// Main entry point: compose one sheet from a photo file
///
/// # Arguments
/// * `input_path` - Path to the source photo
/// * `output_path` - Path for the composed sheet
/// * `table` - Preset table to resolve `config.layout_key` against
/// * `config` - Composition configuration
///
/// # Returns
/// The sheet geometry that was rendered
pub fn compose_sheet(
    input_path: &Path,
    output_path: &Path,
    table: &PresetTable,
    config: &SheetConfig,
) -> Result<SheetGeometry> {
    let start_time = Instant::now();
    let (layout, options) = config.resolve(table)?;

    if config.show_progress {
        println!("Loading photo...");
    }
    let photo = prepare_photo(input_path, config)?;
    if config.benchmark {
        println!("  Load time: {:.2}s", start_time.elapsed().as_secs_f32());
    }

    let geometry = geometry::compute_placements(layout, &options);
    if config.show_progress {
        println!(
            "  Sheet: {} ({}x{} px at {} dpi), {} photos of {} px",
            layout.key,
            geometry.canvas_width_px,
            geometry.canvas_height_px,
            options.dpi,
            geometry.placements.len(),
            geometry.cell_size_px
        );
        println!("Rendering sheet...");
    }

    let render_start = Instant::now();
    let sheet = render::render_sheet(&photo, &geometry, &options)?;
    if config.benchmark {
        println!("  Render time: {:.2}s", render_start.elapsed().as_secs_f32());
    }

    if config.show_progress {
        println!("Saving output...");
    }
    let save_start = Instant::now();
    image_io::save_sheet(output_path, &sheet, config.format, config.jpeg_quality)?;
    if config.benchmark {
        println!("  Save time: {:.2}s", save_start.elapsed().as_secs_f32());
    }

    if config.show_progress {
        println!("\n✓ Completed in {:.2}s", start_time.elapsed().as_secs_f32());
    }

    Ok(geometry)
}

/// Compose one sheet per preset in the table, rendered in parallel.
///
/// Output files are named after the input and layout key inside `output_dir`
/// (or next to the input when `None`). Returns `(layout key, path)` pairs in
/// table order.
pub fn compose_all_sheets(
    input_path: &Path,
    output_dir: Option<&Path>,
    table: &PresetTable,
    config: &SheetConfig,
) -> Result<Vec<(String, PathBuf)>> {
    let options = config.render_options()?;
    let photo = prepare_photo(input_path, config)?;

    if config.show_progress {
        println!("Rendering {} sheets...", table.presets().len());
    }
    let jobs = parallel::jobs_for_presets(table.presets(), &options);

    let mut written = Vec::with_capacity(jobs.len());
    for result in parallel::render_sheets_parallel(&photo, &jobs) {
        let rendered = result?;
        let mut path = image_io::generate_output_path(input_path, &rendered.layout_key, config.format)?;
        if let (Some(dir), Some(name)) = (output_dir, path.file_name()) {
            path = dir.join(name);
        }
        image_io::save_sheet(&path, &rendered.image, config.format, config.jpeg_quality)?;
        if config.show_progress {
            println!("  {} -> {}", rendered.layout_key, path.display());
        }
        written.push((rendered.layout_key, path));
    }

    Ok(written)
}
