//! Parallel rendering of several sheets from one photo

use image::RgbImage;
use rayon::prelude::*;
use tracing::debug;

use crate::geometry::compute_placements;
use crate::render::render_sheet;
use crate::types::{LayoutPreset, RenderOptions, Result, SheetGeometry};

/// One sheet to render
#[derive(Debug, Clone)]
pub struct SheetJob {
    pub layout: LayoutPreset,
    pub options: RenderOptions,
}

#[derive(Debug, Clone)]
pub struct RenderedSheet {
    pub layout_key: String,
    pub geometry: SheetGeometry,
    pub image: RgbImage,
}

/// Render a single job
pub fn render_job(photo: &RgbImage, job: &SheetJob) -> Result<RenderedSheet> {
    let geometry = compute_placements(&job.layout, &job.options);
    let image = render_sheet(photo, &geometry, &job.options)?;
    Ok(RenderedSheet {
        layout_key: job.layout.key.to_string(),
        geometry,
        image,
    })
}

/// Render every job on the rayon pool. Each sheet is rendered independently
/// and results come back in job order.
pub fn render_sheets_parallel(photo: &RgbImage, jobs: &[SheetJob]) -> Vec<Result<RenderedSheet>> {
    debug!(jobs = jobs.len(), threads = rayon::current_num_threads(), "rendering sheets in parallel");
    jobs.par_iter().map(|job| render_job(photo, job)).collect()
}

/// One job per preset, all sharing the same options
pub fn jobs_for_presets(presets: &[LayoutPreset], options: &RenderOptions) -> Vec<SheetJob> {
    presets
        .iter()
        .map(|layout| SheetJob {
            layout: layout.clone(),
            options: *options,
        })
        .collect()
}
