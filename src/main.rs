//! passport-sheet CLI

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use passport_sheet::{
    compose_all_sheets, compose_sheet,
    editor::EditorTransform,
    geometry::compute_placements,
    guides::{face_guides, GuideFormat, GuideOverlay},
    image_io,
    layout::{presets_io, PresetTable},
    types::{ImageFormat, SheetConfig, DEFAULT_GAP_IN, DEFAULT_JPEG_QUALITY},
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// passport-sheet: tile a passport photo onto a printable sheet
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug details to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Sheet options shared by `compose` and `plan`
#[derive(Args, Debug)]
struct SheetArgs {
    /// Sheet layout key (see `presets`)
    #[arg(short, long, default_value = "4x6")]
    layout: String,

    /// Print quality: high (300 dpi) or standard (200 dpi)
    #[arg(short = 'q', long, default_value = "high")]
    quality: String,

    /// Explicit DPI (1-4800), overrides --quality
    #[arg(long, value_name = "DPI")]
    dpi: Option<u32>,

    /// Space photos apart and draw cutting guides (sheets with margins only)
    #[arg(long)]
    gap: bool,

    /// Gap between photos in inches
    #[arg(long, default_value_t = DEFAULT_GAP_IN, value_name = "INCHES")]
    gap_size: f64,

    /// Draw a thin border inside each photo (sheets with margins only)
    #[arg(long)]
    border: bool,

    /// Extra presets file (tab-separated)
    #[arg(long, value_name = "FILE")]
    presets: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a print sheet from a photo
    Compose {
        /// Input photo (JPEG, PNG, WebP, ...)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output file (default: INPUT_LAYOUT_sheet.jpg)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        sheet: SheetArgs,

        /// Output format: jpeg or png (default: from output extension, else jpeg)
        #[arg(short = 'f', long, value_name = "FORMAT")]
        format: Option<String>,

        /// JPEG quality (1-100)
        #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
        jpeg_quality: u8,

        /// Zoom into the photo before cropping (>= 1.0)
        #[arg(long, default_value_t = 1.0)]
        zoom: f32,

        /// Rotate the photo clockwise (degrees)
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        rotate: f32,

        /// Horizontal pan of the crop, -1.0 (left) to 1.0 (right)
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        pan_x: f32,

        /// Vertical pan of the crop, -1.0 (top) to 1.0 (bottom)
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        pan_y: f32,

        /// Render one sheet for every preset
        #[arg(long)]
        all_layouts: bool,

        /// Directory for --all-layouts output (default: next to INPUT)
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Suppress progress output
        #[arg(long)]
        quiet: bool,

        /// Show detailed timing information
        #[arg(long)]
        benchmark: bool,
    },

    /// Print the computed sheet geometry as JSON
    Plan {
        #[command(flatten)]
        sheet: SheetArgs,
    },

    /// Render the editor guide overlay to a PNG
    Guides {
        /// Output PNG
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Canvas format: square (2x2 inch) or digital (630x810)
        #[arg(long, default_value = "square")]
        format: String,

        /// Hide the face ovals
        #[arg(long)]
        no_face: bool,

        /// Hide the measurement grid
        #[arg(long)]
        no_grid: bool,

        /// Also print the oval geometry as JSON
        #[arg(long)]
        json: bool,
    },

    /// List sheet presets
    Presets {
        /// Extra presets file (tab-separated)
        #[arg(long, value_name = "FILE")]
        presets: Option<PathBuf>,

        /// Print as a tab-separated presets file
        #[arg(long)]
        tsv: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Compose {
            input,
            output,
            sheet,
            format,
            jpeg_quality,
            zoom,
            rotate,
            pan_x,
            pan_y,
            all_layouts,
            output_dir,
            quiet,
            benchmark,
        } => {
            let edit = EditorTransform {
                zoom,
                rotation_deg: rotate,
                pan_x,
                pan_y,
            };
            run_compose(
                input,
                output,
                sheet,
                format,
                jpeg_quality,
                edit,
                all_layouts,
                output_dir,
                quiet,
                benchmark,
            )
        }
        Command::Plan { sheet } => run_plan(sheet),
        Command::Guides {
            output,
            format,
            no_face,
            no_grid,
            json,
        } => run_guides(output, &format, no_face, no_grid, json),
        Command::Presets { presets, tsv } => run_presets(presets.as_deref(), tsv),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_table(presets: Option<&Path>) -> Result<PresetTable> {
    match presets {
        Some(path) => PresetTable::from_file(path)
            .with_context(|| format!("Failed to load presets from {}", path.display())),
        None => Ok(PresetTable::builtin()),
    }
}

fn sheet_config(sheet: &SheetArgs) -> SheetConfig {
    SheetConfig {
        layout_key: sheet.layout.clone(),
        quality_key: sheet.quality.clone(),
        dpi_override: sheet.dpi,
        gap_enabled: sheet.gap,
        gap_size_in: sheet.gap_size,
        border_enabled: sheet.border,
        ..Default::default()
    }
}

#[allow(clippy::too_many_arguments)]
fn run_compose(
    input: PathBuf,
    output: Option<PathBuf>,
    sheet: SheetArgs,
    format: Option<String>,
    jpeg_quality: u8,
    edit: EditorTransform,
    all_layouts: bool,
    output_dir: Option<PathBuf>,
    quiet: bool,
    benchmark: bool,
) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    if !(1..=100).contains(&jpeg_quality) {
        anyhow::bail!("JPEG quality must be between 1 and 100, got {}", jpeg_quality);
    }

    let table = load_table(sheet.presets.as_deref())?;
    if !table.contains(&sheet.layout) {
        eprintln!(
            "Warning: unknown layout '{}', using {} (available: {})",
            sheet.layout,
            table.get(&sheet.layout).key,
            table.keys().collect::<Vec<_>>().join(", ")
        );
    }

    let format = match format.as_deref() {
        Some(name) => ImageFormat::from_extension(name)
            .with_context(|| format!("Unsupported output format: {}", name))?,
        None => output
            .as_ref()
            .and_then(|p| p.extension())
            .and_then(|s| s.to_str())
            .and_then(ImageFormat::from_extension)
            .unwrap_or(ImageFormat::Jpeg),
    };

    let config = SheetConfig {
        format,
        jpeg_quality,
        edit,
        show_progress: !quiet,
        benchmark,
        ..sheet_config(&sheet)
    };

    if !quiet {
        println!("passport-sheet v{}", env!("CARGO_PKG_VERSION"));
        println!("Input:  {}", input.display());
    }

    if all_layouts {
        if let Some(dir) = &output_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        }
        let written = compose_all_sheets(&input, output_dir.as_deref(), &table, &config)
            .context("Failed to compose sheets")?;
        if !quiet {
            println!("\nWrote {} sheets", written.len());
        }
        return Ok(());
    }

    let layout_key = table.get(&config.layout_key).key.to_string();
    let output_path = match output {
        Some(out) => out,
        None => image_io::generate_output_path(&input, &layout_key, format)
            .context("Failed to generate output path")?,
    };
    if !quiet {
        println!("Output: {}\n", output_path.display());
    }

    let geometry = compose_sheet(&input, &output_path, &table, &config)
        .context("Composition failed")?;

    if !quiet {
        println!("\nSuccess! Sheet layout used:");
        println!("  Layout: {} ({})", layout_key, geometry.spacing.name());
        println!("  Canvas: {}x{} px", geometry.canvas_width_px, geometry.canvas_height_px);
        println!("  Photos: {} at {} px", geometry.placements.len(), geometry.cell_size_px);
    }
    Ok(())
}

fn run_plan(sheet: SheetArgs) -> Result<()> {
    let table = load_table(sheet.presets.as_deref())?;
    let (layout, options) = sheet_config(&sheet).resolve(&table)?;
    let geometry = compute_placements(layout, &options);
    println!("{}", serde_json::to_string_pretty(&geometry)?);
    Ok(())
}

fn run_guides(output: PathBuf, format: &str, no_face: bool, no_grid: bool, json: bool) -> Result<()> {
    let format = GuideFormat::from_name(format)
        .with_context(|| format!("Unknown guide format '{}' (expected square or digital)", format))?;

    let mut overlay = GuideOverlay::new(format);
    overlay.set_face_guide_visible(!no_face);
    overlay.set_grid_visible(!no_grid);
    overlay
        .canvas()
        .save(&output)
        .with_context(|| format!("Failed to write overlay to {}", output.display()))?;

    if json {
        let (w, h) = format.canvas_size();
        println!("{}", serde_json::to_string_pretty(&face_guides(format, w, h))?);
    }
    Ok(())
}

fn run_presets(presets: Option<&Path>, tsv: bool) -> Result<()> {
    let table = load_table(presets)?;
    if tsv {
        presets_io::write_presets(std::io::stdout().lock(), table.presets())?;
        return Ok(());
    }

    println!("{:<12} {:>9} {:>9} {:>7} {:<18} {}", "KEY", "SIZE (in)", "GRID", "PHOTOS", "SPACING", "GUIDES");
    for p in table.presets() {
        println!(
            "{:<12} {:>9} {:>9} {:>7} {:<18} {}",
            p.key,
            format!("{}x{}", p.width_in, p.height_in),
            format!("{}x{}", p.cols, p.rows),
            p.photo_count,
            p.spacing.name(),
            if p.supports_guides { "yes" } else { "no" }
        );
    }
    Ok(())
}
