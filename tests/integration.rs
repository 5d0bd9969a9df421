//! End-to-end tests: photo file in, print sheet file out

use image::{GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
use passport_sheet::{
    compose_all_sheets, compose_sheet,
    editor::EditorTransform,
    layout::PresetTable,
    render::{BACKGROUND, CUT_GUIDE_COLOR},
    types::{ImageFormat, SheetConfig},
};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Synthetic portrait: warm background with a darker "face" disc in the middle
fn generate_portrait(width: u32, height: u32) -> RgbImage {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let r = width.min(height) as f32 * 0.3;
    RgbImage::from_fn(width, height, |x, y| {
        let (dx, dy) = (x as f32 - cx, y as f32 - cy);
        if dx * dx + dy * dy < r * r {
            Rgb([190, 140, 110])
        } else {
            Rgb([40, 90, 160])
        }
    })
}

fn fixture_dir() -> PathBuf {
    let dir = PathBuf::from("tests/fixtures");
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn save_fixture(img: &RgbImage, name: &str) -> PathBuf {
    let path = fixture_dir().join(name);
    img.save(&path).unwrap();
    path
}

fn quiet_config() -> SheetConfig {
    SheetConfig {
        show_progress: false,
        benchmark: false,
        ..Default::default()
    }
}

fn digest(path: &Path) -> String {
    let img = image::open(path).unwrap().to_rgb8();
    hex::encode(Sha256::digest(img.as_raw()))
}

#[test]
fn test_compose_4x6_jpeg() {
    let input = save_fixture(&generate_portrait(300, 300), "compose_4x6.png");
    let output = fixture_dir().join("compose_4x6_sheet.jpg");

    let config = SheetConfig {
        quality_key: "standard".to_string(),
        ..quiet_config()
    };
    let geometry = compose_sheet(&input, &output, &PresetTable::builtin(), &config).unwrap();
    assert_eq!((geometry.canvas_width_px, geometry.canvas_height_px), (800, 1200));
    assert_eq!(geometry.placements.len(), 6);

    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8], "output should be a JPEG");
    let sheet = image::load_from_memory(&bytes).unwrap();
    assert_eq!(sheet.dimensions(), (800, 1200));

    std::fs::remove_file(input).ok();
    std::fs::remove_file(output).ok();
}

#[test]
fn test_compose_5x7_png_with_guides() {
    let input = save_fixture(&generate_portrait(240, 320), "compose_5x7.png");
    let output = fixture_dir().join("compose_5x7_sheet.png");

    let config = SheetConfig {
        layout_key: "5x7".to_string(),
        dpi_override: Some(100),
        gap_enabled: true,
        format: ImageFormat::Png,
        ..quiet_config()
    };
    let geometry = compose_sheet(&input, &output, &PresetTable::builtin(), &config).unwrap();
    assert_eq!(geometry.col_gap_px, 5);

    let sheet = image::open(&output).unwrap().to_rgb8();
    assert_eq!(sheet.dimensions(), (500, 700));
    let first = geometry.placements[0];
    // (500 - 405) / 2 and (700 - 610) / 2
    assert_eq!((first.x, first.y), (47, 45));
    assert_eq!(*sheet.get_pixel(first.x, first.y), CUT_GUIDE_COLOR);
    assert_eq!(*sheet.get_pixel(first.x - 1, first.y - 1), BACKGROUND);
    // center of the first cell is the face disc
    let center = sheet.get_pixel(first.x + 100, first.y + 100);
    assert_eq!(*center, Rgb([190, 140, 110]));

    std::fs::remove_file(input).ok();
    std::fs::remove_file(output).ok();
}

#[test]
fn test_transparent_photo_prints_white() {
    let mut rgba = RgbaImage::from_pixel(50, 50, Rgba([0, 0, 0, 0]));
    for y in 20..30 {
        for x in 20..30 {
            rgba.put_pixel(x, y, Rgba([0, 0, 0, 255]));
        }
    }
    let input = fixture_dir().join("transparent.png");
    rgba.save(&input).unwrap();
    let output = fixture_dir().join("transparent_sheet.png");

    let config = SheetConfig {
        dpi_override: Some(25),
        format: ImageFormat::Png,
        ..quiet_config()
    };
    compose_sheet(&input, &output, &PresetTable::builtin(), &config).unwrap();

    let sheet = image::open(&output).unwrap();
    assert!(!sheet.color().has_alpha(), "sheet must not carry an alpha channel");
    let sheet = sheet.to_rgb8();
    assert_eq!(*sheet.get_pixel(2, 2), Rgb([255, 255, 255]));

    std::fs::remove_file(input).ok();
    std::fs::remove_file(output).ok();
}

#[test]
fn test_compose_is_deterministic() {
    let input = save_fixture(&generate_portrait(128, 160), "determinism.png");
    let first = fixture_dir().join("determinism_a.png");
    let second = fixture_dir().join("determinism_b.png");

    let config = SheetConfig {
        layout_key: "5x7-grid".to_string(),
        dpi_override: Some(60),
        gap_enabled: true,
        border_enabled: true,
        format: ImageFormat::Png,
        edit: EditorTransform {
            zoom: 1.3,
            rotation_deg: 5.0,
            pan_x: 0.2,
            pan_y: -0.1,
        },
        ..quiet_config()
    };
    let table = PresetTable::builtin();
    compose_sheet(&input, &first, &table, &config).unwrap();
    compose_sheet(&input, &second, &table, &config).unwrap();
    assert_eq!(digest(&first), digest(&second));

    std::fs::remove_file(input).ok();
    std::fs::remove_file(first).ok();
    std::fs::remove_file(second).ok();
}

#[test]
fn test_compose_all_layouts() {
    let input = save_fixture(&generate_portrait(100, 100), "all_layouts.png");
    let out_dir = fixture_dir().join("all_layouts");
    std::fs::create_dir_all(&out_dir).unwrap();

    let config = SheetConfig {
        dpi_override: Some(30),
        format: ImageFormat::Png,
        ..quiet_config()
    };
    let table = PresetTable::builtin();
    let written = compose_all_sheets(&input, Some(&out_dir), &table, &config).unwrap();
    assert_eq!(written.len(), table.presets().len());

    for ((key, path), preset) in written.iter().zip(table.presets()) {
        assert_eq!(*key, preset.key);
        assert!(path.starts_with(&out_dir));
        let (w, h) = image::image_dimensions(path).unwrap();
        assert_eq!((w, h), ((preset.width_in * 30.0) as u32, (preset.height_in * 30.0) as u32));
    }

    std::fs::remove_dir_all(out_dir).ok();
    std::fs::remove_file(input).ok();
}

#[test]
fn test_custom_presets_file() {
    let presets_path = fixture_dir().join("custom_presets.tsv");
    std::fs::write(
        &presets_path,
        "# wallet prints\n6x6\t6\t6\t3\t3\t9\tnone\ttrue\n",
    )
    .unwrap();

    let table = PresetTable::from_file(&presets_path).unwrap();
    assert!(table.contains("6x6"));
    assert!(table.contains("4x6"));
    assert_eq!(table.get("6x6").photo_count, 9);

    std::fs::write(&presets_path, "tiny\t1\t1\t1\t1\t1\tnone\tfalse\n").unwrap();
    assert!(PresetTable::from_file(&presets_path).is_err());

    std::fs::remove_file(presets_path).ok();
}

#[test]
fn test_missing_input_is_an_error() {
    let result = compose_sheet(
        Path::new("tests/fixtures/does_not_exist.png"),
        Path::new("tests/fixtures/never_written.jpg"),
        &PresetTable::builtin(),
        &quiet_config(),
    );
    assert!(result.is_err());
}
