//! TSV I/O for custom sheet preset tables.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::types::{Error, LayoutPreset, Result, SpacingType};

/// Read a tab-separated preset file.
///
/// Expected columns:
/// `key  width_in  height_in  cols  rows  photo_count  spacing  supports_guides`.
/// Blank lines and lines starting with `#` are skipped. Extra columns are ignored.
pub fn read_presets(path: &Path) -> Result<Vec<LayoutPreset>> {
    let file = File::open(path)?;
    parse_presets(BufReader::new(file))
}

/// Parse presets from any buffered reader (see [`read_presets`] for the format)
pub fn parse_presets<R: BufRead>(reader: R) -> Result<Vec<LayoutPreset>> {
    let mut presets = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.splitn(9, '\t').map(str::trim).collect();
        if fields.len() < 8 {
            return Err(Error::PresetParse(format!(
                "line {}: expected 8 tab-separated columns, got {}",
                line_num + 1,
                fields.len()
            )));
        }

        let line_no = line_num + 1;
        let spacing = SpacingType::from_name(fields[6]).ok_or_else(|| {
            Error::PresetParse(format!("line {}: unknown spacing '{}'", line_no, fields[6]))
        })?;
        let supports_guides = match fields[7].to_lowercase().as_str() {
            "true" | "yes" | "1" => true,
            "false" | "no" | "0" => false,
            other => {
                return Err(Error::PresetParse(format!(
                    "line {}: invalid supports_guides '{}'",
                    line_no, other
                )))
            }
        };

        presets.push(LayoutPreset {
            key: Cow::Owned(fields[0].to_string()),
            width_in: parse_field(fields[1], "width_in", line_no)?,
            height_in: parse_field(fields[2], "height_in", line_no)?,
            cols: parse_field(fields[3], "cols", line_no)?,
            rows: parse_field(fields[4], "rows", line_no)?,
            photo_count: parse_field(fields[5], "photo_count", line_no)?,
            spacing,
            supports_guides,
        });
    }

    Ok(presets)
}

fn parse_field<T>(raw: &str, name: &str, line_no: usize) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| {
        Error::PresetParse(format!("line {}: invalid {} '{}': {}", line_no, name, raw, e))
    })
}

/// Write presets as a tab-separated table with a commented header
pub fn write_presets<W: Write>(writer: W, presets: &[LayoutPreset]) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    writeln!(
        writer,
        "# key\twidth_in\theight_in\tcols\trows\tphoto_count\tspacing\tsupports_guides"
    )?;
    for p in presets {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            p.key,
            p.width_in,
            p.height_in,
            p.cols,
            p.rows,
            p.photo_count,
            p.spacing.name(),
            p.supports_guides
        )?;
    }
    writer.flush()?;
    Ok(())
}
