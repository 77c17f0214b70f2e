//! YOLO-OBB -> labelimg-OBB -> YOLO-OBB comparison reports.
//!
//! The report only places the three representations side by side for manual
//! inspection; no pass/fail verdict is computed.
use log::info;
use std::path::{Path, PathBuf};

use crate::config::ConversionOptions;
use crate::conversion::{convert_box_file_to_polygon_file, convert_polygon_file_to_box_file};
use crate::error::Result;
use crate::io::{read_label_file, write_atomically};
use crate::types::{ConversionStats, ImageDimensions};

const RULE_WIDTH: usize = 50;

/// Paths produced by one round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTripFiles {
    pub temp_box: PathBuf,
    pub temp_polygon: PathBuf,
    pub report: PathBuf,
    /// Line counts of the forward conversion
    pub stats: ConversionStats,
}

/// Convert `input` to labelimg-OBB and back, then write a comparison report.
///
/// Returns the two intermediate files so the caller can delete them.
pub fn compare_round_trip(
    input: &Path,
    output_dir: &Path,
    dims: Option<ImageDimensions>,
    options: &ConversionOptions,
) -> Result<(PathBuf, PathBuf)> {
    let files = run_round_trip(input, output_dir, dims, options)?;
    Ok((files.temp_box, files.temp_polygon))
}

/// Like [`compare_round_trip`] but also reports where the comparison went.
pub fn run_round_trip(
    input: &Path,
    output_dir: &Path,
    dims: Option<ImageDimensions>,
    options: &ConversionOptions,
) -> Result<RoundTripFiles> {
    let basename = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_box = output_dir.join(format!("temp_labelimg_{}", basename));
    let temp_polygon = output_dir.join(format!("temp_yoloobb_{}", basename));
    let report = output_dir.join(format!("comparison_{}", basename));

    let stats = convert_polygon_file_to_box_file(input, &temp_box, dims, options)?;
    convert_box_file_to_polygon_file(&temp_box, &temp_polygon, dims, options)?;

    let original = read_label_file(input)?;
    let intermediate = read_label_file(&temp_box)?;
    let converted = read_label_file(&temp_polygon)?;

    let content = comparison_report(&original, &intermediate, &converted);
    write_atomically(&report, content.as_bytes())?;
    info!("Comparison saved to {}", report.display());

    Ok(RoundTripFiles {
        temp_box,
        temp_polygon,
        report,
        stats,
    })
}

/// Lay out original, intermediate and re-derived contents in that order.
pub fn comparison_report(original: &str, intermediate: &str, converted: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out =
        String::with_capacity(original.len() + intermediate.len() + converted.len() + 512);

    out.push_str("Original YOLO-OBB file vs. round-tripped YOLO-OBB file:\n");
    out.push_str(&rule);
    out.push('\n');

    out.push_str("Original YOLO-OBB content:\n");
    push_section(&mut out, original);
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    out.push_str("Intermediate labelimg-OBB content:\n");
    push_section(&mut out, intermediate);
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');

    out.push_str("Round-tripped YOLO-OBB content:\n");
    push_section(&mut out, converted);
    out
}

fn push_section(out: &mut String, content: &str) {
    out.push_str(content);
    if !content.is_empty() && !content.ends_with('\n') {
        out.push('\n');
    }
}
