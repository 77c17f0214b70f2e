use log::debug;
use std::path::Path;

use crate::config::{ConversionOptions, CoordinateSpace};
use crate::error::{LineError, Result};
use crate::geometry::{fit_oriented_box_with, reconstruct_polygon};
use crate::io::{read_label_file, write_atomically};
use crate::types::{
    BoxGeometry, ConversionStats, ImageDimensions, OrientedBox, Polygon, PolygonAnnotation,
    Vertex, YOLO_OBB_MARKER,
};

/// Minimum fields of a YOLO-OBB line: class id plus four x/y pairs
pub const POLYGON_FIELDS: usize = 9;

/// Minimum fields of a labelimg-OBB line: class id, center, size and angle
pub const BOX_FIELDS: usize = 6;

/// Parse `class_id x1 y1 x2 y2 x3 y3 x4 y4`. Extra trailing fields are ignored.
pub fn parse_polygon_line(line: &str) -> std::result::Result<PolygonAnnotation, LineError> {
    let fields = split_fields(line, POLYGON_FIELDS)?;
    let class_id = parse_class_id(&fields)?;

    let mut polygon: Polygon = [Vertex::default(); 4];
    for (i, vertex) in polygon.iter_mut().enumerate() {
        let x = parse_number(&fields, 1 + i * 2)?;
        let y = parse_number(&fields, 2 + i * 2)?;
        *vertex = Vertex::new(x, y);
    }
    Ok(PolygonAnnotation { class_id, polygon })
}

/// Parse `class_id center_x center_y width height angle_degrees`.
pub fn parse_box_line(line: &str) -> std::result::Result<OrientedBox, LineError> {
    let fields = split_fields(line, BOX_FIELDS)?;
    let class_id = parse_class_id(&fields)?;

    let mut values = [0.0; 5];
    for (i, value) in values.iter_mut().enumerate() {
        *value = parse_number(&fields, i + 1)?;
    }
    let [center_x, center_y, width, height, angle_degrees] = values;

    Ok(OrientedBox::new(
        class_id,
        BoxGeometry {
            center_x,
            center_y,
            width,
            height,
            angle_degrees,
        },
    ))
}

fn split_fields(line: &str, expected: usize) -> std::result::Result<Vec<&str>, LineError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < expected {
        return Err(LineError::TooFewFields {
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

fn parse_class_id(fields: &[&str]) -> std::result::Result<u32, LineError> {
    fields[0].parse().map_err(|_| LineError::InvalidNumber {
        index: 0,
        value: fields[0].to_string(),
    })
}

fn parse_number(fields: &[&str], index: usize) -> std::result::Result<f64, LineError> {
    fields[index]
        .parse()
        .map_err(|_| LineError::InvalidNumber {
            index,
            value: fields[index].to_string(),
        })
}

/// Scale normalized vertices up to pixels.
///
/// With [`CoordinateSpace::Inferred`] each vertex is judged on its own: it is
/// scaled only when both of its coordinates are at most 1.0, so a polygon with
/// mixed magnitudes is only partly scaled.
pub fn denormalize_polygon(
    polygon: &Polygon,
    dims: Option<ImageDimensions>,
    space: CoordinateSpace,
) -> Polygon {
    let Some(dims) = dims else {
        return *polygon;
    };
    let (w, h) = (dims.width_f64(), dims.height_f64());

    polygon.map(|v| {
        let scale = match space {
            CoordinateSpace::Inferred => v.x <= 1.0 && v.y <= 1.0,
            CoordinateSpace::Normalized => true,
            CoordinateSpace::Pixel => false,
        };
        if scale {
            Vertex::new(v.x * w, v.y * h)
        } else {
            v
        }
    })
}

/// Scale pixel vertices down to normalized coordinates.
///
/// With [`CoordinateSpace::Inferred`] the whole polygon is scaled when its
/// largest x or largest y exceeds 1.0.
pub fn renormalize_polygon(
    polygon: &Polygon,
    dims: Option<ImageDimensions>,
    space: CoordinateSpace,
) -> Polygon {
    let Some(dims) = dims else {
        return *polygon;
    };

    let scale = match space {
        CoordinateSpace::Inferred => {
            let max_x = polygon.iter().map(|v| v.x).fold(f64::NEG_INFINITY, f64::max);
            let max_y = polygon.iter().map(|v| v.y).fold(f64::NEG_INFINITY, f64::max);
            max_x > 1.0 || max_y > 1.0
        }
        CoordinateSpace::Normalized => true,
        CoordinateSpace::Pixel => false,
    };
    if !scale {
        return *polygon;
    }

    let (w, h) = (dims.width_f64(), dims.height_f64());
    polygon.map(|v| Vertex::new(v.x / w, v.y / h))
}

/// Forward transform of one record: four vertices to an oriented box.
pub fn polygon_to_box(
    annotation: &PolygonAnnotation,
    dims: Option<ImageDimensions>,
    options: &ConversionOptions,
) -> OrientedBox {
    let pixels = denormalize_polygon(&annotation.polygon, dims, options.coordinate_space);
    OrientedBox::new(
        annotation.class_id,
        fit_oriented_box_with(&pixels, options.height_extent),
    )
}

/// Inverse transform of one record: an oriented box to four vertices.
pub fn box_to_polygon(
    obb: &OrientedBox,
    dims: Option<ImageDimensions>,
    options: &ConversionOptions,
) -> PolygonAnnotation {
    let corners = reconstruct_polygon(&obb.geometry);
    PolygonAnnotation {
        class_id: obb.class_id,
        polygon: renormalize_polygon(&corners, dims, options.coordinate_space),
    }
}

/// Convert the content of a YOLO-OBB file to labelimg-OBB text.
///
/// The output always starts with the `YOLO_OBB` marker line. Lines that are
/// not annotation data are dropped and counted in the returned stats.
pub fn polygon_text_to_box_text(
    content: &str,
    dims: Option<ImageDimensions>,
    options: &ConversionOptions,
) -> (String, ConversionStats) {
    let mut stats = ConversionStats::default();
    let mut out = String::with_capacity(YOLO_OBB_MARKER.len() + content.len());
    out.push_str(YOLO_OBB_MARKER);
    out.push('\n');

    for (line_no, line) in content.lines().enumerate() {
        match parse_polygon_line(line) {
            Ok(annotation) => {
                let obb = polygon_to_box(&annotation, dims, options);
                out.push_str(&obb.to_string());
                out.push('\n');
                stats.converted_lines += 1;
            }
            Err(e) => skip_line(&mut stats, line_no, line, &e),
        }
    }

    (out, stats)
}

/// Convert the content of a labelimg-OBB file to YOLO-OBB text.
///
/// A first line containing `YOLO_OBB` anywhere is treated as the marker and
/// skipped; otherwise it is parsed like any other line.
pub fn box_text_to_polygon_text(
    content: &str,
    dims: Option<ImageDimensions>,
    options: &ConversionOptions,
) -> (String, ConversionStats) {
    let mut stats = ConversionStats::default();
    let mut out = String::with_capacity(content.len() * 2);

    let mut lines = content.lines().enumerate().peekable();
    if let Some((_, first)) = lines.peek() {
        if first.contains(YOLO_OBB_MARKER) {
            lines.next();
        }
    }

    for (line_no, line) in lines {
        match parse_box_line(line) {
            Ok(obb) => {
                let annotation = box_to_polygon(&obb, dims, options);
                out.push_str(&annotation.to_string());
                out.push('\n');
                stats.converted_lines += 1;
            }
            Err(e) => skip_line(&mut stats, line_no, line, &e),
        }
    }

    (out, stats)
}

fn skip_line(stats: &mut ConversionStats, line_no: usize, line: &str, reason: &LineError) {
    if line.trim().is_empty() {
        return;
    }
    debug!("Skipping line {}: {} ({:?})", line_no + 1, reason, line);
    stats.skipped_lines += 1;
}

/// Convert a YOLO-OBB label file into a labelimg-OBB label file.
///
/// Missing parent directories of `output` are created. The output replaces
/// any existing file atomically.
pub fn convert_polygon_file_to_box_file(
    input: &Path,
    output: &Path,
    dims: Option<ImageDimensions>,
    options: &ConversionOptions,
) -> Result<ConversionStats> {
    let content = read_label_file(input)?;
    let (converted, stats) = polygon_text_to_box_text(&content, dims, options);
    write_atomically(output, converted.as_bytes())?;
    Ok(stats)
}

/// Convert a labelimg-OBB label file into a YOLO-OBB label file.
pub fn convert_box_file_to_polygon_file(
    input: &Path,
    output: &Path,
    dims: Option<ImageDimensions>,
    options: &ConversionOptions,
) -> Result<ConversionStats> {
    let content = read_label_file(input)?;
    let (converted, stats) = box_text_to_polygon_text(&content, dims, options);
    write_atomically(output, converted.as_bytes())?;
    Ok(stats)
}
