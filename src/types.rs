use std::fmt;

use crate::error::{ConvertError, Result};

/// Marker written as the first line of every labelimg-OBB file.
pub const YOLO_OBB_MARKER: &str = "YOLO_OBB";

/// Class-name file written next to converted labelimg-OBB labels.
pub const CLASSES_FILE_NAME: &str = "classes.txt";

/// Label files handled by the batch driver
pub const LABEL_EXTENSION: &str = "txt";

/// A single 2-D point
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Four corners in top-left, top-right, bottom-right, bottom-left order.
pub type Polygon = [Vertex; 4];

/// One YOLO-OBB record: a class id and its four corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonAnnotation {
    pub class_id: u32,
    pub polygon: Polygon,
}

impl fmt::Display for PolygonAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class_id)?;
        for v in &self.polygon {
            write!(f, " {} {}", Fixed6(v.x), Fixed6(v.y))?;
        }
        Ok(())
    }
}

/// Geometry of an oriented box without its class.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoxGeometry {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation of the box's width axis, in degrees within (-180, 180].
    pub angle_degrees: f64,
}

/// One labelimg-OBB record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    pub class_id: u32,
    pub geometry: BoxGeometry,
}

impl OrientedBox {
    pub fn new(class_id: u32, geometry: BoxGeometry) -> Self {
        Self { class_id, geometry }
    }
}

impl fmt::Display for OrientedBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let g = &self.geometry;
        write!(
            f,
            "{} {} {} {} {} {}",
            self.class_id,
            Fixed6(g.center_x),
            Fixed6(g.center_y),
            Fixed6(g.width),
            Fixed6(g.height),
            Fixed6(g.angle_degrees)
        )
    }
}

/// Six-decimal label field; non-finite values print as `nan`, `inf` and `-inf`.
struct Fixed6(f64);

impl fmt::Display for Fixed6 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        if v.is_nan() {
            f.write_str("nan")
        } else if v.is_infinite() {
            f.write_str(if v > 0.0 { "inf" } else { "-inf" })
        } else {
            write!(f, "{:.6}", v)
        }
    }
}

/// Size of the image the labels belong to, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ConvertError::InvalidDimensions(format!(
                "{}x{} has a zero side",
                width, height
            )));
        }
        Ok(Self { width, height })
    }

    /// Build dimensions from separately supplied sides. Both or neither must be given.
    pub fn from_parts(width: Option<u32>, height: Option<u32>) -> Result<Option<Self>> {
        match (width, height) {
            (Some(w), Some(h)) => Self::new(w, h).map(Some),
            (None, None) => Ok(None),
            (w, h) => Err(ConvertError::InvalidDimensions(format!(
                "width ({:?}) and height ({:?}) must be supplied together",
                w, h
            ))),
        }
    }

    #[inline]
    pub fn width_f64(&self) -> f64 {
        self.width as f64
    }

    #[inline]
    pub fn height_f64(&self) -> f64 {
        self.height as f64
    }
}

impl fmt::Display for ImageDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Per-file line counts reported by the converters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConversionStats {
    pub converted_lines: usize,
    pub skipped_lines: usize,
}

// Totals over a batch of files
#[derive(Debug, Default, Clone)]
pub struct BatchSummary {
    pub files_converted: usize,
    pub files_failed: usize,
    pub lines_converted: usize,
    pub lines_skipped: usize,
}

impl BatchSummary {
    pub fn record(&mut self, stats: &ConversionStats) {
        self.files_converted += 1;
        self.lines_converted += stats.converted_lines;
        self.lines_skipped += stats.skipped_lines;
    }

    pub fn record_failure(&mut self) {
        self.files_failed += 1;
    }

    pub fn merge(mut self, other: BatchSummary) -> Self {
        self.files_converted += other.files_converted;
        self.files_failed += other.files_failed;
        self.lines_converted += other.lines_converted;
        self.lines_skipped += other.lines_skipped;
        self
    }

    pub fn print_summary(&self) {
        log::info!("=== Conversion Summary ===");
        log::info!("Files converted: {}", self.files_converted);
        log::info!("Annotation lines converted: {}", self.lines_converted);
        if self.lines_skipped > 0 {
            log::info!(
                "Lines skipped (not annotation data): {}",
                self.lines_skipped
            );
        }
        if self.files_failed > 0 {
            log::warn!("Files failed: {}", self.files_failed);
        }
    }
}
