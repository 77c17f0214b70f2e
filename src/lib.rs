//! YOLO-OBB <-> labelimg-OBB label converter
//!
//! This library converts oriented bounding box annotations between the
//! four-vertex YOLO-OBB format and the center/size/angle labelimg-OBB format,
//! and can round-trip a file through both for inspection.

pub mod batch;
pub mod classes;
pub mod config;
pub mod conversion;
pub mod error;
pub mod geometry;
pub mod io;
pub mod roundtrip;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use batch::{process_directory, BatchJob};
pub use config::{Args, ConversionOptions, CoordinateSpace, HeightExtent, Mode};
pub use conversion::{
    box_text_to_polygon_text, convert_box_file_to_polygon_file, convert_polygon_file_to_box_file,
    polygon_text_to_box_text,
};
pub use error::{ConvertError, Result};
pub use geometry::{fit_oriented_box, fit_oriented_box_with, reconstruct_polygon};
pub use roundtrip::compare_round_trip;
pub use types::{
    BoxGeometry, ConversionStats, ImageDimensions, OrientedBox, Polygon, PolygonAnnotation, Vertex,
};
