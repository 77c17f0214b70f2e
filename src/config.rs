use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

use crate::classes::ClassPreset;
use crate::error::Result;
use crate::types::ImageDimensions;

/// Command-line arguments for converting between YOLO-OBB and labelimg-OBB labels.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Directory containing the label files to convert
    #[arg(short = 'i', long = "input_dir")]
    pub input_dir: PathBuf,

    /// Directory that receives converted labels or comparison reports
    #[arg(short = 'o', long = "output_dir")]
    pub output_dir: PathBuf,

    /// Conversion direction
    #[arg(short = 'm', long = "mode", value_enum, default_value = "to-labelimg")]
    pub mode: Mode,

    /// Image width in pixels
    #[arg(long = "img_width", value_parser = validate_dimension)]
    pub img_width: Option<u32>,

    /// Image height in pixels
    #[arg(long = "img_height", value_parser = validate_dimension)]
    pub img_height: Option<u32>,

    /// Common image resolution, used instead of --img_width/--img_height
    #[arg(long = "size_preset", value_enum, conflicts_with_all = ["img_width", "img_height"])]
    pub size_preset: Option<SizePreset>,

    /// Read the image size from this image file
    #[arg(
        long = "size_from_image",
        conflicts_with_all = ["img_width", "img_height", "size_preset"]
    )]
    pub size_from_image: Option<PathBuf>,

    /// How to decide whether coordinates are normalized or in pixels
    #[arg(long = "coordinate_space", value_enum, default_value = "inferred")]
    pub coordinate_space: CoordinateSpace,

    /// Height measured from the fitted box: 'half' (legacy) or 'full'
    #[arg(long = "height_extent", value_enum, default_value = "half")]
    pub height_extent: HeightExtent,

    /// Do not write classes.txt when converting to labelimg-OBB
    #[arg(long = "no_classes")]
    pub no_classes: bool,

    /// Take class names from a built-in preset
    #[arg(long = "class_preset", value_enum, conflicts_with = "classes_file")]
    pub class_preset: Option<ClassPreset>,

    /// Take class names from a text file, one name per line
    #[arg(long = "classes_file")]
    pub classes_file: Option<PathBuf>,

    /// Remove temporary files produced by the compare mode
    #[arg(long = "cleanup")]
    pub cleanup: bool,

    /// Class names assigned to the sorted class ids
    #[arg(use_value_delimiter = true)]
    pub label_list: Vec<String>,
}

impl Args {
    /// Resolve the image size from explicit sides, a preset or an image file.
    pub fn image_dimensions(&self) -> Result<Option<ImageDimensions>> {
        if let Some(preset) = self.size_preset {
            return Ok(Some(preset.dimensions()));
        }
        if let Some(path) = &self.size_from_image {
            return crate::utils::read_image_dimensions(path).map(Some);
        }
        ImageDimensions::from_parts(self.img_width, self.img_height)
    }

    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions {
            coordinate_space: self.coordinate_space,
            height_extent: self.height_extent,
        }
    }
}

// Conversion direction, numbered like the interactive tool's menu
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub enum Mode {
    /// YOLO-OBB to labelimg-OBB
    #[value(name = "to-labelimg", alias = "1")]
    ToLabelimg,
    /// labelimg-OBB to YOLO-OBB
    #[value(name = "to-yolo", alias = "2")]
    ToYolo,
    /// YOLO-OBB to labelimg-OBB and back, with a comparison report
    #[value(name = "compare", alias = "3")]
    Compare,
}

/// How coordinates are classified as normalized or pixel values.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum CoordinateSpace {
    /// Guess per vertex (forward) or per polygon (inverse) by comparing against 1.0
    #[default]
    Inferred,
    /// YOLO-OBB coordinates are always normalized
    Normalized,
    /// YOLO-OBB coordinates are already pixels; never rescale
    Pixel,
}

/// Which extent across the minor axis is reported as the box height.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum HeightExtent {
    /// Largest projection only, i.e. half the true height for a rectangle
    #[default]
    Half,
    /// Max minus min projection
    Full,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum SizePreset {
    #[value(name = "720p")]
    Hd,
    #[value(name = "1080p")]
    FullHd,
    #[value(name = "4k")]
    Uhd,
    #[value(name = "vga")]
    Vga,
    #[value(name = "qvga")]
    Qvga,
}

impl SizePreset {
    pub fn dimensions(self) -> ImageDimensions {
        let (width, height) = match self {
            SizePreset::Hd => (1280, 720),
            SizePreset::FullHd => (1920, 1080),
            SizePreset::Uhd => (3840, 2160),
            SizePreset::Vga => (640, 480),
            SizePreset::Qvga => (320, 240),
        };
        ImageDimensions { width, height }
    }
}

/// Library-level knobs shared by the forward and inverse transforms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionOptions {
    pub coordinate_space: CoordinateSpace,
    pub height_extent: HeightExtent,
}

// Validate that an image side is a positive integer
pub(crate) fn validate_dimension(s: &str) -> std::result::Result<u32, String> {
    match u32::from_str(s.trim()) {
        Ok(val) if val > 0 => Ok(val),
        _ => Err("image size must be a positive integer".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_dimension() {
        assert_eq!(validate_dimension("640"), Ok(640));
        assert_eq!(validate_dimension(" 480 "), Ok(480));
        assert!(validate_dimension("0").is_err());
        assert!(validate_dimension("-1").is_err());
        assert!(validate_dimension("abc").is_err());
    }

    #[test]
    fn test_size_presets() {
        assert_eq!(
            SizePreset::FullHd.dimensions(),
            ImageDimensions {
                width: 1920,
                height: 1080
            }
        );
        assert_eq!(SizePreset::Qvga.dimensions().width, 320);
    }

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from([
            "obb-convert",
            "-i",
            "labels",
            "-o",
            "out",
            "--mode",
            "2",
            "--size_preset",
            "720p",
            "plane,ship",
        ])
        .unwrap();
        assert_eq!(args.mode, Mode::ToYolo);
        assert_eq!(args.label_list, vec!["plane", "ship"]);
        assert_eq!(
            args.image_dimensions().unwrap(),
            Some(ImageDimensions {
                width: 1280,
                height: 720
            })
        );
        assert_eq!(args.conversion_options(), ConversionOptions::default());
    }

    #[test]
    fn test_half_supplied_size_is_rejected() {
        let args =
            Args::try_parse_from(["obb-convert", "-i", "a", "-o", "b", "--img_width", "100"])
                .unwrap();
        assert!(args.image_dimensions().is_err());
    }
}
