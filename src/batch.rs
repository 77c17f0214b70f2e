use log::{error, info, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::classes::{collect_class_ids, write_classes_file, ClassNames};
use crate::config::{Args, ConversionOptions, Mode};
use crate::conversion::{convert_box_file_to_polygon_file, convert_polygon_file_to_box_file};
use crate::error::Result;
use crate::io::{collect_label_files, output_path_for};
use crate::roundtrip::run_round_trip;
use crate::types::{BatchSummary, ConversionStats, ImageDimensions};
use crate::utils::{create_progress_bar, ensure_output_directory};

/// Settings for one batch run over a directory of label files
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub mode: Mode,
    pub dims: Option<ImageDimensions>,
    pub options: ConversionOptions,
    /// Class names for `classes.txt`; `None` disables the file
    pub class_names: Option<ClassNames>,
    pub cleanup: bool,
}

impl BatchJob {
    /// Build a job from command-line arguments, resolving size and class names.
    pub fn from_args(args: &Args) -> Result<Self> {
        let class_names = if args.no_classes || args.mode != Mode::ToLabelimg {
            None
        } else if let Some(preset) = args.class_preset {
            Some(ClassNames::from_preset(preset))
        } else if let Some(path) = &args.classes_file {
            Some(ClassNames::from_file(path)?)
        } else {
            Some(ClassNames::new(args.label_list.clone()))
        };

        Ok(Self {
            input_dir: args.input_dir.clone(),
            output_dir: args.output_dir.clone(),
            mode: args.mode,
            dims: args.image_dimensions()?,
            options: args.conversion_options(),
            class_names,
            cleanup: args.cleanup,
        })
    }
}

/// Run the job's conversion over every label file in its input directory.
///
/// Files are converted in parallel; a file that fails is logged and counted
/// and does not stop the rest of the batch.
pub fn process_directory(job: &BatchJob) -> Result<BatchSummary> {
    ensure_output_directory(&job.output_dir)?;

    match job.dims {
        Some(dims) => info!("Image size: {} pixels", dims),
        None => warn!("No image size given; coordinates will not be rescaled"),
    }

    let files = collect_label_files(&job.input_dir)?;
    info!(
        "Found {} label files in {}",
        files.len(),
        job.input_dir.display()
    );

    if let Some(names) = &job.class_names {
        let class_ids = collect_class_ids(&files);
        info!("Class ids found in input: {:?}", class_ids);
        write_classes_file(&job.output_dir, &class_ids, names)?;
    }

    let label = match job.mode {
        Mode::ToLabelimg => "YOLO-OBB -> labelimg-OBB",
        Mode::ToYolo => "labelimg-OBB -> YOLO-OBB",
        Mode::Compare => "Compare",
    };
    let pb = create_progress_bar(files.len() as u64, label);

    let summary = files
        .par_iter()
        .fold(BatchSummary::default, |mut summary, input| {
            match process_file(job, input) {
                Ok(stats) => summary.record(&stats),
                Err(e) => {
                    error!("Failed to convert {}: {}", input.display(), e);
                    summary.record_failure();
                }
            }
            pb.inc(1);
            summary
        })
        .reduce(BatchSummary::default, BatchSummary::merge);

    pb.finish_and_clear();
    summary.print_summary();
    Ok(summary)
}

fn process_file(job: &BatchJob, input: &Path) -> Result<ConversionStats> {
    match job.mode {
        Mode::ToLabelimg => {
            let output = output_path_for(input, &job.output_dir);
            convert_polygon_file_to_box_file(input, &output, job.dims, &job.options)
        }
        Mode::ToYolo => {
            let output = output_path_for(input, &job.output_dir);
            convert_box_file_to_polygon_file(input, &output, job.dims, &job.options)
        }
        Mode::Compare => {
            let files = run_round_trip(input, &job.output_dir, job.dims, &job.options)?;
            if job.cleanup {
                for temp in [&files.temp_box, &files.temp_polygon] {
                    if let Err(e) = fs::remove_file(temp) {
                        warn!("Could not remove {}: {}", temp.display(), e);
                    }
                }
            }
            Ok(files.stats)
        }
    }
}
