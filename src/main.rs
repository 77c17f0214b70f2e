use clap::Parser;

use log::{error, info};
use std::process::ExitCode;

use obb_convert::{process_directory, Args, BatchJob};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if !args.input_dir.is_dir() {
        error!(
            "The specified input_dir does not exist: {}",
            args.input_dir.display()
        );
        return ExitCode::FAILURE;
    }

    let job = match BatchJob::from_args(&args) {
        Ok(job) => job,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Starting {:?} conversion...", job.mode);

    match process_directory(&job) {
        Ok(summary) if summary.files_failed == 0 => {
            info!("Conversion completed successfully.");
            ExitCode::SUCCESS
        }
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("Failed to process directory: {}", e);
            ExitCode::FAILURE
        }
    }
}
