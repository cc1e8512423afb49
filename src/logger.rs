use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::OpenOptions;

/// Sends `log` records of this crate to `log_path`, stdout is owned by the front end
pub fn setup_file_logger(log_path: &str, verbose: bool) -> anyhow::Result<()> {
    let logger_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("chipdog")
        .build();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Ok(WriteLogger::init(level, logger_config, log_file)?)
}
