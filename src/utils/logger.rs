use chrono::Local;
use eyre::Result;
use fern::Dispatch;

/// Sets up the application logger with console output.
///
/// # Arguments
/// * `level` - Most verbose level that gets printed
///
/// # Errors
/// * If a logger was already installed
pub fn setup_logger(level: log::LevelFilter) -> Result<()> {
    Dispatch::new()
        .level(level)
        // HTTP plumbing is noisy at debug
        .level_for("hyper", log::LevelFilter::Warn)
        .level_for("reqwest", log::LevelFilter::Warn)
        .chain(std::io::stdout())
        // Format log messages with time and log level
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ));
        })
        .apply()?;
    Ok(())
}
