/// Logging setup.
/// Writes to logs/sprout.log; RUST_LOG overrides the default filters.

use log::LevelFilter;
use std::io::Write;

pub fn init() {
    let mut builder = env_logger::Builder::new();

    if let Ok(log_level) = std::env::var("RUST_LOG") {
        builder.parse_filters(&log_level);
    } else {
        builder.filter_level(LevelFilter::Info);
        // The HTTP stack is too chatty at info level
        builder.filter_module("reqwest", LevelFilter::Warn);
        builder.filter_module("hyper", LevelFilter::Warn);
        builder.filter_module("hyper_util", LevelFilter::Warn);
        builder.filter_module("rustls", LevelFilter::Warn);
    }

    // Log format: [HH:MM:SS LEVEL] target - message
    builder.format(|buf, record| {
        let now = chrono::Local::now().format("%H:%M:%S");
        writeln!(
            buf,
            "[{} {}] {} - {}",
            now,
            record.level(),
            record.target(),
            record.args()
        )
    });

    let log_dir = "logs";
    if !std::path::Path::new(log_dir).exists() {
        let _ = std::fs::create_dir(log_dir);
    }

    builder
        .target(env_logger::Target::Pipe(Box::new(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open("logs/sprout.log")
                .expect("failed to open log file"),
        )))
        .init();

    log::info!("logging initialized ✓");
}
