/// Logger installation for the `vantage` binary
///
/// The library crates only talk to the `log` facade; the logger itself is
/// created here, once, by `main`.
use std::io::Write;

/// Install an `env_logger` at the level selected by `verbosity`.
///
/// `RUST_LOG` still takes precedence for individual modules.
pub fn setup_logging(verbosity: u8) {
    let mut builder = env_logger::Builder::new();
    builder.format(|buf, record| {
        let top_level_module = record
            .module_path()
            .and_then(|path| path.split("::").next())
            .unwrap_or("vantage");
        writeln!(
            buf,
            "{:5} [{}]: {}",
            record.level(),
            top_level_module,
            record.args()
        )
    });
    builder.filter_level(log_filter_from_level(verbosity));
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }
    builder.init();
}

/// Map a `-v` count to a level filter.
pub fn log_filter_from_level(level: u8) -> log::LevelFilter {
    match level {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}
