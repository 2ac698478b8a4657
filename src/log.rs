use std::io::Write;

use env_logger::Builder;
pub use log::LevelFilter;

/// Sets up an `env_logger` writing to stderr with elapsed-time prefixes.
/// `RUST_LOG` still overrides the given level.
pub fn build_logger_for_level(level: LevelFilter) {
    let start = std::time::Instant::now();
    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .parse_default_env()
        .format(move |buf, record| {
            writeln!(
                buf,
                "c [{:>9.3}s] {:<5} {}",
                start.elapsed().as_secs_f64(),
                record.level(),
                record.args()
            )
        });

    if let Err(err) = builder.try_init() {
        // another logger was installed first (e.g. by an earlier test) and stays active
        log::debug!("Keeping the existing logger: {err}");
    }
}

/// Like [`build_logger_for_level`], each occurrence of `-v` raises the level by one step
pub fn build_logger_for_verbosity(base: LevelFilter, verbose: usize) {
    let levels = [
        LevelFilter::Off,
        LevelFilter::Error,
        LevelFilter::Warn,
        LevelFilter::Info,
        LevelFilter::Debug,
        LevelFilter::Trace,
    ];
    let index = levels.iter().position(|&l| l == base).unwrap_or(2);
    build_logger_for_level(levels[(index + verbose).min(levels.len() - 1)]);
}
