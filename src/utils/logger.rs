use colored::Colorize;
use env_logger::{Builder, Target};
use log::Level;
use std::io::Write;
use std::path::Path;

/// ANSI colors for run summaries.
pub struct Colors;

impl Colors {
    pub const PROCESSED: colored::Color = colored::Color::Green;
    pub const SKIPPED: colored::Color = colored::Color::Yellow;
    pub const ERROR: colored::Color = colored::Color::Red;

    pub fn colorize(color: colored::Color, text: &str) -> String {
        text.color(color).to_string()
    }
}

fn level_filter(name: &str) -> log::LevelFilter {
    match name.to_ascii_uppercase().as_str() {
        "DEBUG" => log::LevelFilter::Debug,
        "WARN" => log::LevelFilter::Warn,
        "ERROR" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    }
}

/// Configure the process-wide logger. `level` is the configured `log-level`
/// key (DEBUG/INFO/WARN/ERROR); `verbose` forces DEBUG. When `log_file` is
/// set, output goes there instead of stderr (no colors).
pub fn setup_logging(level: &str, verbose: bool, log_file: Option<&Path>) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        level_filter(level)
    };

    let mut builder = Builder::from_default_env();
    builder
        .filter_level(log::LevelFilter::Warn) // dependencies: warnings only
        .filter_module(env!("CARGO_PKG_NAME"), level);

    let to_file = match log_file {
        Some(path) => match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => {
                builder.target(Target::Pipe(Box::new(f)));
                true
            }
            Err(e) => {
                eprintln!("could not open log file {}: {e}", path.display());
                false
            }
        },
        None => false,
    };

    builder
        .format(move |buf, record| {
            let name = env!("CARGO_PKG_NAME");
            let line = if to_file {
                format!("[{} {}] {}", name, record.level(), record.args())
            } else {
                match record.level() {
                    Level::Error | Level::Warn => {
                        let level_str = match record.level() {
                            Level::Warn => "WARN".yellow(),
                            Level::Error => "ERROR".red(),
                            _ => unreachable!(),
                        };
                        let path = record.target().to_string().white();
                        format!("[{} {} {}] {}", name.cyan(), level_str, path, record.args())
                    }
                    _ => format!("[{}] {}", name.cyan(), record.args()),
                }
            };
            writeln!(buf, "{}", line)
        })
        .init();
}
