use clap::{Parser, ValueEnum};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

use crate::modules::variant::Variant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(author, version, about = "Drop a pile of balloons and push them around", long_about = None)]
pub struct Cli {
    /// Which balloon pit to open with
    #[arg(long, value_enum, default_value_t = Variant::Pit)]
    pub variant: Variant,

    /// Override the variant's balloon count
    #[arg(long)]
    pub balloons: Option<usize>,

    /// Random seed, defaults to the clock
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = 1024)]
    pub width: i32,

    #[arg(long, default_value_t = 768)]
    pub height: i32,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

impl Cli {
    /// Balloon count for `variant`, honoring `--balloons`.
    pub fn balloon_count(&self, variant: Variant) -> usize {
        self.balloons.unwrap_or(variant.tuning().balloon_count)
    }
}

pub fn init_logging(level: LogLevel) {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(LevelFilter::from(level))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["balloon-pit"]).unwrap();
        assert_eq!(cli.variant, Variant::Pit);
        assert_eq!(cli.balloon_count(Variant::Pit), 100);
        assert_eq!(cli.balloon_count(Variant::Bouncy), 7);
        assert_eq!((cli.width, cli.height), (1024, 768));
        assert_eq!(cli.log_level, LogLevel::Info);
        assert_eq!(cli.seed, None);
    }

    #[test]
    fn overrides() {
        let cli = Cli::try_parse_from([
            "balloon-pit",
            "--variant",
            "tethered",
            "--balloons",
            "3",
            "--seed",
            "42",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.variant, Variant::Tethered);
        assert_eq!(cli.balloon_count(Variant::Pit), 3);
        assert_eq!(cli.seed, Some(42));
        assert_eq!(LevelFilter::from(cli.log_level), LevelFilter::DEBUG);
    }

    #[test]
    fn unknown_variant_is_rejected() {
        assert!(Cli::try_parse_from(["balloon-pit", "--variant", "popping"]).is_err());
    }
}
