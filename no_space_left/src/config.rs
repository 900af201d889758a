use clap::{Args, Parser, ValueEnum};

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Largest directory counted by the bounded sum
    #[clap(long, default_value_t = 100000)]
    pub size_threshold: u64,

    /// Size of the whole disk
    #[clap(long, default_value_t = 70000000)]
    pub disk_capacity: u64,

    /// Free space needed after deleting one directory
    #[clap(long, default_value_t = 30000000)]
    pub required_free_space: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            size_threshold: 100000,
            disk_capacity: 70000000,
            required_free_space: 30000000,
        }
    }
}

#[derive(Debug, Clone, ValueEnum, Default)]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Silent,
}

impl LogLevel {
    pub fn to_tracing_level(&self) -> Option<tracing::Level> {
        match self {
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Silent => None,
        }
    }
}

/// Reads a transcript from stdin and answers the directory size queries.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// Print the reconstructed tree to stderr
    #[clap(long)]
    pub dump: bool,
}

impl Cli {
    pub fn setup_tracing(&self) {
        if let Some(level) = self.log_level.to_tracing_level() {
            tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .without_time()
                .compact()
                .init();
        }
    }
}
