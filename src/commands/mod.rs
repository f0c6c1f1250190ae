mod config_cmd;
mod plan;
mod render;

pub use config_cmd::ConfigCommand;
pub use plan::PlanCommand;
pub use render::RenderCommand;

use chrono::NaiveDate;
use clap::ValueEnum;

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parses a `YYYY-MM-DD` command line date.
fn parse_date(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| CommandError::InvalidDate(raw.to_string()))
}

#[derive(Debug)]
pub enum CommandError {
    InvalidDate(String),
    UnknownPeriod(String),
    Task(String),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::InvalidDate(raw) => {
                write!(f, "Invalid date format '{}'. Use YYYY-MM-DD.", raw)
            }
            CommandError::UnknownPeriod(key) => write!(f, "Period not found: {}", key),
            CommandError::Task(msg) => write!(f, "Background task failed: {}", msg),
        }
    }
}

impl std::error::Error for CommandError {}
