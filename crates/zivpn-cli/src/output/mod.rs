pub mod json;
pub mod table;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    /// Print `value` as JSON, or through `text` for terminal output.
    pub fn emit<T, F>(self, value: &T, text: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> Result<()>,
    {
        match self {
            OutputFormat::Json => json::print_json(value),
            OutputFormat::Text => text(value),
        }
    }
}
