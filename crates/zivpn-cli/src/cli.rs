use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "zivpn")]
#[command(version, about = "ZiVPN - credential and backup administration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file, read as-is without ZIVPN_* overrides
    /// (defaults to $ZIVPN_CONFIG, then /etc/zivpn/admin.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Configuration root holding config.json, users.db and friends
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Credential management
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Remote backups
    Backup {
        #[command(subcommand)]
        command: BackupCommands,
    },

    /// Show service status
    Info,
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a credential valid for a number of days
    Create {
        password: String,
        #[arg(default_value_t = 30)]
        days: i64,
    },

    /// Remove a credential
    Delete { password: String },

    /// Extend a credential
    Renew { password: String, days: i64 },

    /// List every credential with its status
    List,

    /// Create a one-day trial credential
    Trial,
}

#[derive(Subcommand)]
pub enum BackupCommands {
    /// Archive the configuration and upload it
    Create,

    /// List remote backups
    List,

    /// Restore a backup over the live configuration
    Restore { backup_id: String },

    /// Delete remote backups past the retention window
    Cleanup,

    /// Toggle the scheduled backup
    Auto {
        /// Show the current policy without changing it
        #[arg(long)]
        status: bool,
    },
}
