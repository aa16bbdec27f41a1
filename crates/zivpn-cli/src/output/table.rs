//! Terminal tables for credentials, backups and key/value summaries.

use anyhow::Result;
use comfy_table::{Cell, Color, Table};
use zivpn_core::backup::RemoteBackup;
use zivpn_core::services::{CredentialRecord, CredentialStatus};

pub fn print_table(table: Table) -> Result<()> {
    println!("{table}");
    Ok(())
}

/// Two-column key/value table.
pub fn fields_table(fields: &[(&str, String)]) -> Table {
    let mut table = Table::new();
    for (key, value) in fields {
        table.add_row(vec![key.to_string(), value.clone()]);
    }
    table
}

pub fn print_fields(fields: &[(&str, String)]) -> Result<()> {
    print_table(fields_table(fields))
}

pub fn credential_table(records: &[CredentialRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Password", "Expires", "Status"]);
    for record in records {
        let status = match record.status {
            CredentialStatus::Active => Cell::new("Active").fg(Color::Green),
            CredentialStatus::Expired => Cell::new("Expired").fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(&record.secret),
            Cell::new(&record.expiry),
            status,
        ]);
    }
    table
}

/// Backups in listing order; a missing timestamp shows as `-`.
pub fn backup_table(backups: &[RemoteBackup]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Size", "Modified"]);
    for backup in backups {
        let modified = backup
            .modified
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&backup.id),
            Cell::new(format_size(backup.size)),
            Cell::new(modified),
        ]);
    }
    table
}

pub fn format_size(bytes: i64) -> String {
    const KIB: f64 = 1024.0;
    let bytes = bytes.max(0) as f64;
    if bytes < KIB {
        format!("{} B", bytes)
    } else if bytes < KIB * KIB {
        format!("{:.1} KiB", bytes / KIB)
    } else {
        format!("{:.1} MiB", bytes / (KIB * KIB))
    }
}
