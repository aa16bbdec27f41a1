use anyhow::Result;
use zivpn_core::AppCore;
use zivpn_core::services::AutoBackupPolicy;

use crate::cli::BackupCommands;
use crate::output::OutputFormat;
use crate::output::table::{backup_table, print_fields, print_table};

pub async fn run(core: &AppCore, command: BackupCommands, format: OutputFormat) -> Result<()> {
    match command {
        BackupCommands::Create => {
            let created = core.backups.create().await?;
            format.emit(&created, |created| {
                println!("Backup uploaded");
                print_fields(&[
                    ("Backup ID", created.backup_id.clone()),
                    ("File", created.filename.clone()),
                    ("Domain", created.domain.clone()),
                    ("Contents", created.files.join(", ")),
                ])
            })
        }
        BackupCommands::List => list(core, format).await,
        BackupCommands::Restore { backup_id } => {
            let report = core.backups.restore(&backup_id).await?;
            format.emit(&report, |report| {
                println!(
                    "Restored {} files from backup {}",
                    report.restored, report.backup_id
                );
                if report.failed > 0 {
                    println!("{} archive members could not be restored, see the log", report.failed);
                }
                Ok(())
            })
        }
        BackupCommands::Cleanup => {
            let report = core.backups.cleanup().await?;
            format.emit(&report, |report| {
                println!(
                    "Deleted {} expired backups ({} failed)",
                    report.deleted, report.failed
                );
                Ok(())
            })
        }
        BackupCommands::Auto { status } => {
            let policy = if status {
                core.auto_backup.status()?
            } else {
                core.auto_backup.toggle().await?
            };
            print_policy(&policy, format)
        }
    }
}

async fn list(core: &AppCore, format: OutputFormat) -> Result<()> {
    let backups = core.backups.list().await?;
    format.emit(&backups, |backups| {
        if backups.is_empty() {
            println!("No backups found.");
            return Ok(());
        }
        print_table(backup_table(backups))
    })
}

fn print_policy(policy: &AutoBackupPolicy, format: OutputFormat) -> Result<()> {
    format.emit(policy, |policy| {
        let state = if policy.enabled { "enabled" } else { "disabled" };
        println!("Auto backup {} (schedule: {})", state, policy.schedule);
        Ok(())
    })
}
