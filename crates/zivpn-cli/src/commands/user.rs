use anyhow::Result;
use zivpn_core::AppCore;
use zivpn_core::services::CredentialGrant;

use crate::cli::UserCommands;
use crate::output::OutputFormat;
use crate::output::table::{credential_table, print_fields, print_table};

pub async fn run(core: &AppCore, command: UserCommands, format: OutputFormat) -> Result<()> {
    match command {
        UserCommands::Create { password, days } => {
            let grant = core.credentials.create(&password, days).await?;
            print_grant("Credential created", &grant, format)
        }
        UserCommands::Trial => {
            let grant = core.credentials.create_trial().await?;
            print_grant("Trial credential created", &grant, format)
        }
        UserCommands::Renew { password, days } => {
            let grant = core.credentials.renew(&password, days).await?;
            print_grant("Credential renewed", &grant, format)
        }
        UserCommands::Delete { password } => {
            core.credentials.delete(&password).await?;
            let deleted = serde_json::json!({ "deleted": password.trim() });
            format.emit(&deleted, |_| {
                println!("Credential {} deleted", password.trim());
                Ok(())
            })
        }
        UserCommands::List => list(core, format),
    }
}

fn print_grant(title: &str, grant: &CredentialGrant, format: OutputFormat) -> Result<()> {
    format.emit(grant, |grant| {
        println!("{title}");
        print_fields(&[
            ("Domain", grant.domain.clone()),
            ("Password", grant.secret.clone()),
            ("Expires", grant.expiry.clone()),
        ])
    })
}

fn list(core: &AppCore, format: OutputFormat) -> Result<()> {
    let records = core.credentials.list()?;
    format.emit(&records, |records| {
        if records.is_empty() {
            println!("No credentials.");
            return Ok(());
        }
        print_table(credential_table(records))
    })
}
