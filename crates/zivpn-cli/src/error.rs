use colored::Colorize;
use zivpn_core::{AdminError, ErrorKind};

pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), err);

    let kind = err.downcast_ref::<AdminError>().map(AdminError::kind);
    match kind {
        Some(ErrorKind::Conflict) | Some(ErrorKind::NotFound) => {
            suggest("List existing credentials with:", "zivpn user list");
        }
        Some(ErrorKind::UploadFailed | ErrorKind::ListFailed | ErrorKind::FetchFailed) => {
            suggest(
                "Check that the rclone remote is configured and reachable:",
                "rclone listremotes",
            );
        }
        Some(ErrorKind::Io) if err.to_string().to_lowercase().contains("permission denied") => {
            eprintln!("\n{}", "Suggestion:".yellow().bold());
            eprintln!("  The configuration root is usually owned by root; retry with sudo.");
        }
        _ => {}
    }

    std::process::exit(1);
}

fn suggest(hint: &str, command: &str) {
    eprintln!("\n{}", "Suggestion:".yellow().bold());
    eprintln!("  {}", hint);
    eprintln!("  {} {}", "$".dimmed(), command);
}
