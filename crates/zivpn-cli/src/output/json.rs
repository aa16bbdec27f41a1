use anyhow::Result;
use serde::Serialize;

/// Pretty JSON with the same field names the HTTP API uses.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", render_json(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zivpn_core::services::{CredentialRecord, CredentialStatus};

    #[test]
    fn test_records_render_with_wire_names() {
        let records = vec![CredentialRecord {
            secret: "alice".to_string(),
            expiry: "2024-01-31".to_string(),
            status: CredentialStatus::Expired,
        }];

        let output = render_json(&records).unwrap();

        assert!(output.contains(r#""password": "alice""#));
        assert!(output.contains(r#""expired": "2024-01-31""#));
        assert!(output.contains(r#""status": "Expired""#));
    }
}
