//! Service configuration document.
//!
//! Only the fields the admin backend touches are typed; anything else in the
//! document is carried through `extra` so a rewrite never drops settings the
//! VPN daemon understands but we do not.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VpnConfig {
    #[serde(default)]
    pub listen: String,
    #[serde(default)]
    pub cert: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub obfs: String,
    #[serde(default)]
    pub auth: AuthSection,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSection {
    #[serde(default)]
    pub mode: String,
    /// Valid credentials. Each secret is both username and password.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub config: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl VpnConfig {
    pub fn credentials(&self) -> &[String] {
        &self.auth.config
    }

    pub fn contains(&self, secret: &str) -> bool {
        self.auth.config.iter().any(|s| s == secret)
    }

    pub fn add_credential(&mut self, secret: impl Into<String>) {
        self.auth.config.push(secret.into());
    }

    /// Remove every occurrence of `secret`. Returns whether anything was removed.
    pub fn remove_credential(&mut self, secret: &str) -> bool {
        let before = self.auth.config.len();
        self.auth.config.retain(|s| s != secret);
        self.auth.config.len() != before
    }
}
