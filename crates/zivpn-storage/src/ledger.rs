//! Plain-text credential ledger: one `secret | YYYY-MM-DD` record per line.

use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
const SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub secret: String,
    /// Expiry as stored. Kept verbatim so unparseable dates survive rewrites.
    pub expiry: String,
}

impl LedgerEntry {
    pub fn new(secret: impl Into<String>, expiry: NaiveDate) -> Self {
        Self {
            secret: secret.into(),
            expiry: format_date(expiry),
        }
    }

    /// Parse one ledger line. Accepts both `a | b` and `a|b`.
    ///
    /// Returns `None` for blank lines, lines without a separator and lines
    /// with an empty secret.
    pub fn parse(line: &str) -> Option<Self> {
        let (secret, rest) = line.split_once(SEPARATOR)?;
        let secret = secret.trim();
        if secret.is_empty() {
            return None;
        }
        let expiry = rest.split(SEPARATOR).next().unwrap_or_default().trim();
        Some(Self {
            secret: secret.to_string(),
            expiry: expiry.to_string(),
        })
    }

    pub fn to_line(&self) -> String {
        format!("{} {} {}", self.secret, SEPARATOR, self.expiry)
    }

    pub fn expiry_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.expiry, DATE_FORMAT).ok()
    }

    /// ISO dates order lexicographically, so the stored string is compared
    /// directly against today's.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.expiry.as_str() < format_date(today).as_str()
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_ledger(contents: &str) -> Vec<LedgerEntry> {
    contents.lines().filter_map(LedgerEntry::parse).collect()
}

pub fn render_ledger(entries: &[LedgerEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&entry.to_line());
        out.push('\n');
    }
    out
}
