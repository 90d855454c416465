//! Scanner result shapes.
//!
//! The detection model itself lives outside this crate; these types only
//! describe what it hands back.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Structured contact payload from a contact-info code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub organization: Option<String>,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub emails: Vec<String>,
}

impl Display for ContactInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts = self
            .name
            .iter()
            .chain(self.organization.iter())
            .chain(self.phones.iter())
            .chain(self.emails.iter())
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>();
        write!(f, "{}", parts.join(", "))
    }
}

/// One detected code tagged with its value type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "value_type", rename_all = "snake_case")]
pub enum ScannedCode {
    Url { url: Option<String> },
    ContactInfo { contact: Option<ContactInfo> },
    Other { raw_value: Option<String> },
}

/// Two display strings derived from a scanned code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanDisplay {
    pub type_label: String,
    pub content: String,
}

impl ScanDisplay {
    pub fn new(type_label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            type_label: type_label.into(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ContactInfo, ScannedCode};

    #[test]
    fn scanned_code_is_tagged_by_value_type() {
        let json = serde_json::to_value(ScannedCode::Url {
            url: Some("https://example.com".to_string()),
        })
        .unwrap();
        assert_eq!(json["value_type"], "url");
        assert_eq!(json["url"], "https://example.com");

        let decoded: ScannedCode = serde_json::from_value(serde_json::json!({
            "value_type": "contact_info",
            "contact": { "name": "Ada", "organization": null }
        }))
        .unwrap();
        assert_eq!(
            decoded,
            ScannedCode::ContactInfo {
                contact: Some(ContactInfo {
                    name: Some("Ada".to_string()),
                    ..ContactInfo::default()
                })
            }
        );
    }

    #[test]
    fn empty_contact_renders_empty_string() {
        assert_eq!(ContactInfo::default().to_string(), "");
    }
}
