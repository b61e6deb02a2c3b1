use serde::{Deserialize, Serialize};

/// An unconfirmed vendor lead produced by the discovery step. Distinct
/// from a persisted vendor row; lives only for one workflow invocation.
///
/// Deserialization is tolerant of the loose field names discovery
/// responses use ("link"/"url" for the website, "phone_number" for phone).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorCandidate {
    pub name: String,
    #[serde(default, alias = "link", alias = "url")]
    pub website: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "phone_number")]
    pub phone: Option<String>,
}

impl VendorCandidate {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            website: None,
            email: None,
            phone: None,
        }
    }
}
