//! Session-stored user types.

use serde::{Deserialize, Serialize};

/// The cached authenticated-user payload (`dreamx_user`).
///
/// Field names match the browser storefront's persisted record. Everything
/// is defaulted because the record accreted fields over time: a login
/// writes `firstName`/`email`/`token`, profile editing fills in the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Account email address.
    #[serde(default)]
    pub email: String,
    /// Display name.
    #[serde(default, rename = "firstName")]
    pub first_name: String,
    /// Last name.
    #[serde(default, rename = "lastName")]
    pub last_name: String,
    /// Profile bio.
    #[serde(default)]
    pub bio: String,
    /// Whether this is a brand account.
    #[serde(default, rename = "isBrand")]
    pub is_brand: bool,
    /// Brand hero image reference. Only brand accounts carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
    /// Auth token embedded in the record. Checkout falls back to this when
    /// the standalone `token` key is missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl SessionRecord {
    /// Minimal record written at login.
    #[must_use]
    pub fn for_login(first_name: &str, email: &str, token: &str) -> Self {
        Self {
            email: email.to_owned(),
            first_name: first_name.to_owned(),
            token: Some(token.to_owned()),
            ..Self::default()
        }
    }
}

/// Profile fields a user can edit.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    /// Ignored for non-brand accounts.
    pub hero_image: Option<String>,
}
