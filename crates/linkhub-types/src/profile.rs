//! The typed profile document.
//!
//! A [`Profile`] is the full snapshot of `/profile/{profileId}`. Every map is
//! a `BTreeMap`, so two snapshots compare equal whenever they hold the same
//! data regardless of the key order the store delivered them in.
//!
//! The store drops empty subtrees, so every collection defaults to empty
//! when absent. An explicit `null` reads the same as an absent key.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Result, ValidationError};
use crate::ids::LinkId;
use crate::validation::{validate_title, validate_url};

/// Base theme applied to newly created profiles.
pub const DEFAULT_BASE_THEME: &str = "Mint";

/// Snapshot of one user's profile document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Public address. Immutable after creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// JSON-encoded bio text; see [`encode_bio`] and [`decode_bio`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_in_provider: Option<String>,
    /// Creation time in milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub theme: ThemeSettings,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Links,
    /// Read-only analytics written by an external collaborator. Carried
    /// through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<Value>,
}

impl Profile {
    /// Decode a raw store value into a profile.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Decoded bio text, if any.
    pub fn bio_text(&self) -> Option<String> {
        self.bio.as_deref().map(decode_bio)
    }

    pub fn custom_link(&self, id: &LinkId) -> Option<&CustomLink> {
        self.links.custom.get(id)
    }
}

/// Base theme selection plus per-profile overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSettings {
    #[serde(default = "default_base_theme", deserialize_with = "base_theme_or_default")]
    pub base_theme: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub customizations: Customizations,
}

fn default_base_theme() -> String {
    DEFAULT_BASE_THEME.to_string()
}

fn base_theme_or_default<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(de)?.unwrap_or_else(default_base_theme))
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            base_theme: default_base_theme(),
            customizations: Customizations::default(),
        }
    }
}

impl ThemeSettings {
    pub fn named(base_theme: impl Into<String>) -> Self {
        Self {
            base_theme: base_theme.into(),
            customizations: Customizations::default(),
        }
    }
}

/// Overrides layered on top of the base theme.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customizations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_id: Option<String>,
}

impl Customizations {
    pub fn is_empty(&self) -> bool {
        self.background_color.is_none() && self.text_color.is_none() && self.button_id.is_none()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    /// Provider key to handle. Absent or `null` means not connected.
    #[serde(default, deserialize_with = "present_entries")]
    pub social: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "present_entries")]
    pub custom: BTreeMap<LinkId, CustomLink>,
}

/// Decode a raw `links/custom` collection, skipping `null` entries.
pub fn decode_custom_links(value: Value) -> Result<BTreeMap<LinkId, CustomLink>> {
    Ok(present_entries(value)?)
}

fn null_as_default<'de, D, T>(de: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// A map whose `null` values stand for deleted entries.
fn present_entries<'de, D, K, V>(de: D) -> std::result::Result<BTreeMap<K, V>, D::Error>
where
    D: Deserializer<'de>,
    K: Ord + Deserialize<'de>,
    V: Deserialize<'de>,
{
    let raw = Option::<BTreeMap<K, Option<V>>>::deserialize(de)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| Some((key, value?)))
        .collect())
}

/// A stored custom link. Its id is the key it is stored under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomLink {
    pub title: String,
    pub url: String,
    pub show: bool,
    pub position: u32,
}

impl CustomLink {
    pub fn fields(&self) -> LinkFields {
        LinkFields {
            title: self.title.clone(),
            url: self.url.clone(),
            show: self.show,
        }
    }
}

/// The user-editable part of a custom link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkFields {
    pub title: String,
    pub url: String,
    pub show: bool,
}

impl LinkFields {
    pub fn new(title: impl Into<String>, url: impl Into<String>, show: bool) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            show,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        validate_title(&self.title)?;
        validate_url(&self.url)?;
        Ok(())
    }

    pub fn at_position(self, position: u32) -> CustomLink {
        CustomLink {
            title: self.title,
            url: self.url,
            show: self.show,
            position,
        }
    }
}

/// Encode bio text the way it is stored: as a JSON string literal.
pub fn encode_bio(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

/// Decode a stored bio. Values that are not a JSON string literal are
/// returned verbatim.
pub fn decode_bio(stored: &str) -> String {
    serde_json::from_str::<String>(stored).unwrap_or_else(|_| stored.to_string())
}
