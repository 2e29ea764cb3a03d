//! Profile creation and lookup.

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use linkhub_store::DocumentStore;
use linkhub_types::validation::{non_blank, validate_display_name, validate_url, validate_username};
use linkhub_types::{DocPath, Patch, Profile, ProfileId, ThemeSettings};

use crate::error::{DashboardError, DashboardResult};

/// Collection holding every profile document.
pub const PROFILES: &str = "profile";

/// Path of one profile document.
pub fn profile_path(id: &ProfileId) -> DashboardResult<DocPath> {
    Ok(DocPath::parse(PROFILES)?.child(id)?)
}

/// Details for a first sign-in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewProfile {
    pub username: String,
    /// Defaults to the username.
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub sign_in_provider: Option<String>,
}

impl NewProfile {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }
}

/// Write the initial document for `id`: username, display name, the default
/// theme and a creation timestamp. Links start empty.
///
/// Fails if the profile already exists or the username is in use.
pub async fn create_profile<S>(
    store: &S,
    id: &ProfileId,
    new: NewProfile,
    default_theme: &str,
) -> DashboardResult<Profile>
where
    S: DocumentStore + ?Sized,
{
    let username = new.username.trim().to_string();
    validate_username(&username)?;
    let display_name = new
        .display_name
        .as_deref()
        .and_then(non_blank)
        .unwrap_or(&username)
        .to_string();
    validate_display_name(&display_name)?;
    let avatar = new.avatar.as_deref().and_then(non_blank).map(str::to_string);
    if let Some(avatar) = &avatar {
        validate_url(avatar)?;
    }

    let root = profile_path(id)?;
    if store
        .read(&root)
        .await
        .map_err(DashboardError::RemoteRead)?
        .is_some()
    {
        return Err(DashboardError::ProfileExists(id.clone()));
    }
    if find_by_username(store, &username).await?.is_some() {
        return Err(DashboardError::UsernameTaken(username));
    }

    let profile = Profile {
        avatar,
        username: Some(username),
        display_name: Some(display_name),
        sign_in_provider: new.sign_in_provider.as_deref().and_then(non_blank).map(str::to_string),
        created_on: Some(Utc::now().timestamp_millis()),
        theme: ThemeSettings::named(default_theme),
        ..Default::default()
    };

    let mut patch = Patch::new();
    if let Value::Object(fields) = profile.to_value()? {
        for (key, value) in fields {
            patch.set(DocPath::parse(&key)?, value);
        }
    }
    store
        .patch(&root, patch)
        .await
        .map_err(DashboardError::RemoteWrite)?;

    info!(profile = %id, username = ?profile.username, "profile created");
    Ok(profile)
}

/// Find the profile whose username matches, ignoring ASCII case.
///
/// Documents that fail to decode are skipped unless their raw `username`
/// matches, which is reported as [`DashboardError::Malformed`] so the name is
/// never handed out twice.
pub async fn find_by_username<S>(
    store: &S,
    username: &str,
) -> DashboardResult<Option<(ProfileId, Profile)>>
where
    S: DocumentStore + ?Sized,
{
    let all = store
        .read(&DocPath::parse(PROFILES)?)
        .await
        .map_err(DashboardError::RemoteRead)?;
    let Some(Value::Object(all)) = all else {
        return Ok(None);
    };

    for (key, value) in all {
        let raw_match = value
            .get("username")
            .and_then(Value::as_str)
            .is_some_and(|u| u.eq_ignore_ascii_case(username));
        let profile = match Profile::from_value(value) {
            Ok(profile) => profile,
            Err(e) if raw_match => {
                return Err(DashboardError::Malformed {
                    path: format!("{PROFILES}/{key}"),
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                warn!(profile = %key, error = %e, "skipping malformed profile");
                continue;
            }
        };
        let matches = profile
            .username
            .as_deref()
            .is_some_and(|u| u.eq_ignore_ascii_case(username));
        if matches {
            return Ok(Some((ProfileId::new(key)?, profile)));
        }
    }
    Ok(None)
}
