use serde::Serialize;

use linkhub_links::{ordered, OrderedLink, Visibility};
use linkhub_theme::{ResolvedTheme, ThemeResolver};
use linkhub_types::{Profile, SocialProvider};

/// A connected social account, ready to render.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SocialLinkView {
    pub provider: String,
    pub title: String,
    pub handle: String,
    pub url: String,
}

/// Everything the public page renders for one profile. Read-only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    /// Decoded bio text.
    pub bio: Option<String>,
    pub theme: ResolvedTheme,
    /// Visible custom links in display order.
    pub links: Vec<OrderedLink>,
    pub social: Vec<SocialLinkView>,
}

impl PublicProfile {
    pub fn build(profile: &Profile, resolver: &ThemeResolver) -> Self {
        // Providers missing from the catalog are skipped: there is no URL
        // to build for them.
        let social = profile
            .links
            .social
            .iter()
            .filter_map(|(key, handle)| {
                let provider = SocialProvider::find(key)?;
                Some(SocialLinkView {
                    provider: provider.key.to_string(),
                    title: provider.title.to_string(),
                    handle: handle.clone(),
                    url: provider.url_for(handle),
                })
            })
            .collect();

        Self {
            username: profile.username.clone(),
            display_name: profile.display_name.clone(),
            avatar: profile.avatar.clone(),
            bio: profile.bio_text(),
            theme: resolver.resolve(&profile.theme),
            links: ordered(&profile.links.custom, Visibility::Public),
            social,
        }
    }
}
