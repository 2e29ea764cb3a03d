use crate::error::ValidationError;

/// A social network a profile can link to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SocialProvider {
    /// Key stored under `links/social`.
    pub key: &'static str,
    /// Display title.
    pub title: &'static str,
    /// Prefix prepended to the stored handle to build the public URL.
    pub prefix: &'static str,
}

const PROVIDERS: &[SocialProvider] = &[
    SocialProvider { key: "email", title: "Email", prefix: "mailto:" },
    SocialProvider { key: "facebook", title: "Facebook", prefix: "https://facebook.com/" },
    SocialProvider { key: "github", title: "GitHub", prefix: "https://github.com/" },
    SocialProvider { key: "instagram", title: "Instagram", prefix: "https://instagram.com/" },
    SocialProvider { key: "linkedin", title: "LinkedIn", prefix: "https://linkedin.com/in/" },
    SocialProvider { key: "tiktok", title: "TikTok", prefix: "https://tiktok.com/@" },
    SocialProvider { key: "twitter", title: "Twitter", prefix: "https://twitter.com/" },
    SocialProvider { key: "youtube", title: "YouTube", prefix: "https://youtube.com/" },
];

impl SocialProvider {
    /// Every supported provider, ordered by key.
    pub fn all() -> &'static [SocialProvider] {
        PROVIDERS
    }

    pub fn find(key: &str) -> Option<&'static SocialProvider> {
        PROVIDERS.iter().find(|p| p.key == key)
    }

    /// Like [`SocialProvider::find`], but an unknown key is a validation error.
    pub fn require(key: &str) -> Result<&'static SocialProvider, ValidationError> {
        Self::find(key).ok_or_else(|| ValidationError::UnknownSocialProvider(key.to_string()))
    }

    /// Public URL for a stored handle.
    pub fn url_for(&self, handle: &str) -> String {
        format!("{}{}", self.prefix, handle)
    }
}
