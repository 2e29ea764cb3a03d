use tracing::warn;

use linkhub_types::{validation::non_blank, ThemeSettings};

use crate::catalog::ThemeCatalog;
use crate::error::{Result, ThemeError};
use crate::model::{ButtonPreset, LinkStyle, ResolvedTheme, Theme, TRANSPARENT};

/// Resolves a profile's theme settings against a catalog.
///
/// Resolution is pure: the same settings always produce the same
/// [`ResolvedTheme`], and nothing is cached between calls.
#[derive(Clone, Debug)]
pub struct ThemeResolver {
    catalog: ThemeCatalog,
    default_theme: String,
    fallback: Theme,
}

impl ThemeResolver {
    /// Build a resolver. `default_theme` is used whenever a profile names a
    /// theme the catalog does not contain, so it must exist.
    pub fn new(catalog: ThemeCatalog, default_theme: impl Into<String>) -> Result<Self> {
        let default_theme = default_theme.into();
        let fallback = catalog
            .theme(&default_theme)
            .cloned()
            .ok_or_else(|| ThemeError::UnknownTheme(default_theme.clone()))?;
        Ok(Self {
            catalog,
            default_theme,
            fallback,
        })
    }

    /// The built-in catalog with its default theme.
    pub fn builtin() -> Self {
        Self {
            catalog: ThemeCatalog::builtin(),
            default_theme: linkhub_types::DEFAULT_BASE_THEME.to_string(),
            fallback: ThemeCatalog::mint(),
        }
    }

    pub fn catalog(&self) -> &ThemeCatalog {
        &self.catalog
    }

    pub fn default_theme(&self) -> &str {
        &self.default_theme
    }

    /// Check that a theme name exists.
    pub fn require_theme(&self, name: &str) -> Result<&Theme> {
        self.catalog
            .theme(name)
            .ok_or_else(|| ThemeError::UnknownTheme(name.to_string()))
    }

    /// Check that a button preset exists.
    pub fn require_button(&self, id: &str) -> Result<&ButtonPreset> {
        self.catalog
            .button(id)
            .ok_or_else(|| ThemeError::UnknownButton(id.to_string()))
    }

    /// Resolve, falling back on unknown names.
    ///
    /// An unknown base theme resolves as the default theme; an unknown
    /// button id leaves the base theme's own button shape. Both are logged.
    pub fn resolve(&self, settings: &ThemeSettings) -> ResolvedTheme {
        let (name, theme) = match self.catalog.theme(&settings.base_theme) {
            Some(theme) => (settings.base_theme.as_str(), theme),
            None => {
                warn!(
                    theme = %settings.base_theme,
                    fallback = %self.default_theme,
                    "unknown base theme, using default"
                );
                (self.default_theme.as_str(), &self.fallback)
            }
        };

        let preset = settings
            .customizations
            .button_id
            .as_deref()
            .and_then(|id| match self.catalog.button(id) {
                Some(preset) => Some(preset),
                None => {
                    warn!(button = %id, theme = %name, "unknown button preset, keeping theme button");
                    None
                }
            });

        overlay(name, theme, settings, preset)
    }

    /// Resolve, failing on unknown theme or button names.
    pub fn try_resolve(&self, settings: &ThemeSettings) -> Result<ResolvedTheme> {
        let theme = self.require_theme(&settings.base_theme)?;
        let preset = match settings.customizations.button_id.as_deref() {
            Some(id) => Some(self.require_button(id)?),
            None => None,
        };
        Ok(overlay(&settings.base_theme, theme, settings, preset))
    }
}

impl Default for ThemeResolver {
    fn default() -> Self {
        Self::builtin()
    }
}

fn overlay(
    name: &str,
    theme: &Theme,
    settings: &ThemeSettings,
    preset: Option<&ButtonPreset>,
) -> ResolvedTheme {
    let custom = &settings.customizations;
    let mut background = theme.background.clone();
    if let Some(color) = custom.background_color.as_deref().and_then(non_blank) {
        background.color = color.to_string();
    }
    if let Some(color) = custom.text_color.as_deref().and_then(non_blank) {
        background.text_color = color.to_string();
    }

    let mut link = theme.link.clone();
    if let Some(preset) = preset {
        apply_button(&mut link, preset);
    }

    ResolvedTheme {
        name: name.to_string(),
        background,
        link,
        button_id: preset.map(|p| p.id.clone()),
    }
}

/// Reshape a link style with a button preset. Colours come from the base
/// style: a filled preset on a transparent button takes the border colour as
/// fill, an outline preset on a borderless button takes the fill colour as
/// border.
pub fn apply_button(link: &mut LinkStyle, preset: &ButtonPreset) {
    link.round_corners = preset.rounding;
    link.shadow = preset.shadow.clone();
    if preset.filled {
        if link.background_color == TRANSPARENT {
            link.background_color = link.border_color.clone();
        }
    } else {
        if link.border_color == TRANSPARENT {
            link.border_color = link.background_color.clone();
        }
        link.background_color = TRANSPARENT.to_string();
    }
}
