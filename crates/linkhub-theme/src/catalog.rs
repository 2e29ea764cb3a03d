//! Theme and button preset catalogs.
//!
//! The built-in catalog ships with the crate. Deployments can replace or
//! extend it with a TOML file:
//!
//! ```toml
//! [themes.Lagoon.background]
//! coverType = "solid"
//! color = "#0e7490"
//! textColor = "#ffffff"
//!
//! [themes.Lagoon.link]
//! backgroundColor = "#ffffff"
//! textColor = "#0e7490"
//! borderColor = "#ffffff"
//! roundCorners = "full"
//! onHover = { backgroundColor = "#0e7490", textColor = "#ffffff" }
//!
//! [[buttons]]
//! id = "fill-pill"
//! row = "fill"
//! rounding = "full"
//! filled = true
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use linkhub_types::DEFAULT_BASE_THEME;

use crate::error::{Result, ThemeError};
use crate::model::{
    Background, ButtonPreset, ButtonRow, CoverType, HoverStyle, LinkStyle, Rounding, Shadow,
    Theme, TRANSPARENT,
};

/// Named base themes plus the button presets that can be layered on them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeCatalog {
    #[serde(default)]
    pub themes: BTreeMap<String, Theme>,
    #[serde(default)]
    pub buttons: Vec<ButtonPreset>,
}

impl ThemeCatalog {
    /// The catalog that ships with LinkHub.
    pub fn builtin() -> Self {
        let themes = BTreeMap::from([
            (DEFAULT_BASE_THEME.to_string(), Self::mint()),
            (
                "Ocean".to_string(),
                Theme {
                    background: gradient(
                        "#0ea5e9",
                        "linear-gradient(180deg, #0ea5e9 0%, #1e3a8a 100%)",
                        "#ffffff",
                    ),
                    link: link(TRANSPARENT, "#ffffff", "#ffffff", Rounding::Full, ("#ffffff", "#1e3a8a")),
                },
            ),
            (
                "Sunset".to_string(),
                Theme {
                    background: gradient(
                        "#f97316",
                        "linear-gradient(180deg, #fb923c 0%, #db2777 100%)",
                        "#ffffff",
                    ),
                    link: link("#ffffff", "#db2777", "#ffffff", Rounding::Full, ("#db2777", "#ffffff")),
                },
            ),
            (
                "Midnight".to_string(),
                Theme {
                    background: solid("#111827", "#f9fafb"),
                    link: LinkStyle {
                        shadow: Some(shadow("4px 4px 0")),
                        ..link("#1f2937", "#f9fafb", "#374151", Rounding::None, ("#f9fafb", "#111827"))
                    },
                },
            ),
            (
                "Paper".to_string(),
                Theme {
                    background: solid("#ffffff", "#111827"),
                    link: link(TRANSPARENT, "#111827", "#111827", Rounding::None, ("#111827", "#ffffff")),
                },
            ),
            (
                "Forest".to_string(),
                Theme {
                    background: Background {
                        cover_type: CoverType::Image,
                        color: "#14532d".to_string(),
                        gradient: None,
                        image: Some("https://images.linkhub.test/forest.jpg".to_string()),
                        text_color: "#ffffff".to_string(),
                    },
                    link: link("#14532d", "#ffffff", "#14532d", Rounding::Md, ("#ffffff", "#14532d")),
                },
            ),
        ]);

        let mut buttons = Vec::new();
        for row in ButtonRow::ALL {
            let (filled, shadow_at) = match row {
                ButtonRow::Fill => (true, None),
                ButtonRow::Outline => (false, None),
                ButtonRow::HardShadow => (false, Some("4px 4px 0")),
                ButtonRow::SoftShadow => (false, Some("0 4px 12px")),
            };
            for (suffix, rounding) in [
                ("square", Rounding::None),
                ("rounded", Rounding::Md),
                ("pill", Rounding::Full),
            ] {
                buttons.push(ButtonPreset {
                    id: format!("{}-{suffix}", row_key(row)),
                    row,
                    rounding,
                    filled,
                    shadow: shadow_at.map(shadow),
                });
            }
        }

        Self { themes, buttons }
    }

    /// The default base theme.
    pub fn mint() -> Theme {
        Theme {
            background: solid("#d1fae5", "#064e3b"),
            link: link("#10b981", "#ffffff", "#10b981", Rounding::Md, ("#ffffff", "#047857")),
        }
    }

    /// Parse a catalog from TOML and check it for duplicate button ids.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let catalog: Self = toml::from_str(raw)?;
        catalog.check()?;
        Ok(catalog)
    }

    /// Load a catalog from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ThemeError::Parse(format!("{}: {e}", path.display())))?;
        let catalog = Self::from_toml_str(&raw)?;
        debug!(
            path = %path.display(),
            themes = catalog.themes.len(),
            buttons = catalog.buttons.len(),
            "loaded theme catalog"
        );
        Ok(catalog)
    }

    /// Add every theme and button of `other`, replacing entries with the
    /// same name or id.
    pub fn merge(&mut self, other: ThemeCatalog) {
        self.themes.extend(other.themes);
        for preset in other.buttons {
            match self.buttons.iter_mut().find(|b| b.id == preset.id) {
                Some(existing) => *existing = preset,
                None => self.buttons.push(preset),
            }
        }
    }

    pub fn theme(&self, name: &str) -> Option<&Theme> {
        self.themes.get(name)
    }

    pub fn button(&self, id: &str) -> Option<&ButtonPreset> {
        self.buttons.iter().find(|b| b.id == id)
    }

    pub fn theme_names(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    /// Button presets grouped by row, in editor order. Empty rows are
    /// omitted.
    pub fn button_rows(&self) -> Vec<(ButtonRow, Vec<&ButtonPreset>)> {
        ButtonRow::ALL
            .into_iter()
            .map(|row| (row, self.buttons.iter().filter(|b| b.row == row).collect::<Vec<_>>()))
            .filter(|(_, presets)| !presets.is_empty())
            .collect()
    }

    fn check(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for preset in &self.buttons {
            if !seen.insert(preset.id.as_str()) {
                return Err(ThemeError::DuplicateButton(preset.id.clone()));
            }
        }
        Ok(())
    }
}

fn row_key(row: ButtonRow) -> &'static str {
    match row {
        ButtonRow::Fill => "fill",
        ButtonRow::Outline => "outline",
        ButtonRow::HardShadow => "hard-shadow",
        ButtonRow::SoftShadow => "soft-shadow",
    }
}

fn solid(color: &str, text_color: &str) -> Background {
    Background {
        cover_type: CoverType::Solid,
        color: color.to_string(),
        gradient: None,
        image: None,
        text_color: text_color.to_string(),
    }
}

fn gradient(color: &str, css: &str, text_color: &str) -> Background {
    Background {
        cover_type: CoverType::Gradient,
        gradient: Some(css.to_string()),
        ..solid(color, text_color)
    }
}

fn shadow(position: &str) -> Shadow {
    Shadow {
        position: position.to_string(),
    }
}

fn link(
    background_color: &str,
    text_color: &str,
    border_color: &str,
    round_corners: Rounding,
    (hover_background, hover_text): (&str, &str),
) -> LinkStyle {
    LinkStyle {
        background_color: background_color.to_string(),
        text_color: text_color.to_string(),
        border_color: border_color.to_string(),
        round_corners,
        shadow: None,
        on_hover: HoverStyle {
            background_color: hover_background.to_string(),
            text_color: hover_text.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_default_theme_and_unique_buttons() {
        let catalog = ThemeCatalog::builtin();
        assert!(catalog.theme(DEFAULT_BASE_THEME).is_some());
        assert!(catalog.check().is_ok());
        assert_eq!(catalog.buttons.len(), 12);
    }

    #[test]
    fn rows_follow_editor_order() {
        let catalog = ThemeCatalog::builtin();
        let rows: Vec<_> = catalog.button_rows().into_iter().map(|(r, _)| r.title()).collect();
        assert_eq!(rows, vec!["Fill", "Outline", "Hard shadow", "Soft shadow"]);
    }

    #[test]
    fn parses_toml_catalog() {
        let raw = r##"
            [themes.Lagoon.background]
            coverType = "solid"
            color = "#0e7490"
            textColor = "#ffffff"

            [themes.Lagoon.link]
            backgroundColor = "#ffffff"
            textColor = "#0e7490"
            borderColor = "#ffffff"
            roundCorners = "full"
            onHover = { backgroundColor = "#0e7490", textColor = "#ffffff" }

            [[buttons]]
            id = "fill-pill"
            row = "fill"
            rounding = "full"
            filled = true
        "##;
        let catalog = ThemeCatalog::from_toml_str(raw).unwrap();
        let lagoon = catalog.theme("Lagoon").unwrap();
        assert_eq!(lagoon.link.round_corners, Rounding::Full);
        assert_eq!(catalog.button("fill-pill").unwrap().row, ButtonRow::Fill);
    }

    #[test]
    fn duplicate_button_ids_are_rejected() {
        let raw = r#"
            [[buttons]]
            id = "x"
            row = "fill"

            [[buttons]]
            id = "x"
            row = "outline"
        "#;
        assert_eq!(
            ThemeCatalog::from_toml_str(raw).unwrap_err(),
            ThemeError::DuplicateButton("x".into())
        );
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        assert!(matches!(
            ThemeCatalog::from_toml_str("themes = 3").unwrap_err(),
            ThemeError::Parse(_)
        ));
    }

    #[test]
    fn merge_replaces_and_extends() {
        let mut catalog = ThemeCatalog::builtin();
        let before = catalog.buttons.len();
        catalog.merge(ThemeCatalog {
            themes: BTreeMap::new(),
            buttons: vec![
                ButtonPreset {
                    id: "fill-pill".into(),
                    row: ButtonRow::Fill,
                    rounding: Rounding::None,
                    filled: true,
                    shadow: None,
                },
                ButtonPreset {
                    id: "ghost".into(),
                    row: ButtonRow::Outline,
                    rounding: Rounding::Md,
                    filled: false,
                    shadow: None,
                },
            ],
        });
        assert_eq!(catalog.buttons.len(), before + 1);
        assert_eq!(catalog.button("fill-pill").unwrap().rounding, Rounding::None);
        assert!(catalog.button("ghost").is_some());
    }
}
