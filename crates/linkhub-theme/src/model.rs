//! Theme data: what a base theme defines and what resolution produces.

use serde::{Deserialize, Serialize};

/// Colour value used for "no colour".
pub const TRANSPARENT: &str = "transparent";

/// How the page background is painted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverType {
    #[default]
    Solid,
    Gradient,
    Image,
}

/// Page background of a theme.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    #[serde(default)]
    pub cover_type: CoverType,
    pub color: String,
    /// CSS gradient, used when `cover_type` is `Gradient`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<String>,
    /// Image URL, used when `cover_type` is `Image`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub text_color: String,
}

/// Corner rounding of link buttons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    None,
    #[default]
    Md,
    Full,
}

/// Drop shadow under a link button, as a CSS offset such as `"4px 4px 0"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub position: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverStyle {
    pub background_color: String,
    pub text_color: String,
}

/// Style of the custom link buttons.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkStyle {
    pub background_color: String,
    pub text_color: String,
    pub border_color: String,
    #[serde(default)]
    pub round_corners: Rounding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    pub on_hover: HoverStyle,
}

/// A named base theme.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub background: Background,
    pub link: LinkStyle,
}

/// Row a button preset is listed under in the appearance editor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ButtonRow {
    Fill,
    Outline,
    HardShadow,
    SoftShadow,
}

impl ButtonRow {
    pub const ALL: [ButtonRow; 4] = [
        ButtonRow::Fill,
        ButtonRow::Outline,
        ButtonRow::HardShadow,
        ButtonRow::SoftShadow,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ButtonRow::Fill => "Fill",
            ButtonRow::Outline => "Outline",
            ButtonRow::HardShadow => "Hard shadow",
            ButtonRow::SoftShadow => "Soft shadow",
        }
    }
}

/// A button shape preset selectable through `customizations.buttonId`.
///
/// A preset only changes the button's shape: rounding, whether it is
/// filled, and its shadow. Colours keep coming from the base theme.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonPreset {
    pub id: String,
    pub row: ButtonRow,
    #[serde(default)]
    pub rounding: Rounding,
    #[serde(default)]
    pub filled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
}

/// A base theme with a profile's customizations applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTheme {
    /// Name of the base theme actually used.
    pub name: String,
    pub background: Background,
    pub link: LinkStyle,
    /// Button preset actually applied, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_id: Option<String>,
}
