use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "linkhub",
    about = "LinkHub — edit a link-in-bio profile stored in a JSON document",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// JSON document holding every profile
    #[arg(long, global = true, default_value = "linkhub.json")]
    pub doc: PathBuf,

    /// Profile to operate on
    #[arg(short, long, global = true, default_value = "local")]
    pub profile: String,

    /// Dashboard configuration (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Extra theme catalog (TOML), merged over the built-in one
    #[arg(long, global = true)]
    pub themes: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the profile document
    Init(InitArgs),
    /// Show the public view of a profile
    Show(ShowArgs),
    /// List custom links in display order
    Links(LinksArgs),
    /// Append a custom link
    AddLink(AddLinkArgs),
    /// Edit a custom link's title, url or visibility
    EditLink(EditLinkArgs),
    /// Remove a custom link
    RemoveLink(RemoveLinkArgs),
    /// Move a custom link one step up or down
    Move(MoveArgs),
    /// Renumber link positions to close gaps
    Normalize,
    /// Switch base theme (clears customizations)
    Theme(ThemeArgs),
    /// Select a button preset, or clear it
    Button(OptionalValue),
    /// Override the background colour, or clear it
    Bg(OptionalValue),
    /// Override the text colour, or clear it
    TextColor(OptionalValue),
    /// Set or clear a social handle
    Social(SocialArgs),
    /// Set or clear the bio
    Bio(OptionalValue),
    /// Set the display name
    Name(NameArgs),
    /// Set or remove the avatar URL
    Avatar(OptionalValue),
    /// List available themes and button presets
    Themes,
}

#[derive(Args)]
pub struct InitArgs {
    #[arg(short, long)]
    pub username: String,
    #[arg(long)]
    pub display_name: Option<String>,
    #[arg(long)]
    pub avatar: Option<String>,
    #[arg(long)]
    pub provider: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Look the profile up by username instead of id
    #[arg(short, long)]
    pub username: Option<String>,
}

#[derive(Args)]
pub struct LinksArgs {
    /// Only links visible on the public page
    #[arg(long)]
    pub public: bool,
}

#[derive(Args)]
pub struct AddLinkArgs {
    pub title: String,
    pub url: String,
    #[arg(long)]
    pub hidden: bool,
}

#[derive(Args)]
pub struct EditLinkArgs {
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long, conflicts_with = "hide")]
    pub show: bool,
    #[arg(long)]
    pub hide: bool,
}

#[derive(Args)]
pub struct RemoveLinkArgs {
    pub id: String,
}

#[derive(Args)]
pub struct MoveArgs {
    pub id: String,
    pub direction: MoveDirection,
}

#[derive(Args)]
pub struct ThemeArgs {
    pub name: String,
}

/// A value that clears the setting when omitted.
#[derive(Args)]
pub struct OptionalValue {
    pub value: Option<String>,
}

#[derive(Args)]
pub struct SocialArgs {
    pub provider: String,
    /// Omit to disconnect the provider
    pub handle: Option<String>,
}

#[derive(Args)]
pub struct NameArgs {
    pub name: String,
}
