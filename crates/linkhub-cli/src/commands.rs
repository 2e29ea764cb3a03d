use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context as _};
use colored::Colorize;
use serde_json::json;
use tracing::debug;

use linkhub_dashboard::{
    create_profile, find_by_username, profile_path, Dashboard, DashboardConfig, Mutation,
    NewProfile, PublicProfile, Receipt,
};
use linkhub_links::{ordered, Direction, OrderedLink, Visibility};
use linkhub_store::{DocumentStore, InMemoryDocumentStore};
use linkhub_types::{LinkFields, LinkId, Profile, ProfileId};

use crate::cli::*;

/// Everything a command needs: the loaded document and a dashboard bound to
/// the selected profile.
struct Workspace {
    doc: PathBuf,
    format: OutputFormat,
    store: Arc<InMemoryDocumentStore>,
    dashboard: Dashboard<InMemoryDocumentStore>,
}

impl Workspace {
    fn open(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => DashboardConfig::load(path)?,
            None => DashboardConfig::default(),
        };
        if let Some(themes) = &cli.themes {
            config.theme_catalog = Some(themes.clone());
        }

        let store = Arc::new(
            InMemoryDocumentStore::load_json(&cli.doc)
                .with_context(|| format!("loading {}", cli.doc.display()))?,
        );
        let profile = ProfileId::new(cli.profile.clone())?;
        let dashboard = Dashboard::new(Arc::clone(&store), profile, config)?;
        Ok(Self {
            doc: cli.doc.clone(),
            format: cli.format,
            store,
            dashboard,
        })
    }

    fn save(&self) -> anyhow::Result<()> {
        self.store
            .save_json(&self.doc)
            .with_context(|| format!("saving {}", self.doc.display()))?;
        debug!(doc = %self.doc.display(), "document saved");
        Ok(())
    }

    async fn profile(&self) -> anyhow::Result<Profile> {
        let id = self.dashboard.profile_id();
        match self.store.read(&profile_path(id)?).await? {
            Some(value) => Ok(Profile::from_value(value)?),
            None => bail!("profile {id} does not exist; create it with `linkhub init`"),
        }
    }

    fn print_json(&self, value: &impl serde::Serialize) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Report a completed command and persist the document.
    fn finish(&self, receipt: Receipt) -> anyhow::Result<()> {
        self.save()?;
        if self.format == OutputFormat::Json {
            return self.print_json(&receipt);
        }
        let noun = if receipt.paths == 1 { "path" } else { "paths" };
        print!("{} {} ({} {noun})", "✓".green().bold(), receipt.command.bold(), receipt.paths);
        if let Some(id) = &receipt.created {
            print!(" → {}", id.as_str().yellow());
        }
        println!();
        Ok(())
    }
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let ws = Workspace::open(&cli)?;
    let dashboard = &ws.dashboard;
    match cli.command {
        Command::Init(args) => cmd_init(&ws, args).await,
        Command::Show(args) => cmd_show(&ws, args).await,
        Command::Links(args) => cmd_links(&ws, args).await,
        Command::AddLink(args) => {
            let fields = LinkFields::new(args.title, args.url, !args.hidden);
            let receipt = dashboard.apply(Mutation::AddCustomLink(fields)).await?;
            ws.finish(receipt)
        }
        Command::EditLink(args) => cmd_edit_link(&ws, args).await,
        Command::RemoveLink(args) => {
            let receipt = dashboard.remove_custom_link(LinkId::new(args.id)?).await?;
            ws.finish(receipt)
        }
        Command::Move(args) => cmd_move(&ws, args).await,
        Command::Normalize => match dashboard.normalize_links().await? {
            Some(receipt) => ws.finish(receipt),
            None => {
                println!("Positions already contiguous.");
                Ok(())
            }
        },
        Command::Theme(args) => ws.finish(dashboard.update_base_theme(args.name).await?),
        Command::Button(args) => {
            ws.finish(dashboard.update_custom_button(args.value.as_deref()).await?)
        }
        Command::Bg(args) => {
            ws.finish(dashboard.update_background_color(args.value.as_deref()).await?)
        }
        Command::TextColor(args) => {
            ws.finish(dashboard.update_text_color(args.value.as_deref()).await?)
        }
        Command::Social(args) => {
            let handle = args.handle.unwrap_or_default();
            ws.finish(dashboard.update_social_link(&args.provider, &handle).await?)
        }
        Command::Bio(args) => {
            ws.finish(dashboard.update_bio(args.value.as_deref().unwrap_or_default()).await?)
        }
        Command::Name(args) => ws.finish(dashboard.update_display_name(&args.name).await?),
        Command::Avatar(args) => {
            let receipt = match args.value.as_deref() {
                Some(url) => dashboard.set_avatar(url).await?,
                None => dashboard.remove_avatar().await?,
            };
            ws.finish(receipt)
        }
        Command::Themes => cmd_themes(&ws),
    }
}

async fn cmd_init(ws: &Workspace, args: InitArgs) -> anyhow::Result<()> {
    let dashboard = &ws.dashboard;
    let new = NewProfile {
        username: args.username,
        display_name: args.display_name,
        avatar: args.avatar,
        sign_in_provider: args.provider,
    };
    let profile = create_profile(
        &*ws.store,
        dashboard.profile_id(),
        new,
        dashboard.resolver().default_theme(),
    )
    .await?;
    ws.save()?;

    if ws.format == OutputFormat::Json {
        return ws.print_json(&profile);
    }
    println!(
        "{} Created profile {} for {}",
        "✓".green().bold(),
        dashboard.profile_id().as_str().cyan(),
        profile.username.as_deref().unwrap_or_default().bold()
    );
    println!("  Theme: {}", profile.theme.base_theme.yellow());
    println!("  Document: {}", ws.doc.display());
    Ok(())
}

async fn cmd_show(ws: &Workspace, args: ShowArgs) -> anyhow::Result<()> {
    let profile = match args.username {
        Some(username) => match find_by_username(&*ws.store, &username).await? {
            Some((_, profile)) => profile,
            None => bail!("no profile with username {username}"),
        },
        None => ws.profile().await?,
    };
    let view = PublicProfile::build(&profile, ws.dashboard.resolver());
    if ws.format == OutputFormat::Json {
        return ws.print_json(&view);
    }

    let name = view.display_name.as_deref().unwrap_or("(no name)");
    match &view.username {
        Some(username) => println!("{} {}", name.bold(), format!("@{username}").dimmed()),
        None => println!("{}", name.bold()),
    }
    if let Some(bio) = &view.bio {
        println!("  {bio}");
    }
    if let Some(avatar) = &view.avatar {
        println!("  Avatar: {}", avatar.blue());
    }
    match &view.theme.button_id {
        Some(button) => println!("  Theme: {} [{}]", view.theme.name.yellow(), button),
        None => println!("  Theme: {}", view.theme.name.yellow()),
    }
    if view.links.is_empty() {
        println!("  No links.");
    } else {
        println!("  Links:");
        print_links(&view.links);
    }
    if !view.social.is_empty() {
        println!("  Social:");
        for social in &view.social {
            println!("    {:<10} {}", social.title, social.url.blue());
        }
    }
    Ok(())
}

async fn cmd_links(ws: &Workspace, args: LinksArgs) -> anyhow::Result<()> {
    let profile = ws.profile().await?;
    let visibility = if args.public {
        Visibility::Public
    } else {
        Visibility::Editing
    };
    let links = ordered(&profile.links.custom, visibility);
    if ws.format == OutputFormat::Json {
        return ws.print_json(&links);
    }
    if links.is_empty() {
        println!("No links.");
    } else {
        print_links(&links);
    }
    Ok(())
}

fn print_links(links: &[OrderedLink]) {
    for link in links {
        let hidden = if link.show { "" } else { " (hidden)" };
        println!(
            "    {:>2}. {:<20} {}{}  {}",
            link.position,
            link.title.bold(),
            link.url.blue(),
            hidden.dimmed(),
            link.id.as_str().dimmed()
        );
    }
}

async fn cmd_edit_link(ws: &Workspace, args: EditLinkArgs) -> anyhow::Result<()> {
    let id = LinkId::new(args.id)?;
    let profile = ws.profile().await?;
    let Some(link) = profile.custom_link(&id) else {
        bail!("no link with id {id}");
    };

    let mut fields = link.fields();
    if let Some(title) = args.title {
        fields.title = title;
    }
    if let Some(url) = args.url {
        fields.url = url;
    }
    if args.show {
        fields.show = true;
    } else if args.hide {
        fields.show = false;
    }
    let receipt = ws.dashboard.update_custom_link(id, fields).await?;
    ws.finish(receipt)
}

async fn cmd_move(ws: &Workspace, args: MoveArgs) -> anyhow::Result<()> {
    let id = LinkId::new(args.id)?;
    let direction = match args.direction {
        MoveDirection::Up => Direction::Up,
        MoveDirection::Down => Direction::Down,
    };
    match ws.dashboard.move_link(&id, direction).await? {
        Some(receipt) => ws.finish(receipt),
        None => {
            println!("Link {} is already at the {}.", id.as_str().yellow(), match direction {
                Direction::Up => "top",
                Direction::Down => "bottom",
            });
            Ok(())
        }
    }
}

fn cmd_themes(ws: &Workspace) -> anyhow::Result<()> {
    let resolver = ws.dashboard.resolver();
    let catalog = resolver.catalog();
    if ws.format == OutputFormat::Json {
        let rows: Vec<_> = catalog
            .button_rows()
            .into_iter()
            .map(|(row, presets)| {
                json!({
                    "row": row.title(),
                    "buttons": presets.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(),
                })
            })
            .collect();
        let themes: Vec<_> = catalog.theme_names().collect();
        return ws.print_json(&json!({
            "default": resolver.default_theme(),
            "themes": themes,
            "buttons": rows,
        }));
    }

    println!("{}", "Themes".bold());
    for name in catalog.theme_names() {
        if name == resolver.default_theme() {
            println!("  {} {}", name.yellow(), "(default)".dimmed());
        } else {
            println!("  {name}");
        }
    }
    println!("{}", "Buttons".bold());
    for (row, presets) in catalog.button_rows() {
        let ids: Vec<_> = presets.iter().map(|p| p.id.as_str()).collect();
        println!("  {:<12} {}", row.title(), ids.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serde_json::Value;

    async fn run(doc: &std::path::Path, args: &[&str]) -> anyhow::Result<()> {
        let doc = doc.to_str().unwrap();
        let mut argv = vec!["linkhub", "--doc", doc, "-p", "u1"];
        argv.extend_from_slice(args);
        run_command(Cli::try_parse_from(argv).unwrap()).await
    }

    fn read(doc: &std::path::Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(doc).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn init_then_edit_through_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("linkhub.json");

        run(&doc, &["init", "-u", "alice"]).await.unwrap();
        run(&doc, &["add-link", "Shop", "https://x.test"]).await.unwrap();
        run(&doc, &["add-link", "Blog", "https://b.test"]).await.unwrap();
        run(&doc, &["social", "github", "alice"]).await.unwrap();
        run(&doc, &["theme", "Ocean"]).await.unwrap();

        let profile = read(&doc)["profile"]["u1"].clone();
        assert_eq!(profile["username"], "alice");
        assert_eq!(profile["theme"]["baseTheme"], "Ocean");
        assert_eq!(profile["links"]["social"]["github"], "alice");
        let custom = profile["links"]["custom"].as_object().unwrap();
        let mut positions: Vec<_> = custom.values().map(|l| l["position"].as_u64().unwrap()).collect();
        positions.sort();
        assert_eq!(positions, vec![0, 1]);
    }

    #[tokio::test]
    async fn commands_on_missing_profile_fail() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("linkhub.json");
        assert!(run(&doc, &["links"]).await.is_err());
        assert!(run(&doc, &["show"]).await.is_err());
    }

    #[tokio::test]
    async fn social_without_handle_disconnects() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("linkhub.json");
        run(&doc, &["init", "-u", "alice"]).await.unwrap();
        run(&doc, &["social", "twitter", "alice"]).await.unwrap();
        run(&doc, &["social", "twitter"]).await.unwrap();

        let profile = read(&doc)["profile"]["u1"].clone();
        assert!(profile["links"]["social"]["twitter"].is_null());
    }
}
