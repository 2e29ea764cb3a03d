use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use linkhub_links::{ordered, Direction, LinkOrder, OrderedLink, PositionPlan, Visibility};
use linkhub_store::{DocumentStore, StoreError};
use linkhub_theme::{ResolvedTheme, ThemeResolver};
use linkhub_types::{decode_custom_links, CustomLink, DocPath, LinkFields, LinkId, Profile, ProfileId};

use crate::busy::BusyFlag;
use crate::command::{Mutation, PlanContext, Planned};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, DashboardResult};
use crate::notice::Notice;
use crate::profile::profile_path;
use crate::session::Session;
use crate::snapshot::{LiveSnapshot, SnapshotStream};
use crate::view::PublicProfile;

/// Outcome of a submitted command.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub command: &'static str,
    /// Number of paths written or deleted.
    pub paths: usize,
    /// Id of a newly created link.
    pub created: Option<LinkId>,
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// The editing engine for one profile.
///
/// Holds the change-filtered snapshot of `/profile/{id}`, the busy flag, the
/// notice channel, and the command set. Commands never touch the local
/// snapshot: the store's next notification carries the result back.
pub struct Dashboard<S: ?Sized> {
    store: Arc<S>,
    profile: ProfileId,
    root: DocPath,
    config: DashboardConfig,
    resolver: Arc<ThemeResolver>,
    busy: Arc<BusyFlag>,
    snapshot: Arc<LiveSnapshot>,
    notices: broadcast::Sender<Notice>,
    /// Serializes mutations of the custom link set.
    link_lock: Mutex<()>,
    session: Mutex<Option<Session>>,
}

impl<S> Dashboard<S>
where
    S: DocumentStore + ?Sized,
{
    /// Create a dashboard, building the theme resolver from `config`.
    pub fn new(store: Arc<S>, profile: ProfileId, config: DashboardConfig) -> DashboardResult<Self> {
        let resolver = config.resolver()?;
        Self::with_resolver(store, profile, config, Arc::new(resolver))
    }

    pub fn with_resolver(
        store: Arc<S>,
        profile: ProfileId,
        config: DashboardConfig,
        resolver: Arc<ThemeResolver>,
    ) -> DashboardResult<Self> {
        let root = profile_path(&profile)?;
        let busy = Arc::new(BusyFlag::new());
        let (notices, _) = broadcast::channel(config.notice_capacity.max(1));
        Ok(Self {
            store,
            profile,
            root,
            config,
            resolver,
            snapshot: Arc::new(LiveSnapshot::new(Arc::clone(&busy))),
            busy,
            notices,
            link_lock: Mutex::new(()),
            session: Mutex::new(None),
        })
    }

    pub fn profile_id(&self) -> &ProfileId {
        &self.profile
    }

    pub fn root(&self) -> &DocPath {
        &self.root
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn resolver(&self) -> &ThemeResolver {
        &self.resolver
    }

    // -- Change-filtered store ---------------------------------------------

    /// Subscribe to the profile document. Re-attaching replaces the previous
    /// listener.
    pub async fn attach(&self) -> DashboardResult<()> {
        let mut slot = self.session.lock().await;
        if let Some(previous) = slot.take() {
            previous.close().await;
        }
        let session = Session::open(&*self.store, self.root.clone(), Arc::clone(&self.snapshot))
            .await
            .map_err(|e| self.remote_failure("subscribe", e, DashboardError::RemoteRead))?;
        *slot = Some(session);
        Ok(())
    }

    /// Detach the listener. The last accepted snapshot is kept.
    pub async fn detach(&self) {
        if let Some(session) = self.session.lock().await.take() {
            session.close().await;
            info!(profile = %self.profile, "session detached");
        }
    }

    pub async fn is_attached(&self) -> bool {
        self.session
            .lock()
            .await
            .as_ref()
            .is_some_and(Session::is_active)
    }

    /// The last accepted snapshot, absent until the document first loads.
    pub fn current(&self) -> Option<Arc<Profile>> {
        self.snapshot.current()
    }

    /// A stream of accepted snapshots. Suppressed duplicates never appear.
    pub fn snapshots(&self) -> SnapshotStream {
        self.snapshot.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    /// User-facing notices about failed commands.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    // -- Projections ---------------------------------------------------------

    /// Every custom link in display order, hidden ones included.
    pub fn editing_links(&self) -> Vec<OrderedLink> {
        self.current()
            .map(|p| ordered(&p.links.custom, Visibility::Editing))
            .unwrap_or_default()
    }

    pub fn resolved_theme(&self) -> Option<ResolvedTheme> {
        self.current().map(|p| self.resolver.resolve(&p.theme))
    }

    pub fn public_view(&self) -> Option<PublicProfile> {
        self.current()
            .map(|p| PublicProfile::build(&p, &self.resolver))
    }

    // -- Commands ------------------------------------------------------------

    /// Validate, plan and submit one mutation as a single atomic write.
    ///
    /// Invalid input is rejected before anything is sent. Store failures
    /// emit a [`Notice`] and are returned; the local snapshot is never
    /// updated optimistically.
    pub async fn apply(&self, mutation: Mutation) -> DashboardResult<Receipt> {
        let command = mutation.name();
        let _busy = self.busy.acquire();
        mutation.validate(&self.resolver)?;

        let _links_guard = if mutation.touches_links() {
            Some(self.link_lock.lock().await)
        } else {
            None
        };
        let links = if mutation.touches_links() {
            self.read_links(command).await?
        } else {
            BTreeMap::new()
        };
        let new_link = match mutation {
            Mutation::AddCustomLink(_) => Some(self.new_link_id(command).await?),
            _ => None,
        };

        let planned = mutation.plan(&PlanContext {
            links: &links,
            removal_policy: self.config.removal_policy,
            new_link: new_link.as_ref(),
        })?;
        self.submit(command, planned).await
    }

    /// Swap a link with its neighbour. Returns `None` at the edges, where
    /// nothing is written.
    pub async fn move_link(&self, id: &LinkId, direction: Direction) -> DashboardResult<Option<Receipt>> {
        self.reorder(|links| LinkOrder::new(links).plan_move(id, direction).map_err(Into::into))
            .await
    }

    pub async fn move_up(&self, id: &LinkId) -> DashboardResult<Option<Receipt>> {
        self.move_link(id, Direction::Up).await
    }

    pub async fn move_down(&self, id: &LinkId) -> DashboardResult<Option<Receipt>> {
        self.move_link(id, Direction::Down).await
    }

    /// Renumber positions to `0..N` if they have gaps or duplicates.
    pub async fn normalize_links(&self) -> DashboardResult<Option<Receipt>> {
        self.reorder(|links| {
            let plan = LinkOrder::new(links).normalize();
            Ok((!plan.is_empty()).then_some(plan))
        })
        .await
    }

    pub async fn add_custom_link(&self, fields: LinkFields) -> DashboardResult<LinkId> {
        let receipt = self.apply(Mutation::AddCustomLink(fields)).await?;
        receipt
            .created
            .ok_or_else(|| DashboardError::Config("addCustomLink produced no link id".into()))
    }

    pub async fn remove_custom_link(&self, id: LinkId) -> DashboardResult<Receipt> {
        self.apply(Mutation::RemoveCustomLink(id)).await
    }

    pub async fn update_custom_link(&self, id: LinkId, fields: LinkFields) -> DashboardResult<Receipt> {
        self.apply(Mutation::UpdateCustomLink { id, fields }).await
    }

    pub async fn update_link_positions(&self, plan: PositionPlan) -> DashboardResult<Receipt> {
        self.apply(Mutation::UpdateLinkPositions(plan)).await
    }

    pub async fn update_base_theme(&self, name: impl Into<String>) -> DashboardResult<Receipt> {
        self.apply(Mutation::UpdateBaseTheme(name.into())).await
    }

    pub async fn update_custom_button(&self, id: Option<&str>) -> DashboardResult<Receipt> {
        self.apply(Mutation::UpdateCustomButton(id.map(str::to_string)))
            .await
    }

    pub async fn update_background_color(&self, color: Option<&str>) -> DashboardResult<Receipt> {
        self.apply(Mutation::UpdateBackgroundColor(color.map(str::to_string)))
            .await
    }

    pub async fn update_text_color(&self, color: Option<&str>) -> DashboardResult<Receipt> {
        self.apply(Mutation::UpdateTextColor(color.map(str::to_string)))
            .await
    }

    pub async fn update_social_link(&self, provider: &str, value: &str) -> DashboardResult<Receipt> {
        self.apply(Mutation::UpdateSocialLink {
            provider: provider.to_string(),
            value: value.to_string(),
        })
        .await
    }

    pub async fn update_display_name(&self, name: &str) -> DashboardResult<Receipt> {
        self.apply(Mutation::UpdateDisplayName(name.to_string())).await
    }

    pub async fn update_bio(&self, text: &str) -> DashboardResult<Receipt> {
        self.apply(Mutation::UpdateBio(text.to_string())).await
    }

    pub async fn set_avatar(&self, url: &str) -> DashboardResult<Receipt> {
        self.apply(Mutation::SetAvatar(Some(url.to_string()))).await
    }

    pub async fn remove_avatar(&self) -> DashboardResult<Receipt> {
        self.apply(Mutation::SetAvatar(None)).await
    }

    // -- Internals -----------------------------------------------------------

    async fn reorder<F>(&self, plan: F) -> DashboardResult<Option<Receipt>>
    where
        F: FnOnce(&BTreeMap<LinkId, CustomLink>) -> DashboardResult<Option<PositionPlan>>,
    {
        let _busy = self.busy.acquire();
        let _links_guard = self.link_lock.lock().await;
        let mutation_name = "updateLinkPositions";
        let links = self.read_links(mutation_name).await?;
        let Some(positions) = plan(&links)? else {
            debug!(profile = %self.profile, "reorder is a no-op");
            return Ok(None);
        };
        let mutation = Mutation::UpdateLinkPositions(positions);
        let planned = mutation.plan(&PlanContext {
            links: &links,
            removal_policy: self.config.removal_policy,
            new_link: None,
        })?;
        self.submit(mutation.name(), planned).await.map(Some)
    }

    /// Fresh read of the custom link collection.
    async fn read_links(&self, command: &'static str) -> DashboardResult<BTreeMap<LinkId, CustomLink>> {
        let path = self.links_path()?;
        let value = self
            .store
            .read(&path)
            .await
            .map_err(|e| self.remote_failure(command, e, DashboardError::RemoteRead))?;
        match value {
            None => Ok(BTreeMap::new()),
            Some(value) => decode_custom_links(value).map_err(|e| DashboardError::Malformed {
                path: path.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn new_link_id(&self, command: &'static str) -> DashboardResult<LinkId> {
        let key = self
            .store
            .push_key(&self.links_path()?)
            .await
            .map_err(|e| self.remote_failure(command, e, DashboardError::RemoteWrite))?;
        Ok(LinkId::new(key)?)
    }

    async fn submit(&self, command: &'static str, planned: Planned) -> DashboardResult<Receipt> {
        let Planned { patch, created } = planned;
        let paths = patch.len();
        if paths > 0 {
            self.store
                .patch(&self.root, patch)
                .await
                .map_err(|e| self.remote_failure(command, e, DashboardError::RemoteWrite))?;
        }
        info!(profile = %self.profile, command, paths, "command applied");
        Ok(Receipt {
            command,
            paths,
            created,
        })
    }

    fn links_path(&self) -> DashboardResult<DocPath> {
        Ok(self.root.join(&DocPath::parse("links/custom")?))
    }

    fn remote_failure(
        &self,
        command: &'static str,
        error: StoreError,
        wrap: fn(StoreError) -> DashboardError,
    ) -> DashboardError {
        warn!(profile = %self.profile, command, error = %error, "remote operation failed");
        // No receivers just means nobody is showing notices.
        let _ = self.notices.send(Notice::remote_failure(command, &error));
        wrap(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemovalPolicy;
    use crate::notice::NoticeLevel;
    use linkhub_store::InMemoryDocumentStore;
    use serde_json::json;
    use std::time::Duration;

    fn pid() -> ProfileId {
        ProfileId::new("u1").unwrap()
    }

    fn p(raw: &str) -> DocPath {
        DocPath::parse(raw).unwrap()
    }

    fn dashboard(doc: serde_json::Value) -> (Arc<InMemoryDocumentStore>, Dashboard<InMemoryDocumentStore>) {
        let store = Arc::new(InMemoryDocumentStore::from_value(json!({ "profile": { "u1": doc } })));
        let dashboard = Dashboard::new(Arc::clone(&store), pid(), DashboardConfig::default()).unwrap();
        (store, dashboard)
    }

    fn abc() -> serde_json::Value {
        json!({
            "username": "alice",
            "links": { "custom": {
                "a": { "title": "A", "url": "https://a.test", "show": true, "position": 0 },
                "b": { "title": "B", "url": "https://b.test", "show": true, "position": 1 },
                "c": { "title": "C", "url": "https://c.test", "show": true, "position": 2 }
            } }
        })
    }

    async fn next_snapshot(stream: &mut SnapshotStream) -> Arc<Profile> {
        tokio::time::timeout(Duration::from_secs(5), stream.changed())
            .await
            .expect("snapshot timed out")
            .unwrap();
        stream.borrow_and_update().clone().unwrap()
    }

    async fn stored_links(store: &InMemoryDocumentStore) -> BTreeMap<LinkId, CustomLink> {
        let raw = store.read(&p("profile/u1/links/custom")).await.unwrap().unwrap();
        decode_custom_links(raw).unwrap()
    }

    fn titles(links: &[OrderedLink]) -> Vec<&str> {
        links.iter().map(|l| l.title.as_str()).collect()
    }

    #[tokio::test]
    async fn attach_delivers_the_document() {
        let (_, dashboard) = dashboard(abc());
        let mut stream = dashboard.snapshots();
        dashboard.attach().await.unwrap();

        let profile = next_snapshot(&mut stream).await;
        assert_eq!(profile.username.as_deref(), Some("alice"));
        assert!(dashboard.is_attached().await);
        assert_eq!(titles(&dashboard.editing_links()), vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn add_link_to_empty_profile() {
        let (store, dashboard) = dashboard(json!({ "username": "alice" }));
        let mut stream = dashboard.snapshots();
        dashboard.attach().await.unwrap();
        next_snapshot(&mut stream).await;

        let id = dashboard
            .add_custom_link(LinkFields::new("Shop", "https://x.test", true))
            .await
            .unwrap();
        assert!(!dashboard.is_busy());

        let profile = next_snapshot(&mut stream).await;
        let link = profile.custom_link(&id).unwrap();
        assert_eq!(link.position, 0);
        assert_eq!(link.title, "Shop");
        assert_eq!(profile.links.custom.len(), 1);
        assert_eq!(
            store.read(&p("profile/u1/links/custom")).await.unwrap().unwrap().as_object().unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn move_up_swaps_positions_atomically() {
        let (store, dashboard) = dashboard(abc());
        let c = LinkId::new("c").unwrap();
        let receipt = dashboard.move_up(&c).await.unwrap().unwrap();
        assert_eq!(receipt.paths, 2);

        let links = store.read(&p("profile/u1/links/custom")).await.unwrap().unwrap();
        assert_eq!(links["a"]["position"], json!(0));
        assert_eq!(links["b"]["position"], json!(2));
        assert_eq!(links["c"]["position"], json!(1));

        let a = LinkId::new("a").unwrap();
        assert_eq!(dashboard.move_up(&a).await.unwrap(), None);
    }

    #[tokio::test]
    async fn concurrent_reorders_keep_positions_unique() {
        let (store, dashboard) = dashboard(abc());
        let b = LinkId::new("b").unwrap();
        let c = LinkId::new("c").unwrap();
        let (first, second) = tokio::join!(dashboard.move_up(&c), dashboard.move_up(&b));
        first.unwrap();
        second.unwrap();

        let raw = store.read(&p("profile/u1/links/custom")).await.unwrap().unwrap();
        let links: BTreeMap<LinkId, CustomLink> = serde_json::from_value(raw).unwrap();
        assert!(LinkOrder::new(&links).is_contiguous());
    }

    #[tokio::test]
    async fn remove_renumbers_remaining_links() {
        let (store, dashboard) = dashboard(abc());
        dashboard.remove_custom_link(LinkId::new("a").unwrap()).await.unwrap();

        let links = store.read(&p("profile/u1/links/custom")).await.unwrap().unwrap();
        assert!(links.get("a").is_none());
        assert_eq!(links["b"]["position"], json!(0));
        assert_eq!(links["c"]["position"], json!(1));
    }

    #[tokio::test]
    async fn remove_can_leave_gap() {
        let store = Arc::new(InMemoryDocumentStore::from_value(json!({ "profile": { "u1": abc() } })));
        let config = DashboardConfig {
            removal_policy: RemovalPolicy::LeaveGap,
            ..Default::default()
        };
        let dashboard = Dashboard::new(Arc::clone(&store), pid(), config).unwrap();
        dashboard.remove_custom_link(LinkId::new("a").unwrap()).await.unwrap();

        let links = store.read(&p("profile/u1/links/custom")).await.unwrap().unwrap();
        assert_eq!(links["b"]["position"], json!(1));

        dashboard.normalize_links().await.unwrap().unwrap();
        let links = store.read(&p("profile/u1/links/custom")).await.unwrap().unwrap();
        assert_eq!(links["b"]["position"], json!(0));
        assert_eq!(links["c"]["position"], json!(1));
    }

    #[tokio::test]
    async fn leave_gap_edits_keep_positions_unique() {
        let store = Arc::new(InMemoryDocumentStore::from_value(json!({ "profile": { "u1": abc() } })));
        let config = DashboardConfig {
            removal_policy: RemovalPolicy::LeaveGap,
            ..Default::default()
        };
        let dashboard = Dashboard::new(Arc::clone(&store), pid(), config).unwrap();
        let (b, c) = (LinkId::new("b").unwrap(), LinkId::new("c").unwrap());

        dashboard.remove_custom_link(LinkId::new("a").unwrap()).await.unwrap();
        let n = dashboard
            .add_custom_link(LinkFields::new("N", "https://n.test", true))
            .await
            .unwrap();
        assert_eq!(stored_links(&store).await[&n].position, 3);

        assert_eq!(dashboard.move_up(&b).await.unwrap(), None);
        dashboard.move_down(&b).await.unwrap().unwrap();
        dashboard.move_up(&n).await.unwrap().unwrap();
        dashboard.remove_custom_link(c).await.unwrap();
        let m = dashboard
            .add_custom_link(LinkFields::new("M", "https://m.test", true))
            .await
            .unwrap();
        dashboard.move_up(&m).await.unwrap().unwrap();

        let links = stored_links(&store).await;
        assert_eq!(titles(&ordered(&links, Visibility::Editing)), vec!["N", "M", "B"]);
        let mut positions: Vec<u32> = links.values().map(|l| l.position).collect();
        positions.sort_unstable();
        positions.dedup();
        assert_eq!(positions.len(), links.len());
    }

    #[tokio::test]
    async fn empty_social_value_removes_the_path() {
        let (store, dashboard) = dashboard(json!({
            "links": { "social": { "twitter": "alice", "github": "alice" } }
        }));
        dashboard.update_social_link("twitter", "").await.unwrap();

        let social = store.read(&p("profile/u1/links/social")).await.unwrap().unwrap();
        assert_eq!(social, json!({ "github": "alice" }));
    }

    #[tokio::test]
    async fn base_theme_resets_customizations() {
        let (store, dashboard) = dashboard(json!({
            "theme": { "baseTheme": "Mint", "customizations": { "textColor": "#fff", "buttonId": "fill-pill" } }
        }));
        let mut stream = dashboard.snapshots();
        dashboard.attach().await.unwrap();
        next_snapshot(&mut stream).await;

        dashboard.update_base_theme("Ocean").await.unwrap();
        next_snapshot(&mut stream).await;

        let theme = store.read(&p("profile/u1/theme")).await.unwrap().unwrap();
        assert_eq!(theme, json!({ "baseTheme": "Ocean" }));
        let resolved = dashboard.resolved_theme().unwrap();
        let ocean = dashboard.resolver().catalog().theme("Ocean").unwrap();
        assert_eq!(&resolved.link, &ocean.link);
        assert_eq!(&resolved.background, &ocean.background);
    }

    #[tokio::test]
    async fn identical_write_produces_no_snapshot() {
        let (_, dashboard) = dashboard(json!({ "displayName": "Alice" }));
        let mut stream = dashboard.snapshots();
        dashboard.attach().await.unwrap();
        next_snapshot(&mut stream).await;

        dashboard.update_display_name("Alice").await.unwrap();
        // Give the pump time to see the redelivered document.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!stream.has_changed().unwrap());
        assert!(!dashboard.is_busy());
    }

    #[tokio::test]
    async fn failed_write_emits_notice_and_clears_busy() {
        let (store, dashboard) = dashboard(json!({ "username": "alice" }));
        let mut notices = dashboard.notices();
        store.set_writable(false);

        let err = dashboard.update_bio("hello").await.unwrap_err();
        assert!(matches!(err, DashboardError::RemoteWrite(StoreError::PermissionDenied { .. })));
        assert!(!dashboard.is_busy());

        let notice = notices.try_recv().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.command, "updateBio");
        assert!(store.read(&p("profile/u1/bio")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_store() {
        let (store, dashboard) = dashboard(json!({ "username": "alice" }));
        let mut notices = dashboard.notices();
        let err = dashboard
            .add_custom_link(LinkFields::new("", "https://x.test", true))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
        assert!(notices.try_recv().is_err());
        assert!(!dashboard.is_busy());
        assert!(store.read(&p("profile/u1/links")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn detach_removes_the_listener() {
        let (store, dashboard) = dashboard(abc());
        dashboard.attach().await.unwrap();
        dashboard.attach().await.unwrap();
        assert_eq!(store.subscriber_count(), 1);

        dashboard.detach().await;
        assert_eq!(store.subscriber_count(), 0);
        assert!(!dashboard.is_attached().await);
    }

    #[tokio::test]
    async fn public_view_follows_snapshot() {
        let (_, dashboard) = dashboard(abc());
        assert!(dashboard.public_view().is_none());

        let mut stream = dashboard.snapshots();
        dashboard.attach().await.unwrap();
        next_snapshot(&mut stream).await;
        let view = dashboard.public_view().unwrap();
        assert_eq!(view.username.as_deref(), Some("alice"));
        assert_eq!(view.links.len(), 3);
    }
}
