//! The mutation command set.
//!
//! Each user intent is one [`Mutation`] variant. A mutation is validated at
//! the boundary, then planned into a single [`Patch`] relative to the
//! profile root. Planning is pure; the [`Dashboard`](crate::Dashboard)
//! supplies the fresh link collection and submits the result.

use std::collections::BTreeMap;

use serde_json::Value;

use linkhub_links::{LinkOrder, PositionPlan};
use linkhub_theme::ThemeResolver;
use linkhub_types::validation::{
    non_blank, validate_bio, validate_color, validate_display_name, validate_social_handle,
    validate_url,
};
use linkhub_types::{
    encode_bio, CustomLink, DocPath, LinkFields, LinkId, Patch, SocialProvider,
    ValidationError,
};

use crate::config::RemovalPolicy;
use crate::error::{DashboardError, DashboardResult};

/// One profile mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    /// Append a link at the end of the list.
    AddCustomLink(LinkFields),
    RemoveCustomLink(LinkId),
    /// Replace a link's title, url and visibility. Its position is kept.
    UpdateCustomLink { id: LinkId, fields: LinkFields },
    UpdateLinkPositions(PositionPlan),
    /// Switch base theme and drop every customization.
    UpdateBaseTheme(String),
    /// Select a button preset; `None` or blank restores the theme's button.
    UpdateCustomButton(Option<String>),
    UpdateBackgroundColor(Option<String>),
    UpdateTextColor(Option<String>),
    /// Set a social handle; an empty value disconnects the provider.
    UpdateSocialLink { provider: String, value: String },
    UpdateDisplayName(String),
    /// Set the bio; empty text deletes it.
    UpdateBio(String),
    SetAvatar(Option<String>),
}

/// Inputs a mutation is planned against.
#[derive(Clone, Copy, Debug)]
pub struct PlanContext<'a> {
    /// Custom links as last read from the store.
    pub links: &'a BTreeMap<LinkId, CustomLink>,
    pub removal_policy: RemovalPolicy,
    /// Store-generated id for [`Mutation::AddCustomLink`].
    pub new_link: Option<&'a LinkId>,
}

/// A planned write.
#[derive(Clone, Debug, PartialEq)]
pub struct Planned {
    pub patch: Patch,
    /// Id of the link the write creates, if any.
    pub created: Option<LinkId>,
}

impl Planned {
    fn from_patch(patch: Patch) -> Self {
        Self {
            patch,
            created: None,
        }
    }
}

impl Mutation {
    /// Command name used in logs and notices.
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddCustomLink(_) => "addCustomLink",
            Mutation::RemoveCustomLink(_) => "removeCustomLink",
            Mutation::UpdateCustomLink { .. } => "updateCustomLink",
            Mutation::UpdateLinkPositions(_) => "updateLinkPositions",
            Mutation::UpdateBaseTheme(_) => "updateBaseTheme",
            Mutation::UpdateCustomButton(_) => "updateCustomButton",
            Mutation::UpdateBackgroundColor(_) => "updateBackgroundColor",
            Mutation::UpdateTextColor(_) => "updateTextColor",
            Mutation::UpdateSocialLink { .. } => "updateSocialLink",
            Mutation::UpdateDisplayName(_) => "updateDisplayName",
            Mutation::UpdateBio(_) => "updateBio",
            Mutation::SetAvatar(_) => "setAvatar",
        }
    }

    /// Whether planning needs the current link collection. These mutations
    /// are serialized per profile.
    pub fn touches_links(&self) -> bool {
        matches!(
            self,
            Mutation::AddCustomLink(_)
                | Mutation::RemoveCustomLink(_)
                | Mutation::UpdateCustomLink { .. }
                | Mutation::UpdateLinkPositions(_)
        )
    }

    /// Reject invalid input before anything is sent.
    pub fn validate(&self, resolver: &ThemeResolver) -> DashboardResult<()> {
        match self {
            Mutation::AddCustomLink(fields) | Mutation::UpdateCustomLink { fields, .. } => {
                fields.validate()?
            }
            Mutation::RemoveCustomLink(_) => {}
            Mutation::UpdateLinkPositions(plan) => {
                if plan.is_empty() {
                    return Err(ValidationError::EmptyPositionUpdate.into());
                }
            }
            Mutation::UpdateBaseTheme(name) => {
                resolver.require_theme(name)?;
            }
            Mutation::UpdateCustomButton(id) => {
                if let Some(id) = id.as_deref().and_then(non_blank) {
                    resolver.require_button(id)?;
                }
            }
            Mutation::UpdateBackgroundColor(color) | Mutation::UpdateTextColor(color) => {
                if let Some(color) = color.as_deref().and_then(non_blank) {
                    validate_color(color)?;
                }
            }
            Mutation::UpdateSocialLink { provider, value } => {
                SocialProvider::require(provider)?;
                if let Some(handle) = non_blank(value) {
                    validate_social_handle(handle)?;
                }
            }
            Mutation::UpdateDisplayName(name) => validate_display_name(name.trim())?,
            Mutation::UpdateBio(text) => validate_bio(text)?,
            Mutation::SetAvatar(url) => {
                if let Some(url) = url.as_deref().and_then(non_blank) {
                    validate_url(url)?;
                }
            }
        }
        Ok(())
    }

    /// Plan the write, relative to the profile root.
    pub fn plan(&self, ctx: &PlanContext<'_>) -> DashboardResult<Planned> {
        let mut patch = Patch::new();
        match self {
            Mutation::AddCustomLink(fields) => {
                let id = ctx.new_link.ok_or_else(|| {
                    DashboardError::Config("addCustomLink planned without a new link id".into())
                })?;
                let position = LinkOrder::new(ctx.links).next_position();
                patch.set_json(custom_link(id)?, &fields.clone().at_position(position))?;
                return Ok(Planned {
                    patch,
                    created: Some(id.clone()),
                });
            }
            Mutation::RemoveCustomLink(id) => {
                let order = LinkOrder::new(ctx.links);
                let renumber = order.removal_plan(id)?;
                patch.delete(custom_link(id)?);
                if ctx.removal_policy == RemovalPolicy::Renumber {
                    set_positions(&mut patch, &renumber)?;
                }
            }
            Mutation::UpdateCustomLink { id, fields } => {
                LinkOrder::new(ctx.links).position_of(id)?;
                let base = custom_link(id)?;
                patch
                    .set(base.child("title")?, Value::from(fields.title.as_str()))
                    .set(base.child("url")?, Value::from(fields.url.as_str()))
                    .set(base.child("show")?, Value::from(fields.show));
            }
            Mutation::UpdateLinkPositions(plan) => {
                plan.check_against(ctx.links)?;
                set_positions(&mut patch, plan)?;
            }
            Mutation::UpdateBaseTheme(name) => {
                patch
                    .set(path("theme/baseTheme")?, Value::from(name.as_str()))
                    .delete(path("theme/customizations")?);
            }
            Mutation::UpdateCustomButton(id) => {
                set_or_delete(&mut patch, path("theme/customizations/buttonId")?, id.as_deref());
            }
            Mutation::UpdateBackgroundColor(color) => {
                set_or_delete(
                    &mut patch,
                    path("theme/customizations/backgroundColor")?,
                    color.as_deref(),
                );
            }
            Mutation::UpdateTextColor(color) => {
                set_or_delete(
                    &mut patch,
                    path("theme/customizations/textColor")?,
                    color.as_deref(),
                );
            }
            Mutation::UpdateSocialLink { provider, value } => {
                let target = path("links/social")?.child(provider)?;
                set_or_delete(&mut patch, target, Some(value));
            }
            Mutation::UpdateDisplayName(name) => {
                patch.set(path("displayName")?, Value::from(name.trim()));
            }
            Mutation::UpdateBio(text) => {
                let target = path("bio")?;
                if text.is_empty() {
                    patch.delete(target);
                } else {
                    patch.set(target, Value::from(encode_bio(text)));
                }
            }
            Mutation::SetAvatar(url) => {
                set_or_delete(&mut patch, path("avatar")?, url.as_deref());
            }
        }
        Ok(Planned::from_patch(patch))
    }
}

fn path(raw: &str) -> DashboardResult<DocPath> {
    Ok(DocPath::parse(raw)?)
}

fn custom_link(id: &LinkId) -> DashboardResult<DocPath> {
    Ok(path("links/custom")?.child(id)?)
}

fn set_positions(patch: &mut Patch, plan: &PositionPlan) -> DashboardResult<()> {
    for (id, position) in plan.iter() {
        patch.set(custom_link(id)?.child("position")?, Value::from(position));
    }
    Ok(())
}

/// Blank or absent values delete the path.
fn set_or_delete(patch: &mut Patch, target: DocPath, value: Option<&str>) {
    match value.and_then(non_blank) {
        Some(value) => patch.set(target, Value::from(value)),
        None => patch.delete(target),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(raw: &str) -> LinkId {
        LinkId::new(raw).unwrap()
    }

    fn p(raw: &str) -> DocPath {
        DocPath::parse(raw).unwrap()
    }

    fn abc() -> BTreeMap<LinkId, CustomLink> {
        [("a", 0), ("b", 1), ("c", 2)]
            .into_iter()
            .map(|(key, position)| {
                let fields = LinkFields::new(key.to_uppercase(), format!("https://{key}.test"), true);
                (id(key), fields.at_position(position))
            })
            .collect()
    }

    fn plan(mutation: Mutation, links: &BTreeMap<LinkId, CustomLink>) -> Planned {
        let ctx = PlanContext {
            links,
            removal_policy: RemovalPolicy::Renumber,
            new_link: None,
        };
        mutation.plan(&ctx).unwrap()
    }

    #[test]
    fn add_appends_at_next_position() {
        let empty = BTreeMap::new();
        let new_id = id("n1");
        let ctx = PlanContext {
            links: &empty,
            removal_policy: RemovalPolicy::Renumber,
            new_link: Some(&new_id),
        };
        let planned = Mutation::AddCustomLink(LinkFields::new("Shop", "https://x.test", true))
            .plan(&ctx)
            .unwrap();
        assert_eq!(planned.created, Some(new_id));
        assert_eq!(
            planned.patch.get(&p("links/custom/n1")),
            Some(&Some(json!({
                "title": "Shop", "url": "https://x.test", "show": true, "position": 0
            })))
        );
    }

    #[test]
    fn remove_renumbers_in_the_same_patch() {
        let planned = plan(Mutation::RemoveCustomLink(id("a")), &abc());
        assert_eq!(planned.patch.get(&p("links/custom/a")), Some(&None));
        assert_eq!(
            planned.patch.get(&p("links/custom/b/position")),
            Some(&Some(json!(0)))
        );
        assert_eq!(
            planned.patch.get(&p("links/custom/c/position")),
            Some(&Some(json!(1)))
        );
        assert!(planned.patch.validate().is_ok());
    }

    #[test]
    fn remove_can_leave_a_gap() {
        let links = abc();
        let ctx = PlanContext {
            links: &links,
            removal_policy: RemovalPolicy::LeaveGap,
            new_link: None,
        };
        let planned = Mutation::RemoveCustomLink(id("a")).plan(&ctx).unwrap();
        assert_eq!(planned.patch.len(), 1);
    }

    #[test]
    fn update_link_keeps_position() {
        let planned = plan(
            Mutation::UpdateCustomLink {
                id: id("b"),
                fields: LinkFields::new("Blog", "https://blog.test", false),
            },
            &abc(),
        );
        assert_eq!(planned.patch.len(), 3);
        assert!(planned.patch.get(&p("links/custom/b/position")).is_none());
        assert_eq!(
            planned.patch.get(&p("links/custom/b/show")),
            Some(&Some(json!(false)))
        );
    }

    #[test]
    fn unknown_link_is_rejected() {
        let links = abc();
        let ctx = PlanContext {
            links: &links,
            removal_policy: RemovalPolicy::Renumber,
            new_link: None,
        };
        let err = Mutation::RemoveCustomLink(id("zzz")).plan(&ctx).unwrap_err();
        assert!(matches!(err, DashboardError::Link(_)));
    }

    #[test]
    fn base_theme_clears_customizations() {
        let planned = plan(Mutation::UpdateBaseTheme("Ocean".into()), &BTreeMap::new());
        assert_eq!(
            planned.patch.get(&p("theme/baseTheme")),
            Some(&Some(json!("Ocean")))
        );
        assert_eq!(planned.patch.get(&p("theme/customizations")), Some(&None));
    }

    #[test]
    fn empty_social_value_deletes() {
        let planned = plan(
            Mutation::UpdateSocialLink {
                provider: "twitter".into(),
                value: String::new(),
            },
            &BTreeMap::new(),
        );
        assert_eq!(planned.patch.get(&p("links/social/twitter")), Some(&None));
    }

    #[test]
    fn blank_colour_deletes_override() {
        let planned = plan(
            Mutation::UpdateBackgroundColor(Some("   ".into())),
            &BTreeMap::new(),
        );
        assert_eq!(
            planned.patch.get(&p("theme/customizations/backgroundColor")),
            Some(&None)
        );
    }

    #[test]
    fn bio_is_stored_json_encoded() {
        let planned = plan(Mutation::UpdateBio("hi \"you\"".into()), &BTreeMap::new());
        assert_eq!(
            planned.patch.get(&p("bio")),
            Some(&Some(json!("\"hi \\\"you\\\"\"")))
        );
    }

    #[test]
    fn validation_at_the_boundary() {
        let resolver = ThemeResolver::builtin();
        let long_title = LinkFields::new("x".repeat(21), "https://x.test", true);
        assert!(matches!(
            Mutation::AddCustomLink(long_title).validate(&resolver),
            Err(DashboardError::Validation(ValidationError::TitleLength { .. }))
        ));
        assert!(matches!(
            Mutation::UpdateBaseTheme("Nope".into()).validate(&resolver),
            Err(DashboardError::Theme(_))
        ));
        assert!(matches!(
            Mutation::UpdateCustomButton(Some("nope".into())).validate(&resolver),
            Err(DashboardError::Theme(_))
        ));
        assert!(matches!(
            Mutation::UpdateSocialLink {
                provider: "myspace".into(),
                value: "tom".into()
            }
            .validate(&resolver),
            Err(DashboardError::Validation(ValidationError::UnknownSocialProvider(_)))
        ));
        assert!(matches!(
            Mutation::UpdateLinkPositions(PositionPlan::new()).validate(&resolver),
            Err(DashboardError::Validation(ValidationError::EmptyPositionUpdate))
        ));
        assert!(Mutation::UpdateBio("x".repeat(81)).validate(&resolver).is_err());
        assert!(Mutation::UpdateCustomButton(None).validate(&resolver).is_ok());
    }
}
