use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use linkhub_types::{CustomLink, LinkId};

use crate::error::{LinkError, Result};
use crate::plan::PositionPlan;

/// Which links a consumer sees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    /// The public page: only links with `show = true`.
    Public,
    /// The editor: every link, hidden ones included.
    Editing,
}

/// Direction of a single-step reorder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// A custom link paired with its id, in display order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrderedLink {
    pub id: LinkId,
    pub title: String,
    pub url: String,
    pub show: bool,
    pub position: u32,
}

/// Sort links by `position` ascending, breaking ties by id, and filter by
/// visibility.
pub fn ordered(links: &BTreeMap<LinkId, CustomLink>, visibility: Visibility) -> Vec<OrderedLink> {
    LinkOrder::new(links)
        .iter()
        .filter(|(_, link)| visibility == Visibility::Editing || link.show)
        .map(|(id, link)| OrderedLink {
            id: id.clone(),
            title: link.title.clone(),
            url: link.url.clone(),
            show: link.show,
            position: link.position,
        })
        .collect()
}

/// An ordering view over a custom link collection.
///
/// Holds the links sorted by `(position, id)`. Neighbours are adjacent
/// entries in that order, so positions with gaps (left behind by removals
/// that do not renumber) still reorder correctly.
pub struct LinkOrder<'a> {
    links: &'a BTreeMap<LinkId, CustomLink>,
    sorted: Vec<&'a LinkId>,
}

impl<'a> LinkOrder<'a> {
    pub fn new(links: &'a BTreeMap<LinkId, CustomLink>) -> Self {
        let mut sorted: Vec<&LinkId> = links.keys().collect();
        // BTreeMap iteration is already id-ordered, so a stable sort on
        // position breaks ties by id.
        sorted.sort_by_key(|id| links[*id].position);
        Self { links, sorted }
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Links in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a LinkId, &'a CustomLink)> + '_ {
        self.sorted.iter().map(|id| (*id, &self.links[*id]))
    }

    pub fn position_of(&self, id: &LinkId) -> Result<u32> {
        self.links
            .get(id)
            .map(|link| link.position)
            .ok_or_else(|| LinkError::UnknownLink(id.clone()))
    }

    /// The link displayed directly before (up) or after (down) `id`.
    pub fn neighbour(&self, id: &LinkId, direction: Direction) -> Result<Option<&'a LinkId>> {
        let index = self.index_of(id)?;
        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => index.checked_add(1),
        };
        Ok(target.and_then(|t| self.sorted.get(t).copied()))
    }

    fn index_of(&self, id: &LinkId) -> Result<usize> {
        self.sorted
            .iter()
            .position(|other| *other == id)
            .ok_or_else(|| LinkError::UnknownLink(id.clone()))
    }

    /// Plan a swap of `id` with its neighbour in `direction`.
    ///
    /// Returns `Ok(None)` when the link is already first (up) or last
    /// (down). Distinct positions are swapped, so the plan names exactly two
    /// links. When both links share a position a swap would change nothing,
    /// so the whole list is renumbered densely in the new order instead.
    pub fn plan_move(&self, id: &LinkId, direction: Direction) -> Result<Option<PositionPlan>> {
        let position = self.position_of(id)?;
        let Some(neighbour) = self.neighbour(id, direction)? else {
            debug!(link = %id, ?direction, "already at the edge, nothing to move");
            return Ok(None);
        };
        let neighbour_position = self.links[neighbour].position;
        if neighbour_position == position {
            let mut reordered = self.sorted.clone();
            let (a, b) = (self.index_of(id)?, self.index_of(neighbour)?);
            reordered.swap(a, b);
            return Ok(Some(self.dense_plan(reordered.into_iter())));
        }
        let mut plan = PositionPlan::new();
        plan.assign(id.clone(), neighbour_position)
            .assign(neighbour.clone(), position);
        Ok(Some(plan))
    }

    pub fn move_up(&self, id: &LinkId) -> Result<Option<PositionPlan>> {
        self.plan_move(id, Direction::Up)
    }

    pub fn move_down(&self, id: &LinkId) -> Result<Option<PositionPlan>> {
        self.plan_move(id, Direction::Down)
    }

    /// Position for a newly appended link: one past the last position, which
    /// is the link count when positions are contiguous.
    pub fn next_position(&self) -> u32 {
        self.sorted
            .last()
            .map_or(0, |id| self.links[*id].position.saturating_add(1))
    }

    /// Positions to rewrite when `id` is removed: the remaining links are
    /// renumbered densely in their current order. Only changed entries are
    /// included.
    pub fn removal_plan(&self, id: &LinkId) -> Result<PositionPlan> {
        self.position_of(id)?;
        Ok(self.dense_plan(self.sorted.iter().copied().filter(|other| *other != id)))
    }

    /// `true` if positions are exactly `0..len` with no gaps or duplicates.
    pub fn is_contiguous(&self) -> bool {
        self.sorted
            .iter()
            .enumerate()
            .all(|(index, id)| u32::try_from(index).ok() == Some(self.links[*id].position))
    }

    /// Positions that restore a contiguous order while keeping the current
    /// relative order. Empty when the collection is already contiguous.
    pub fn normalize(&self) -> PositionPlan {
        self.dense_plan(self.sorted.iter().copied())
    }

    fn dense_plan(&self, ids: impl Iterator<Item = &'a LinkId>) -> PositionPlan {
        ids.enumerate()
            .filter_map(|(index, id)| {
                let index = u32::try_from(index).ok()?;
                (self.links[id].position != index).then(|| (id.clone(), index))
            })
            .collect()
    }
}
