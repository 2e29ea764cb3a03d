use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use linkhub_types::{CustomLink, LinkId};

use crate::error::{LinkError, Result};

/// A set of position assignments to write in one atomic patch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionPlan(BTreeMap<LinkId, u32>);

impl PositionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, id: LinkId, position: u32) -> &mut Self {
        self.0.insert(id, position);
        self
    }

    pub fn get(&self, id: &LinkId) -> Option<u32> {
        self.0.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LinkId, u32)> {
        self.0.iter().map(|(id, pos)| (id, *pos))
    }

    /// Apply the plan to a local copy of the collection. Ids missing from
    /// `links` are skipped.
    pub fn apply_to(&self, links: &mut BTreeMap<LinkId, CustomLink>) {
        for (id, position) in &self.0 {
            if let Some(link) = links.get_mut(id) {
                link.position = *position;
            }
        }
    }

    /// Check that every id in the plan exists in `links` and that applying
    /// the plan leaves no two links sharing a position.
    pub fn check_against(&self, links: &BTreeMap<LinkId, CustomLink>) -> Result<()> {
        if let Some(missing) = self.0.keys().find(|id| !links.contains_key(*id)) {
            return Err(LinkError::UnknownLink(missing.clone()));
        }
        let mut owners: BTreeMap<u32, &LinkId> = BTreeMap::new();
        for (id, link) in links {
            let position = self.get(id).unwrap_or(link.position);
            if let Some(first) = owners.insert(position, id) {
                return Err(LinkError::DuplicatePosition {
                    position,
                    first: first.clone(),
                    second: id.clone(),
                });
            }
        }
        Ok(())
    }
}

impl From<BTreeMap<LinkId, u32>> for PositionPlan {
    fn from(map: BTreeMap<LinkId, u32>) -> Self {
        Self(map)
    }
}

impl FromIterator<(LinkId, u32)> for PositionPlan {
    fn from_iter<I: IntoIterator<Item = (LinkId, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PositionPlan {
    type Item = (LinkId, u32);
    type IntoIter = std::collections::btree_map::IntoIter<LinkId, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> LinkId {
        LinkId::new(raw).unwrap()
    }

    fn links() -> BTreeMap<LinkId, CustomLink> {
        ["a", "b", "c"]
            .into_iter()
            .zip(0..)
            .map(|(key, position)| {
                let link = CustomLink {
                    title: key.to_uppercase(),
                    url: format!("https://{key}.test"),
                    show: true,
                    position,
                };
                (id(key), link)
            })
            .collect()
    }

    #[test]
    fn swap_passes_the_check() {
        let plan: PositionPlan = [(id("a"), 1), (id("b"), 0)].into_iter().collect();
        assert!(plan.check_against(&links()).is_ok());
    }

    #[test]
    fn half_a_swap_is_a_duplicate() {
        let plan: PositionPlan = [(id("c"), 1)].into_iter().collect();
        assert_eq!(
            plan.check_against(&links()).unwrap_err(),
            LinkError::DuplicatePosition {
                position: 1,
                first: id("b"),
                second: id("c"),
            }
        );
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut plan = PositionPlan::new();
        plan.assign(id("zzz"), 0);
        assert_eq!(
            plan.check_against(&links()).unwrap_err(),
            LinkError::UnknownLink(id("zzz"))
        );
    }

    #[test]
    fn serializes_as_a_plain_map() {
        let mut plan = PositionPlan::new();
        plan.assign(id("b"), 2).assign(id("a"), 0);
        let encoded = serde_json::to_string(&plan).unwrap();
        assert_eq!(encoded, r#"{"a":0,"b":2}"#);
    }
}
