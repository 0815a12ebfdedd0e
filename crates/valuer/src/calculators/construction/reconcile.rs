use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::domain::{ItemId, LineItem, StoredLineItem};

/// Batched reconciliation of a record's line items against a submission.
///
/// The delete, update, and create sets are computed up front so persistence
/// can apply them in one unit of work: stored items missing from the
/// submission are deleted, submitted items carrying a known id are updated,
/// and items without an id become creations with freshly assigned ids.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReconcilePlan {
    pub deletes: Vec<ItemId>,
    pub updates: Vec<StoredLineItem>,
    pub creates: Vec<StoredLineItem>,
}

/// Raised when a submission references an item id the record does not own.
#[derive(Debug, thiserror::Error)]
#[error("submission references unknown line item '{0}'")]
pub struct UnknownLineItem(pub String);

impl ReconcilePlan {
    pub fn between(
        existing: &[StoredLineItem],
        submitted: Vec<LineItem>,
        mut next_id: impl FnMut() -> ItemId,
    ) -> Result<Self, UnknownLineItem> {
        let known: HashSet<&ItemId> = existing.iter().map(|item| &item.id).collect();
        let mut submitted_ids: HashSet<ItemId> = HashSet::new();

        let mut updates = Vec::new();
        let mut creates = Vec::new();

        for item in submitted {
            match item.id {
                Some(id) => {
                    if !known.contains(&id) {
                        return Err(UnknownLineItem(id.0));
                    }
                    submitted_ids.insert(id.clone());
                    updates.push(StoredLineItem {
                        id,
                        element: item.element,
                        quality_of_finish: item.quality_of_finish,
                        source: item.source,
                    });
                }
                None => creates.push(StoredLineItem {
                    id: next_id(),
                    element: item.element,
                    quality_of_finish: item.quality_of_finish,
                    source: item.source,
                }),
            }
        }

        let deletes = existing
            .iter()
            .filter(|item| !submitted_ids.contains(&item.id))
            .map(|item| item.id.clone())
            .collect();

        Ok(Self {
            deletes,
            updates,
            creates,
        })
    }

    pub fn is_noop(&self) -> bool {
        self.deletes.is_empty() && self.updates.is_empty() && self.creates.is_empty()
    }
}
