use std::collections::BTreeSet;

use super::identity_map::{CreatorHandle, IdentityMap, WorkHandle};
use crate::errors::{FolioError, Result};
use crate::model::{Creator, Work};

/// Identifiers of a detached graph resolved against the identity map
struct Resolved {
    root: Option<CreatorHandle>,
    works: Vec<Option<WorkHandle>>,
}

/// Merge a detached Creator graph into the identity map
///
/// Stages changes only; nothing is written until the owning context commits.
///
/// - Creator with id 0 is staged for insert; otherwise the tracked Creator
///   with that id has every scalar field overwritten.
/// - Each supplied Work is inserted (id 0) or overwritten (matched id). Its
///   foreign key always comes from the Creator.
/// - The supplied `works` is the complete owned collection: tracked Works of
///   the Creator that are not supplied are staged for delete.
///
/// The caller must make sure every id the graph mentions, and every Work the
/// Creator currently owns, is already tracked.
///
/// # Returns
/// Handle of the tracked Creator
///
/// # Errors
/// The map is left untouched on error.
/// * `InvalidName` / `InvalidTitle` - blank name or title
/// * `CreatorNotFound` - non-zero Creator id that is not tracked
/// * `WorkNotFound` - non-zero Work id that is not tracked
/// * `WorkOwnedByOtherCreator` - Work id tracked under a different Creator
/// * `DuplicateWork` - the same Work id supplied twice
pub fn merge_creator(map: &mut IdentityMap, detached: &Creator) -> Result<CreatorHandle> {
    let resolved = resolve(map, detached)?;
    Ok(stage(map, detached, resolved))
}

/// Stage a tracked Creator, and every Work it owns, for delete
///
/// # Errors
/// * `CreatorNotFound` - if no live Creator with this id is tracked
pub fn remove_creator(map: &mut IdentityMap, creator_id: u64) -> Result<CreatorHandle> {
    let handle = map
        .find_creator(creator_id)
        .ok_or(FolioError::CreatorNotFound { creator_id })?;
    map.remove_creator(handle);
    tracing::debug!(creator_id, "staged creator delete");
    Ok(handle)
}

fn resolve(map: &IdentityMap, detached: &Creator) -> Result<Resolved> {
    if detached.full_name.trim().is_empty() {
        return Err(FolioError::InvalidName {
            reason: "Full name cannot be empty or whitespace-only".to_string(),
        });
    }

    let root = if detached.is_new() {
        None
    } else {
        Some(
            map.find_creator(detached.id)
                .ok_or(FolioError::CreatorNotFound {
                    creator_id: detached.id,
                })?,
        )
    };

    let mut seen = BTreeSet::new();
    let mut works = Vec::with_capacity(detached.works.len());
    for work in &detached.works {
        if work.title.trim().is_empty() {
            return Err(FolioError::InvalidTitle {
                reason: "Title cannot be empty or whitespace-only".to_string(),
            });
        }
        works.push(resolve_work(map, detached, root, work, &mut seen)?);
    }

    Ok(Resolved { root, works })
}

fn resolve_work(
    map: &IdentityMap,
    detached: &Creator,
    root: Option<CreatorHandle>,
    work: &Work,
    seen: &mut BTreeSet<u64>,
) -> Result<Option<WorkHandle>> {
    if work.is_new() {
        return Ok(None);
    }

    if !seen.insert(work.id) {
        return Err(FolioError::DuplicateWork {
            work_id: work.id,
            creator_id: detached.id,
        });
    }

    let handle = map
        .find_work(work.id)
        .ok_or(FolioError::WorkNotFound { work_id: work.id })?;
    let entry = map.work(handle).ok_or(FolioError::WorkNotFound { work_id: work.id })?;

    if Some(entry.owner()) != root {
        let owner_id = map
            .creator(entry.owner())
            .map_or(entry.row().creator_id, |c| c.row().id);
        return Err(FolioError::WorkOwnedByOtherCreator {
            work_id: work.id,
            owner_id,
            creator_id: detached.id,
        });
    }

    Ok(Some(handle))
}

fn stage(map: &mut IdentityMap, detached: &Creator, resolved: Resolved) -> CreatorHandle {
    let root = match resolved.root {
        Some(handle) => {
            if let Some(entry) = map.creator_mut(handle) {
                entry.row.overwrite_scalars(detached);
            }
            tracing::debug!(creator_id = detached.id, "staged creator update");
            handle
        }
        None => {
            tracing::debug!("staged creator insert");
            map.add_creator(detached.scalars())
        }
    };

    let matched: BTreeSet<WorkHandle> = resolved.works.iter().flatten().copied().collect();
    let orphans: Vec<WorkHandle> = map
        .live_works_of(root)
        .into_iter()
        .filter(|h| !matched.contains(h))
        .collect();

    for (work, handle) in detached.works.iter().zip(resolved.works) {
        match handle {
            Some(handle) => {
                if let Some(entry) = map.work_mut(handle) {
                    entry.row.overwrite_scalars(work);
                }
                tracing::debug!(work_id = work.id, "staged work update");
            }
            None => {
                map.add_work(root, work.clone());
                tracing::debug!("staged work insert");
            }
        }
    }

    for orphan in orphans {
        if let Some(entry) = map.work(orphan) {
            tracing::debug!(work_id = entry.row().id, "staged orphaned work delete");
        }
        map.remove_work(orphan);
    }

    root
}
