//! Property tests for the owned-collection laws of `merge_creator`

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::attach_graph;
use folio_core::ops::merge_creator;
use folio_core::{Creator, IdentityMap, Work};
use proptest::prelude::*;

fn committed_creator(work_count: usize) -> Creator {
    let mut creator = Creator::new("Owner").with_id(1);
    for i in 0..work_count {
        creator.works.push(Work {
            id: 100 + i as u64,
            title: format!("Work {}", i),
            language: Some("EN".to_string()),
            creator_id: 1,
        });
    }
    creator
}

proptest! {
    #[test]
    fn prop_collection_is_fully_replaced(
        keep in proptest::collection::vec(any::<bool>(), 0..8),
        new_titles in proptest::collection::vec("[A-Za-z]{1,12}", 0..5),
    ) {
        // GIVEN a committed creator owning one work per `keep` flag
        let mut map = IdentityMap::new();
        let committed = committed_creator(keep.len());
        let handle = attach_graph(&mut map, committed.clone());

        // WHEN the detached graph keeps the flagged works and adds new ones
        let mut detached = Creator::new("Owner").with_id(1);
        for (work, kept) in committed.works.iter().zip(&keep) {
            if *kept {
                detached.works.push(work.clone());
            }
        }
        for title in &new_titles {
            detached.works.push(Work::new(title.clone()).with_language("EN"));
        }
        merge_creator(&mut map, &detached).unwrap();

        // THEN dropped works are deleted, new works inserted, kept untouched
        let kept = keep.iter().filter(|k| **k).count();
        let plan = map.plan();
        prop_assert_eq!(plan.deletes(), keep.len() - kept);
        prop_assert_eq!(plan.inserts(), new_titles.len());
        prop_assert_eq!(plan.updates(), 0);

        // AND the graph is exactly the supplied collection, all owned by 1
        let graph = map.graph(handle).unwrap();
        prop_assert_eq!(graph.works.len(), kept + new_titles.len());
        prop_assert!(graph.works.iter().all(|w| w.creator_id == 1));
    }

    #[test]
    fn prop_unknown_creator_id_never_changes_map(id in 2u64..10_000) {
        let mut map = IdentityMap::new();
        attach_graph(&mut map, committed_creator(3));

        let result = merge_creator(&mut map, &Creator::new("Ghost").with_id(id));

        prop_assert!(result.is_err());
        prop_assert!(!map.has_changes());
    }
}
