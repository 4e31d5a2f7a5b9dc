// Property tests: committed graphs match what was merged

use folio_core::model::{Creator, Work};
use folio_store::db::open_in_memory;
use folio_store::repo::SqliteRepo;
use folio_store::PersistenceContext;
use proptest::prelude::*;

fn title() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z ']{0,20}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_committed_works_reference_their_creator(
        titles in prop::collection::vec(title(), 0..6),
    ) {
        let mut conn = open_in_memory().unwrap();
        let mut ctx = PersistenceContext::new(&mut conn).unwrap();

        let mut creator = Creator::new("Daniel Abraham");
        for t in &titles {
            creator = creator.with_work(Work::new(t.clone()));
        }
        let handle = ctx.merge(&creator).unwrap();
        ctx.commit().unwrap();

        let committed = ctx.creator(handle).unwrap();
        prop_assert!(committed.id != 0);
        drop(ctx);

        let stored = SqliteRepo::list_works_for_creator(&conn, committed.id).unwrap();
        let stored_titles: Vec<String> = stored.iter().map(|w| w.title.clone()).collect();
        prop_assert_eq!(stored_titles, titles);
        prop_assert!(stored.iter().all(|w| w.creator_id == committed.id));
    }

    #[test]
    fn prop_replacing_collection_keeps_only_supplied_works(
        keep in prop::collection::vec(any::<bool>(), 1..6),
    ) {
        // Given: A committed Creator with one Work per flag
        let mut conn = open_in_memory().unwrap();
        let mut ctx = PersistenceContext::new(&mut conn).unwrap();
        let mut creator = Creator::new("Daniel Abraham");
        for i in 0..keep.len() {
            creator = creator.with_work(Work::new(format!("Work {}", i)));
        }
        let handle = ctx.merge(&creator).unwrap();
        ctx.commit().unwrap();
        let committed = ctx.creator(handle).unwrap();

        // When: It is merged back with only the flagged Works
        let mut replacement = committed.scalars();
        for (work, flag) in committed.works.iter().zip(&keep) {
            if *flag {
                replacement.works.push(work.clone());
            }
        }
        ctx.merge(&replacement).unwrap();
        ctx.commit().unwrap();
        drop(ctx);

        // Then: The store holds exactly those Works
        let stored: Vec<u64> = SqliteRepo::list_works_for_creator(&conn, committed.id)
            .unwrap()
            .iter()
            .map(|w| w.id)
            .collect();
        let expected: Vec<u64> = replacement.works.iter().map(|w| w.id).collect();
        prop_assert_eq!(stored, expected);
    }
}
