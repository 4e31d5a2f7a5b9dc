use chrono::NaiveDate;
use folio_core::{CreatorHandle, Creator, IdentityMap, Work};

/// Identity map holding the seed graph as if it had been read from the store:
/// Creator 1 "Douglas Adams" owning Work 41
#[allow(dead_code)]
pub fn seeded_map() -> (IdentityMap, CreatorHandle) {
    let mut map = IdentityMap::new();
    let handle = map.attach_creator(douglas_adams());
    map.attach_work(young_zaphod()).unwrap();
    (map, handle)
}

#[allow(dead_code)]
pub fn douglas_adams() -> Creator {
    Creator::new("Douglas Adams")
        .with_id(1)
        .with_language("EN")
        .with_lifespan(
            NaiveDate::from_ymd_opt(1952, 4, 11),
            NaiveDate::from_ymd_opt(2001, 5, 11),
        )
}

#[allow(dead_code)]
pub fn young_zaphod() -> Work {
    Work {
        id: 41,
        title: "Young Zaphod Plays It Safe".to_string(),
        language: Some("EN".to_string()),
        creator_id: 1,
    }
}

/// Attach a committed Creator with the given works, as hydration would
#[allow(dead_code)]
pub fn attach_graph(map: &mut IdentityMap, creator: Creator) -> CreatorHandle {
    let works = creator.works.clone();
    let handle = map.attach_creator(creator);
    for work in works {
        map.attach_work(work).unwrap();
    }
    handle
}
