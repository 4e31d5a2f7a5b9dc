use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::work::Work;

/// Creator - an author and the Works they exclusively own
///
/// The same struct is used for detached input to a merge and for graphs
/// materialized from the persistence context. An `id` of 0 means the
/// Creator has not been assigned an identifier yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Creator {
    /// Store-assigned identifier (0 = new)
    pub id: u64,

    /// Display name
    pub full_name: String,

    pub born: Option<NaiveDate>,

    pub died: Option<NaiveDate>,

    /// Primary language code (e.g. "EN")
    pub primary_language: Option<String>,

    /// Owned Works; on merge this is the complete desired collection
    pub works: Vec<Work>,
}

impl Creator {
    /// Create a detached Creator with the given name and no works
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            ..Self::default()
        }
    }

    /// Set the identifier (builder style)
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Set the primary language (builder style)
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.primary_language = Some(language.into());
        self
    }

    /// Set birth and death dates (builder style)
    pub fn with_lifespan(mut self, born: Option<NaiveDate>, died: Option<NaiveDate>) -> Self {
        self.born = born;
        self.died = died;
        self
    }

    /// Append an owned Work (builder style)
    pub fn with_work(mut self, work: Work) -> Self {
        self.works.push(work);
        self
    }

    /// True if the Creator has not been assigned an identifier
    pub fn is_new(&self) -> bool {
        self.id == 0
    }

    /// Copy of the scalar columns only, without the owned collection
    pub fn scalars(&self) -> Self {
        Self {
            works: Vec::new(),
            ..self.clone()
        }
    }

    /// Whole-record replace of every mapped scalar field
    pub fn overwrite_scalars(&mut self, source: &Creator) {
        self.full_name = source.full_name.clone();
        self.born = source.born;
        self.died = source.died;
        self.primary_language = source.primary_language.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_creator_is_new() {
        let creator = Creator::new("Daniel Abraham");
        assert!(creator.is_new());
        assert!(creator.works.is_empty());
        assert_eq!(creator.primary_language, None);
    }

    #[test]
    fn test_overwrite_scalars_replaces_absent_fields() {
        let born = NaiveDate::from_ymd_opt(1952, 4, 11);
        let mut tracked = Creator::new("Douglas Adams")
            .with_id(1)
            .with_language("EN")
            .with_lifespan(born, None);

        tracked.overwrite_scalars(&Creator::new("D. Adams"));

        assert_eq!(tracked.id, 1);
        assert_eq!(tracked.full_name, "D. Adams");
        assert_eq!(tracked.primary_language, None);
        assert_eq!(tracked.born, None);
    }

    #[test]
    fn test_scalars_drops_works() {
        let creator = Creator::new("A").with_work(Work::new("B"));
        assert!(creator.scalars().works.is_empty());
        assert_eq!(creator.scalars().full_name, "A");
    }
}
