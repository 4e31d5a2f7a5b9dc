use serde::{Deserialize, Serialize};

/// Work - a single authored item owned by one Creator
///
/// `creator_id` is the foreign key back to the owner. It is navigation only:
/// the merge operation derives it from the owning Creator and ignores
/// whatever a detached Work carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Work {
    /// Store-assigned identifier (0 = new)
    pub id: u64,

    pub title: String,

    /// Language code (e.g. "EN")
    pub language: Option<String>,

    /// Owning Creator's identifier
    pub creator_id: u64,
}

impl Work {
    /// Create a detached Work with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the identifier (builder style)
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = id;
        self
    }

    /// Set the language (builder style)
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn is_new(&self) -> bool {
        self.id == 0
    }

    /// Whole-record replace of every mapped scalar field
    ///
    /// `id` and `creator_id` are left alone.
    pub fn overwrite_scalars(&mut self, source: &Work) {
        self.title = source.title.clone();
        self.language = source.language.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overwrite_scalars_keeps_keys() {
        let mut tracked = Work {
            id: 41,
            title: "Young Zaphod Plays It Safe".to_string(),
            language: Some("EN".to_string()),
            creator_id: 1,
        };
        let detached = Work {
            id: 41,
            title: "Young Zaphod".to_string(),
            language: None,
            creator_id: 99,
        };

        tracked.overwrite_scalars(&detached);

        assert_eq!(tracked.title, "Young Zaphod");
        assert_eq!(tracked.language, None);
        assert_eq!(tracked.creator_id, 1);
    }
}
