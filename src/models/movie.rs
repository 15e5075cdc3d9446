use serde::{Deserialize, Serialize};

/// One entry of the movie catalog
///
/// `index` is the record's row and column in the similarity matrix.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieRecord {
    pub index: usize,
    pub title: String,
}

impl MovieRecord {
    pub fn new(index: usize, title: impl Into<String>) -> Self {
        Self {
            index,
            title: title.into(),
        }
    }
}
