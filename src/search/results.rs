use serde::{Serialize, Deserialize};

/// One page of a scroll. An empty `results` means the scroll is finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollResult<R> {
    pub scroll_id: String,
    pub results: Vec<R>,
}

impl<R> ScrollResult<R> {
    pub fn empty(scroll_id: impl Into<String>) -> Self {
        ScrollResult {
            scroll_id: scroll_id.into(),
            results: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
