use std::collections::BTreeMap;

use crate::search::model::{SortOption, SortOptionFilter};

/// Name of the ascending title sort.
pub const SORT_ALPHA_ASC: &str = "alpha-asc";
/// Name of the descending title sort.
pub const SORT_ALPHA_DESC: &str = "alpha-desc";

/// Title A–Z.
pub fn sort_alpha_asc() -> SortOption {
    SortOption {
        name: SORT_ALPHA_ASC.to_string(),
        display_name: "Alphabetically (A–Z)".to_string(),
        description: "Sort results in an alphabetically ascending order".to_string(),
        index: 0,
        meta_name: String::new(),
        filter: vec![SortOptionFilter::title(false)],
    }
}

/// Title Z–A.
pub fn sort_alpha_desc() -> SortOption {
    SortOption {
        name: SORT_ALPHA_DESC.to_string(),
        display_name: "Alphabetically (Z–A)".to_string(),
        description: "Sort results in an alphabetically descending order".to_string(),
        index: 0,
        meta_name: String::new(),
        filter: vec![SortOptionFilter::title(true)],
    }
}

/// Sort options searchable by name.
#[derive(Debug, Clone)]
pub struct SortRegistry {
    options: BTreeMap<String, SortOption>,
}

impl SortRegistry {
    /// Registry holding only the two title sorts.
    pub fn new() -> Self {
        let mut registry = Self {
            options: BTreeMap::new(),
        };
        registry.register(sort_alpha_asc());
        registry.register(sort_alpha_desc());
        registry
    }

    /// Add or replace an option.
    pub fn register(&mut self, option: SortOption) {
        self.options.insert(option.name.clone(), option);
    }

    /// Look an option up; unknown names yield `None` rather than an error.
    pub fn get(&self, name: &str) -> Option<&SortOption> {
        self.options.get(name)
    }

    /// Every option, ordered by index then name.
    pub fn options(&self) -> Vec<SortOption> {
        let mut options: Vec<SortOption> = self.options.values().cloned().collect();
        options.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.name.cmp(&b.name)));
        options
    }
}

impl Default for SortRegistry {
    fn default() -> Self {
        Self::new()
    }
}
