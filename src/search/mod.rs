/// Search hits, hit lists and sort option types.
pub mod model;
/// Search orchestration over the star service and the dashboard store.
pub mod service;
/// Registry of named sort options.
pub mod sort;
