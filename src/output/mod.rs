/// Filter rendering (SQL text, JSON) and output file writing.
pub mod formatter;
/// Markdown report describing how a filter was resolved.
pub mod report;
/// SQL syntax validation of rendered filters.
pub mod validate;
