use std::fmt::Write;
use std::path::{Component, Path};

use crate::filter::DashboardPermissionFilter;
use crate::output::report;
use crate::output::validate::count_query;

/// Render a filter as an annotated SQL script: the count statement plus its parameters.
pub fn format_filter_sql(filter: &DashboardPermissionFilter) -> String {
    let clause = filter.clause();
    let mut out = String::new();

    writeln!(
        out,
        "-- permission: {}, query type: {}",
        filter.level(),
        display_query_type(filter)
    )
    .unwrap();
    if clause.params.is_empty() {
        writeln!(out, "-- no parameters").unwrap();
    }
    for (idx, param) in clause.params.iter().enumerate() {
        writeln!(out, "-- ${}: {param}", idx + 1).unwrap();
    }
    out.push_str(&count_query(&clause));
    out.push(';');
    out
}

/// Render the `(recursive_cte, where_clause, params)` triple as pretty JSON.
pub fn format_filter_json(filter: &DashboardPermissionFilter) -> Result<String, String> {
    serde_json::to_string_pretty(&filter.clause())
        .map_err(|e| format!("Failed to serialize filter: {e}"))
}

pub(crate) fn display_query_type(filter: &DashboardPermissionFilter) -> &'static str {
    match filter.query_type().as_str() {
        "" => "any",
        other => other,
    }
}

/// Write all output files to the specified directory.
pub fn write_output(
    output_dir: &Path,
    name: &str,
    filter: &DashboardPermissionFilter,
) -> Result<(), String> {
    validate_output_name(name)?;

    std::fs::create_dir_all(output_dir)
        .map_err(|e| format!("Failed to create output directory: {e}"))?;

    let sql_path = output_dir.join(format!("{name}_filter.sql"));
    std::fs::write(&sql_path, format_filter_sql(filter))
        .map_err(|e| format!("Failed to write {}: {e}", sql_path.display()))?;

    let json_path = output_dir.join(format!("{name}_filter.json"));
    std::fs::write(&json_path, format_filter_json(filter)?)
        .map_err(|e| format!("Failed to write {}: {e}", json_path.display()))?;

    let report_path = output_dir.join(format!("{name}_report.md"));
    std::fs::write(&report_path, report::build_report(filter))
        .map_err(|e| format!("Failed to write {}: {e}", report_path.display()))?;

    Ok(())
}

fn validate_output_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Output name must not be empty".to_string());
    }
    let candidate = Path::new(name);
    if candidate.is_absolute() {
        return Err(format!(
            "Invalid output name '{name}': absolute paths are not allowed"
        ));
    }
    if candidate.components().any(|component| {
        matches!(
            component,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    }) {
        return Err(format!(
            "Invalid output name '{name}': traversal segments are not allowed"
        ));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(format!(
            "Invalid output name '{name}': path separators are not allowed"
        ));
    }
    Ok(())
}
