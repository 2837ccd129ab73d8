use std::fmt::Write;

use crate::filter::predicate::{ActionPredicate, ResourceClass};
use crate::filter::DashboardPermissionFilter;
use crate::output::formatter::display_query_type;

/// Build a markdown report of the required actions and what each resolved to.
pub fn build_report(filter: &DashboardPermissionFilter) -> String {
    let mut report = String::new();

    writeln!(report, "# dashacl Filter Report").unwrap();
    writeln!(report).unwrap();
    writeln!(report, "- Permission: `{}`", filter.level()).unwrap();
    writeln!(report, "- Query type: `{}`", display_query_type(filter)).unwrap();
    writeln!(report).unwrap();

    writeln!(report, "## Required Actions").unwrap();
    writeln!(report).unwrap();
    writeln!(report, "| Rows | Actions | Grant |").unwrap();
    writeln!(report, "|------|---------|-------|").unwrap();

    let requirement = filter.requirement();
    let rows = [
        (ResourceClass::Dashboards, &requirement.dashboard_actions),
        (ResourceClass::Folders, &requirement.folder_actions),
    ];
    for (class, actions) in rows {
        if actions.is_empty() {
            continue;
        }
        let grant = filter
            .predicates()
            .iter()
            .find(|(c, _)| *c == class)
            .map_or_else(|| "denied (no permissions)".to_string(), |(_, p)| describe(p));
        writeln!(
            report,
            "| {} | {} | {grant} |",
            class_name(class),
            actions.join(" AND ")
        )
        .unwrap();
    }

    let clause = filter.clause();
    writeln!(report).unwrap();
    writeln!(report, "## Predicate").unwrap();
    writeln!(report).unwrap();
    writeln!(report, "```sql").unwrap();
    if !clause.recursive_cte.is_empty() {
        writeln!(report, "{}", clause.recursive_cte).unwrap();
    }
    writeln!(report, "{}", clause.where_clause).unwrap();
    writeln!(report, "```").unwrap();

    if !clause.params.is_empty() {
        writeln!(report).unwrap();
        writeln!(report, "## Parameters").unwrap();
        writeln!(report).unwrap();
        for (idx, param) in clause.params.iter().enumerate() {
            writeln!(report, "{}. `{param}`", idx + 1).unwrap();
        }
    }

    report
}

fn class_name(class: ResourceClass) -> &'static str {
    match class {
        ResourceClass::Dashboards => "dashboards",
        ResourceClass::Folders => "folders",
    }
}

fn describe(predicate: &ActionPredicate) -> String {
    match predicate {
        ActionPredicate::Unrestricted => "all (wildcard)".to_string(),
        _ if predicate.is_denied() => "none".to_string(),
        ActionPredicate::Restricted { direct, inherited } => {
            let mut parts = Vec::new();
            if !direct.is_empty() {
                parts.push(format!("{} by uid", direct.len()));
            }
            if !inherited.is_empty() {
                parts.push(format!("{} by folder", inherited.len()));
            }
            parts.join(", ")
        }
    }
}
