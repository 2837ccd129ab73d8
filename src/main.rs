//! CLI entry point for `dashacl`.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use dashacl::classifier::actions::{PermissionLevel, QueryType};
use dashacl::features::{Features, FilterOptions, FLAG_NESTED_FOLDERS};
use dashacl::filter::sql::interpolate;
use dashacl::filter::DashboardPermissionFilter;
use dashacl::output::formatter;
use dashacl::output::validate::{self, SqlDialect};
use dashacl::user::{PermissionsDocument, SignedInUser};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dashacl",
    about = "Render dashboard and folder permissions as an embeddable SQL search filter"
)]
struct Cli {
    /// Permissions JSON: a list of {action, scope} pairs or a map of action to scopes
    permissions: PathBuf,

    /// Requested permission level (view, edit, admin)
    #[arg(long, default_value = "view")]
    level: PermissionLevel,

    /// Restrict to one resource class (dash-db, dash-folder, dash-folder-alerting)
    #[arg(long)]
    query_type: Option<QueryType>,

    /// Organization the permissions belong to
    #[arg(long, default_value_t = 1)]
    org_id: i64,

    /// Id of the user the filter is built for
    #[arg(long, default_value_t = 0)]
    user_id: i64,

    /// Inherit folder permissions into subfolders
    #[arg(long)]
    nested_folders: bool,

    /// Expand nested folders with self-joins instead of WITH RECURSIVE
    #[arg(long)]
    no_recursive_cte: bool,

    /// Print the filter as JSON instead of annotated SQL
    #[arg(long)]
    json: bool,

    /// Check the rendered filter parses in this SQL dialect (generic, sqlite, mysql)
    #[arg(long)]
    validate: Option<SqlDialect>,

    /// Write SQL, JSON and report files here instead of printing
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print verbose diagnostics
    #[arg(long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let content = match std::fs::read_to_string(&cli.permissions) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.permissions.display());
            process::exit(2);
        }
    };

    let scopes = match PermissionsDocument::from_json(&content) {
        Ok(document) => document.into_scopes(),
        Err(e) => {
            eprintln!("{e}");
            process::exit(2);
        }
    };

    let mut user = SignedInUser {
        user_id: cli.user_id,
        org_id: cli.org_id,
        ..SignedInUser::default()
    };
    user.permissions.insert(cli.org_id, scopes);

    let features = if cli.nested_folders {
        Features::with_features([FLAG_NESTED_FOLDERS])
    } else {
        Features::default()
    };
    let options = FilterOptions {
        recursive_queries_supported: !cli.no_recursive_cte,
    };

    let filter = DashboardPermissionFilter::new(
        &user,
        cli.level,
        cli.query_type.unwrap_or_default(),
        &features,
        options,
    );

    if cli.verbose {
        let clause = filter.clause();
        let interpolated = interpolate(&validate::count_query(&clause), &clause.params);
        tracing::debug!(sql = %interpolated, "rendered filter");
    }

    if let Some(dialect) = cli.validate {
        if let Err(e) = validate::validate_clause(&filter.clause(), dialect) {
            eprintln!("{e}");
            process::exit(2);
        }
        tracing::debug!(%dialect, "filter validated");
    }

    if let Some(output_dir) = &cli.output_dir {
        let name = cli
            .permissions
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        if let Err(e) = formatter::write_output(output_dir, name, &filter) {
            eprintln!("Error writing output: {e}");
            process::exit(2);
        }
        return;
    }

    if cli.json {
        match formatter::format_filter_json(&filter) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("{e}");
                process::exit(2);
            }
        }
    } else {
        println!("{}", formatter::format_filter_sql(&filter));
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "dashacl=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
