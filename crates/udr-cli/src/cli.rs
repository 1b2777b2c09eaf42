//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::BackendKind;

/// udr - Keep route tables in step with published service tags
#[derive(Parser, Debug)]
#[command(name = "udr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ./udr.toml, then the user config directory)
    #[arg(long, global = true, env = "UDR_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub backend: BackendArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where the service tag snapshot comes from
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceArgs {
    /// Read the service tag document from this file instead of downloading it
    #[arg(long, global = true, env = "UDR_SNAPSHOT_FILE")]
    pub snapshot_file: Option<PathBuf>,

    /// Download the service tag document from this URL, skipping the download page
    #[arg(long, global = true, env = "UDR_DOCUMENT_URL")]
    pub document_url: Option<String>,

    /// Look for the document link on this page instead of the cloud's own
    #[arg(long, global = true, env = "UDR_DOWNLOAD_PAGE")]
    pub download_page: Option<String>,
}

/// Where route tables live
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendArgs {
    /// Route table backend
    #[arg(long = "backend", value_enum, global = true, env = "UDR_BACKEND")]
    pub kind: Option<BackendKind>,

    /// Directory of route table documents (file backend)
    #[arg(long, global = true, env = "UDR_TABLE_DIR")]
    pub table_dir: Option<PathBuf>,

    /// Subscription id (arm backend)
    #[arg(long, global = true, env = "UDR_SUBSCRIPTION")]
    pub subscription: Option<String>,

    /// Bearer token for the management API (arm backend)
    #[arg(long, global = true, env = "UDR_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Management endpoint override (arm backend)
    #[arg(long, global = true, env = "UDR_ENDPOINT")]
    pub endpoint: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create or refresh the routes of service tags
    ///
    /// Examples:
    ///   udr add Storage -g net-rg -t spoke-rt
    ///   udr add AzureMonitor Storage.WestEurope -g net-rg -t spoke-rt --dry-run
    Add(ReconcileArgs),

    /// Remove the routes of service tags
    Remove(ReconcileArgs),

    /// Show the managed routes of a route table
    Status {
        #[command(flatten)]
        table: TableArgs,

        /// Cloud the table lives in
        #[arg(long, env = "UDR_CLOUD")]
        cloud: Option<String>,

        /// Route name prefix
        #[arg(long, env = "UDR_PREFIX")]
        prefix: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// List the service tags of the current snapshot
    Tags {
        /// Cloud whose snapshot to list
        #[arg(long, env = "UDR_CLOUD")]
        cloud: Option<String>,

        /// Only show tags whose name contains this text (case-insensitive)
        #[arg(long)]
        filter: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

/// Identifies one route table
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TableArgs {
    /// Resource group holding the route table
    #[arg(short = 'g', long, env = "UDR_RESOURCE_GROUP")]
    pub resource_group: String,

    /// Route table name
    #[arg(short = 't', long, env = "UDR_ROUTE_TABLE")]
    pub route_table: String,
}

/// Arguments shared by `add` and `remove`
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ReconcileArgs {
    /// Service tag names
    #[arg(required = true)]
    pub tags: Vec<String>,

    #[command(flatten)]
    pub table: TableArgs,

    /// Cloud whose service tags to use (Public, USGov, China, Germany)
    #[arg(long, env = "UDR_CLOUD")]
    pub cloud: Option<String>,

    /// Route name prefix
    #[arg(long, env = "UDR_PREFIX")]
    pub prefix: Option<String>,

    /// Maximum number of routes the table may hold
    #[arg(long, env = "UDR_CAPACITY")]
    pub capacity: Option<usize>,

    /// Address family to route (any, ipv4, ipv6)
    #[arg(long, env = "UDR_FAMILY")]
    pub family: Option<String>,

    /// Preview changes without applying them
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON for scripting
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from([
            "udr", "add", "Storage", "AzureMonitor", "-g", "rg", "-t", "rt", "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.tags, vec!["Storage", "AzureMonitor"]);
                assert_eq!(args.table.resource_group, "rg");
                assert_eq!(args.table.route_table, "rt");
                assert!(args.dry_run);
                assert!(!args.json);
            }
            other => panic!("expected add, got {other:?}"),
        }
    }

    #[test]
    fn test_add_requires_tags() {
        assert!(Cli::try_parse_from(["udr", "add", "-g", "rg", "-t", "rt"]).is_err());
    }

    #[test]
    fn test_global_args_after_subcommand() {
        let cli = Cli::try_parse_from([
            "udr", "status", "-g", "rg", "-t", "rt", "--backend", "file", "--table-dir", "tables",
        ])
        .unwrap();
        assert_eq!(cli.backend.kind, Some(BackendKind::File));
        assert_eq!(cli.backend.table_dir, Some(PathBuf::from("tables")));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(Cli::try_parse_from(["udr", "--backend", "s3", "tags"]).is_err());
    }

    #[test]
    fn test_download_page_flag() {
        let cli = Cli::try_parse_from([
            "udr", "tags", "--download-page", "https://mirror.example.test/tags.html",
        ])
        .unwrap();
        assert_eq!(
            cli.source.download_page.as_deref(),
            Some("https://mirror.example.test/tags.html")
        );
        assert_eq!(cli.source.document_url, None);
    }
}
