//! git-objects - query the object graph of a git repository
//!
//! # Usage
//! ```bash
//! git-objects /path/to/repo default-branch
//! git-objects /path/to/repo log refs/heads/master -n 20
//! git-objects /path/to/repo last-updated
//! git-objects /path/to/repo ls-tree <commit-or-tree-id>
//! ```

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use git_objects::models::Tree;
use git_objects::{AccessorConfig, HistoryStrategy, Repository};

/// Query commits, trees, blobs and references of a git repository
#[derive(Parser)]
#[command(name = "git-objects")]
#[command(about = "Typed access to a git repository's objects", long_about = None)]
struct Cli {
    /// Path to the git repository
    #[arg(value_name = "REPO_PATH")]
    repo_path: PathBuf,

    /// JSON file with accessor settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the history walk strategy
    #[arg(long, value_enum)]
    history_strategy: Option<StrategyArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum StrategyArg {
    Revwalk,
    GitLog,
}

impl From<StrategyArg> for HistoryStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Revwalk => HistoryStrategy::Revwalk,
            StrategyArg::GitLog => HistoryStrategy::GitLog,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the detected default branch
    DefaultBranch,
    /// List every reference
    Refs,
    /// List the tip commit of every reference
    Tips,
    /// Print the newest committer time across all references
    LastUpdated,
    /// Print commits reachable from a start point, newest first
    Log {
        /// Reference name or commit id
        start: String,
        /// Maximum number of commits
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
    /// Show a single commit
    Show { id: String },
    /// List a tree, given a tree or commit id
    LsTree { id: String },
    /// Write a blob's content to stdout
    CatBlob { id: String },
    /// Show an annotated tag object
    Tag { id: String },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn tree_for(repo: &Repository, id: &str) -> anyhow::Result<Tree> {
    match repo.get_tree(id).await {
        Ok(tree) => Ok(tree),
        Err(err) if err.is_not_found() => Ok(repo.get_commit(id).await?.tree().await?),
        Err(err) => Err(err.into()),
    }
}

async fn run(cli: Cli, repo: Repository) -> anyhow::Result<()> {
    match cli.command {
        Commands::DefaultBranch => print_json(&repo.get_default_branch().await?),
        Commands::Refs => print_json(&repo.get_all_references().await?),
        Commands::Tips => print_json(&repo.get_all_reference_tip_commits().await?),
        Commands::LastUpdated => {
            println!("{}", repo.get_last_updated_time().await?.to_rfc3339());
            Ok(())
        }
        Commands::Log { start, limit } => {
            for commit in repo.get_history_commits(&start, limit).await? {
                println!(
                    "{} {} {}",
                    commit.id.short(7),
                    commit.time().format("%Y-%m-%d %H:%M:%S"),
                    commit.summary()
                );
            }
            Ok(())
        }
        Commands::Show { id } => print_json(&repo.get_commit(&id).await?),
        Commands::LsTree { id } => {
            let tree = tree_for(&repo, &id).await?;
            for entry in &tree.entries {
                let kind = if entry.is_directory() { "tree" } else { "blob" };
                println!("{:06o} {} {}\t{}", entry.mode, kind, entry.id, entry.name);
            }
            Ok(())
        }
        Commands::CatBlob { id } => {
            let blob = repo.get_blob(&id).await?;
            std::io::stdout().write_all(blob.data())?;
            Ok(())
        }
        Commands::Tag { id } => print_json(&repo.get_tag(&id).await?),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing (quiet unless RUST_LOG says otherwise)
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &cli.config {
        Some(path) => AccessorConfig::load(path)?,
        None => AccessorConfig::default(),
    };
    if let Some(strategy) = cli.history_strategy {
        config.history_strategy = strategy.into();
    }

    let repo = match Repository::open_with_config(&cli.repo_path, config).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("✗ Failed to open repository: {}", e);
            eprintln!("  Path: {}", cli.repo_path.display());
            std::process::exit(1);
        }
    };

    run(cli, repo).await
}
