use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use siteloom::config::SchemaPair;
use siteloom::model::{BuildStatus, RepositoryRef, SiteRecord, TreeNode};
use siteloom::remote::GitHubStore;
use siteloom::rename;
use siteloom::session::EditSession;
use siteloom::store::ContentStore;
use siteloom::tree::build_tree;

#[derive(Parser)]
#[command(name = "siteloom")]
#[command(about = "Edit a git-backed static site source tree", long_about = None)]
struct Cli {
    /// Repository owner
    #[arg(long, env = "SITELOOM_OWNER")]
    owner: String,

    /// Repository name
    #[arg(long, env = "SITELOOM_REPO")]
    repo: String,

    /// Branch holding the site source
    #[arg(long, default_value = "main", env = "SITELOOM_BRANCH")]
    branch: String,

    /// API token
    #[arg(long, env = "SITELOOM_TOKEN", hide_env_values = true)]
    token: String,

    /// Override the API base URL (enterprise installs)
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the virtual page tree
    Ls {
        /// Scope root (defaults to the whole tree)
        root: Option<String>,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a file's content
    Cat { path: String },

    /// Load the categorized configuration model
    Load {
        /// Path to the template's JSON Schema file
        #[arg(long)]
        schema: PathBuf,
        /// Path to the matching UI Schema file
        #[arg(long)]
        ui_schema: Option<PathBuf>,
    },

    /// Rename a file or a whole folder
    Rename {
        from: String,
        to: String,
        /// Treat the source as a folder prefix
        #[arg(long)]
        folder: bool,
        /// Allow replacing an existing destination file
        #[arg(long)]
        overwrite: bool,
    },

    /// Convert a leaf page into a page bundle with a first subpage
    Convert {
        path: String,
        child_slug: String,
        /// Content for the new subpage
        #[arg(long, default_value = "")]
        content: String,
    },

    /// Create a new page
    New {
        path: String,
        #[arg(long, default_value = "")]
        content: String,
    },

    /// Delete a file or a whole subtree
    Rm { path: String },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let repo = RepositoryRef::new(&cli.owner, &cli.repo, &cli.branch);
    let mut store = GitHubStore::new(repo, cli.token.clone()).context("build store")?;
    if let Some(url) = &cli.api_url {
        store = store.with_base_url(url);
    }

    match cli.command {
        Commands::Ls { root, json } => {
            let scope = root.unwrap_or_default();
            let listing = store.list_tree(&scope).context("list tree")?;
            let nodes = build_tree(&listing);
            if json {
                println!("{}", serde_json::to_string_pretty(&nodes)?);
            } else {
                print_nodes(&nodes, 0);
            }
        }
        Commands::Cat { path } => {
            let bytes = store.read_file(&path).context("read file")?;
            std::io::stdout().write_all(&bytes).context("write stdout")?;
        }
        Commands::Load { schema, ui_schema } => {
            let schema: serde_json::Value = serde_json::from_slice(
                &std::fs::read(&schema)
                    .with_context(|| format!("read schema {}", schema.display()))?,
            )
            .context("parse schema")?;
            let ui = match ui_schema {
                Some(path) => serde_json::from_slice(
                    &std::fs::read(&path)
                        .with_context(|| format!("read ui schema {}", path.display()))?,
                )
                .context("parse ui schema")?,
                None => serde_json::Value::Null,
            };
            let pair = SchemaPair { schema, ui };

            // The CLI stands in for the hosting service here, so the record
            // reports a ready site.
            let record = SiteRecord {
                site_id: format!("{}/{}", cli.owner, cli.repo),
                template: "custom".to_string(),
                build_status: BuildStatus::Succeeded,
                updated_at: None,
            };
            let mut session = EditSession::new(&store, record);
            let loaded = session.load_config_model(&pair).context("load config")?;
            println!("{}", serde_json::to_string_pretty(&loaded.form)?);
            for issue in &loaded.issues {
                eprintln!("warning: {}: {}", issue.path, issue.error);
            }
        }
        Commands::Rename {
            from,
            to,
            folder,
            overwrite,
        } => {
            let commit = if folder {
                rename::rename_folder(&store, &from, &to).context("rename folder")?
            } else {
                rename::rename_file(&store, &from, &to, overwrite).context("rename file")?
            };
            println!("renamed in commit {}", commit.sha);
        }
        Commands::Convert {
            path,
            child_slug,
            content,
        } => {
            let done = rename::convert_to_bundle(&store, &path, &child_slug, content.as_bytes())
                .context("convert to bundle")?;
            println!("bundle index: {}", done.index_path);
            println!("subpage:      {}", done.child_path);
        }
        Commands::New { path, content } => {
            let commit =
                rename::create_page(&store, &path, content.as_bytes()).context("create page")?;
            println!("created in commit {}", commit.sha);
        }
        Commands::Rm { path } => {
            let commit = rename::delete_path(&store, &path).context("delete")?;
            println!("deleted in commit {}", commit.sha);
        }
    }

    Ok(())
}

fn print_nodes(nodes: &[TreeNode], depth: usize) {
    for node in nodes {
        let marker = if node.index.is_some() {
            "*"
        } else if node.is_page() {
            " "
        } else {
            "/"
        };
        println!("{}{}{}", "  ".repeat(depth), node.name, marker);
        print_nodes(&node.children, depth + 1);
    }
}
