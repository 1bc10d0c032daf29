#![deny(clippy::mod_module_files)]
use std::{io, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use atomic_launcher::{Catalog, GitCli, LauncherConfig, PackageInstaller};

mod commands;

use commands::App;

#[derive(Parser)]
#[command(name = "atomic-launcher")]
#[command(version)]
#[command(about = "Install, update and launch git-hosted games", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/atomic-launcher/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Install root, overriding the config
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Games manifest, overriding the config
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show every catalog package with its install status
    List,
    /// Show details for one package
    Status { id: String },
    /// Clone a package into the install root
    Install { id: String },
    /// Bring an installed package to the catalog version
    Update {
        id: String,
        /// Update even if the recorded version already matches
        #[arg(long)]
        force: bool,
    },
    /// Delete an installed package
    Remove { id: String },
    /// Start an installed package
    Launch { id: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = LauncherConfig::load_from(cli.config.as_deref())?;
    if let Some(root) = cli.root {
        config.install_root = root;
    }
    if let Some(catalog) = cli.catalog {
        config.catalog_path = catalog;
    }
    tracing::debug!("using config {:?}", config);

    let catalog = Catalog::load(&config.catalog_path)?;
    let installer = PackageInstaller::with_tool(
        &config.install_root,
        GitCli::with_binary(&config.git_binary),
    )
    .with_context(|| format!("Failed to open install root {:?}", config.install_root))?;

    let app = App {
        config,
        catalog,
        installer: Arc::new(installer),
    };

    let mut stdout = io::stdout();
    match cli.command {
        Command::List => commands::list::handle(&*app.installer, &app.catalog, &mut stdout),
        Command::Status { id } => {
            commands::status::handle(&*app.installer, &app.catalog, &id, &mut stdout)
        }
        Command::Install { id } => commands::install::handle(&app, &id, &mut stdout),
        Command::Update { id, force } => {
            commands::update::handle(&app, &id, force, &mut stdout)
        }
        Command::Remove { id } => commands::remove::handle(&*app.installer, &id, &mut stdout),
        Command::Launch { id } => commands::launch::handle(&app, &id, &mut stdout),
    }
}
