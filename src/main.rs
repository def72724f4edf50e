use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use storefront::store::ALL_CATEGORIES;
use storefront::{
    build_store, AppConfig, CatalogViewState, CliConfig, DownloadRequestOutcome, FileConfig,
    LogNotifier, Store,
};

mod cli_style;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("STOREFRONT_GIT_HASH"),
    ")"
);

fn parse_path(s: &str) -> Result<PathBuf> {
    let path = PathBuf::from(s);
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().context("Error resolving current directory")?;
    Ok(cwd.join(path))
}

#[derive(Parser, Debug)]
#[command(name = "store-client", version = VERSION, styles = cli_style::get_styles())]
struct CliArgs {
    /// Path to a TOML config file. Values in the file override flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// URL of the JSON package catalog.
    #[clap(long)]
    pub catalog_url: Option<String>,

    /// Directory downloaded artifacts are written to.
    #[clap(long, value_parser = parse_path)]
    pub downloads_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the packages in the catalog.
    List {
        /// Only show packages in this category.
        #[clap(long, default_value = ALL_CATEGORIES)]
        category: String,
    },
    /// List the catalog categories.
    Categories,
    /// Download a package and hand it to the installer.
    Install {
        /// Package identifier, e.g. com.example.app
        package_name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialise logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let cli_config = CliConfig {
        catalog_url: cli_args.catalog_url.clone(),
        downloads_dir: cli_args.downloads_dir.clone(),
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    let notifier = Arc::new(LogNotifier::new());
    let store = build_store(&config, notifier.clone())?;

    store.load_catalog().await;
    if let CatalogViewState::Error { message } = &*store.state() {
        cli_style::print_error(message);
        bail!("Catalog unavailable at {}", config.catalog_url);
    }

    match cli_args.command {
        Command::List { category } => {
            for package in store.filter_by_category(&category) {
                cli_style::print_package(&package);
            }
        }
        Command::Categories => {
            for category in store.categories() {
                cli_style::print_category(&category);
            }
        }
        Command::Install { package_name } => {
            let result = install(&store, &notifier, &package_name).await;
            store.cancel_all();
            result?;
        }
    }

    Ok(())
}

/// Request the download of `package_name` and follow it until it is handed
/// to the installer, fails or monitoring stops.
async fn install(store: &Arc<Store>, notifier: &LogNotifier, package_name: &str) -> Result<()> {
    let Some(descriptor) = store
        .state()
        .package(package_name)
        .map(|p| p.descriptor.clone())
    else {
        bail!("Package {} is not in the catalog", package_name);
    };

    let mut notices = notifier.subscribe();
    let mut state_rx = store.subscribe();

    let transfer_id = match store.request_download(&descriptor).await {
        DownloadRequestOutcome::Started(id) => id,
        DownloadRequestOutcome::AlreadyInProgress(id) => {
            bail!("Download of {} already in progress ({:?})", package_name, id)
        }
        DownloadRequestOutcome::Rejected(e) => {
            while let Ok(notice) = notices.try_recv() {
                cli_style::print_notice(&notice);
            }
            return Err(e).context(format!("Could not download {}", package_name));
        }
    };
    info!("Following transfer {} for {}", transfer_id, package_name);

    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos:>3}%")?
            .progress_chars("=> "),
    );
    bar.set_message(descriptor.name.clone());

    let mut tick = tokio::time::interval(Duration::from_millis(250));
    loop {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let package = state_rx.borrow_and_update().package(package_name).cloned();
                match package {
                    Some(p) if p.is_downloading => bar.set_position(p.download_progress.into()),
                    _ => {
                        bar.finish_and_clear();
                        break;
                    }
                }
            }
            notice = notices.recv() => {
                if let Ok(notice) = notice {
                    bar.suspend(|| cli_style::print_notice(&notice));
                }
            }
            _ = tick.tick() => {
                if store.active_transfer(package_name).is_none()
                    && store.state().package(package_name).is_some_and(|p| p.is_downloading)
                {
                    bar.abandon();
                    warn!("Stopped following {} before it finished", package_name);
                    cli_style::print_error("Download did not finish in time");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                bar.abandon();
                info!("Interrupted");
                break;
            }
        }
    }

    loop {
        match notices.try_recv() {
            Ok(notice) => cli_style::print_notice(&notice),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }

    Ok(())
}
