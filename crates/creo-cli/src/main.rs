mod config;
mod render;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use creo_core::VersionStore;
use creo_installer::{
    read_local_store, HttpFetcher, InstallLayout, Installer, LaunchOutcome, PackageFetcher,
    RunOutcome,
};
use creo_planner::{plan, UpdatePlan};
use tracing_subscriber::EnvFilter;

use crate::config::{resolve_root, LauncherConfig};
use crate::render::{current_output_style, render_status_line, OutputStyle, TerminalPresenter};

const LOG_ENV: &str = "CREO_LOG";

#[derive(Parser, Debug)]
#[command(name = "creo-launcher")]
#[command(about = "Keeps a Creo installation up to date and launches it", long_about = None)]
struct Cli {
    /// Install root; defaults to the current directory.
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Update server base URL.
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Launcher config file; defaults to `<root>/launcher.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download and install every package with a newer remote version.
    Check,
    /// Re-run an update after a failed download.
    Retry,
    /// Start the game, updating first when needed.
    Launch,
    /// Show installed packages and pending updates without installing.
    Status,
    /// Print the directories the launcher installs into.
    Paths,
    Completions {
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run_cli(cli)
}

fn run_cli(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        return write_completions_script(shell, &mut std::io::stdout());
    }

    let root = resolve_root(cli.root.clone())?;
    let config = resolve_config(&cli, &root)?;
    let layout = config.layout(&root);
    let style = current_output_style();

    match cli.command {
        Commands::Check | Commands::Retry => {
            let installer = build_installer(&config, layout, style)?;
            let outcome = match cli.command {
                Commands::Retry => installer.retry(),
                _ => installer.check_for_updates(),
            };
            print_lines(&format_run_outcome_lines(
                &outcome,
                installer.version_label().as_deref(),
                style,
            ));
            ensure_run_succeeded(&outcome)?;
        }
        Commands::Launch => {
            let installer = build_installer(&config, layout, style)?;
            let mut outcome = installer.launch_if_ready()?;
            if let LaunchOutcome::CheckStarted(run) = &outcome {
                print_lines(&format_run_outcome_lines(
                    run,
                    installer.version_label().as_deref(),
                    style,
                ));
                ensure_run_succeeded(run)?;
                outcome = installer.launch_if_ready()?;
            }
            match outcome {
                LaunchOutcome::Launched { pid } => {
                    println!(
                        "{}",
                        render_status_line(style, "ok", &format!("launched game (pid {pid})"))
                    );
                }
                LaunchOutcome::CheckStarted(_) => {
                    return Err(anyhow!(
                        "game is not installed at {}",
                        installer.layout().application_path().display()
                    ));
                }
            }
        }
        Commands::Status => {
            let local = read_local_store(&layout)?;
            let fetcher = build_fetcher(&config)?;
            let remote_text = fetcher
                .fetch_text(&config.versioning_file)
                .with_context(|| {
                    format!("failed to fetch {}", fetcher.describe(&config.versioning_file))
                })?;
            let remote = VersionStore::parse(&remote_text);
            let pending = plan(&local, &remote);
            print_lines(&format_status_lines(&local, &pending, style));
        }
        Commands::Paths => print_lines(&format_paths_lines(&layout)),
        Commands::Completions { .. } => {}
    }

    Ok(())
}

fn resolve_config(cli: &Cli, root: &Path) -> Result<LauncherConfig> {
    let mut config = LauncherConfig::load(root, cli.config.as_deref())?
        .apply_env_overrides(|name| std::env::var(name).ok())?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    Ok(config)
}

fn build_fetcher(config: &LauncherConfig) -> Result<HttpFetcher> {
    HttpFetcher::new(&config.base_url, config.timeout(), config.fetch_attempts)
}

fn build_installer(
    config: &LauncherConfig,
    layout: InstallLayout,
    style: OutputStyle,
) -> Result<Installer<HttpFetcher>> {
    let presenter = Arc::new(TerminalPresenter::new(style));
    Ok(Installer::new(layout, build_fetcher(config)?)
        .with_observer(presenter)
        .with_remote_files(&config.versioning_file, Some(config.version_file.as_str())))
}

fn ensure_run_succeeded(outcome: &RunOutcome) -> Result<()> {
    match outcome {
        RunOutcome::Failed { error, .. } => Err(anyhow!("update failed: {error}")),
        RunOutcome::AlreadyRunning => Err(anyhow!("an update is already running")),
        RunOutcome::UpToDate | RunOutcome::Installed { .. } => Ok(()),
    }
}

fn format_run_outcome_lines(
    outcome: &RunOutcome,
    version_label: Option<&str>,
    style: OutputStyle,
) -> Vec<String> {
    let mut lines = Vec::new();
    match outcome {
        RunOutcome::AlreadyRunning => {
            lines.push(render_status_line(style, "warn", "an update is already running"));
        }
        RunOutcome::UpToDate => {
            lines.push(render_status_line(style, "ok", "all packages are up to date"));
        }
        RunOutcome::Installed { installed } => {
            lines.push(render_status_line(
                style,
                "ok",
                &format!(
                    "installed {} package(s): {}",
                    installed.len(),
                    installed.join(", ")
                ),
            ));
        }
        RunOutcome::Failed { checkpointed, .. } => {
            if !checkpointed.is_empty() {
                lines.push(render_status_line(
                    style,
                    "warn",
                    &format!("kept completed packages: {}", checkpointed.join(", ")),
                ));
            }
            lines.push(render_status_line(
                style,
                "err",
                "download failed; run `creo-launcher retry` to resume",
            ));
        }
    }
    if let Some(label) = version_label {
        lines.push(format!("version: {label}"));
    }
    lines
}

fn format_status_lines(
    local: &VersionStore,
    pending: &UpdatePlan,
    style: OutputStyle,
) -> Vec<String> {
    let mut lines = Vec::new();
    if local.is_empty() {
        lines.push("installed: none".to_string());
    }
    for record in local.iter() {
        lines.push(format!(
            "installed: {} v{} ({})",
            record.title(),
            record.version(),
            record.base_directory().as_str()
        ));
    }

    if pending.is_empty() {
        lines.push(render_status_line(style, "ok", "all packages are up to date"));
        return lines;
    }
    for step in &pending.steps {
        let mut line = format!(
            "pending: {} v{} ({})",
            step.package.title(),
            step.package.version(),
            step.package.payload_kind().as_str()
        );
        if !step.subsumed.is_empty() {
            let covered: Vec<&str> = step.subsumed.iter().map(|record| record.title()).collect();
            line.push_str(&format!(" covers {}", covered.join(", ")));
        }
        lines.push(line);
    }
    lines.push(render_status_line(
        style,
        "info",
        &format!("{} update(s) available", pending.len()),
    ));
    lines
}

fn format_paths_lines(layout: &InstallLayout) -> Vec<String> {
    let local_app = layout
        .local_app_dir()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|| "unavailable".to_string());
    vec![
        format!("root: {}", layout.root().display()),
        format!("downloads: {}", layout.downloads_dir().display()),
        format!("build: {}", layout.build_dir().display()),
        format!("content: {}", layout.content_dir().display()),
        format!("local app data: {local_app}"),
        format!("versioning: {}", layout.versioning_path().display()),
        format!("application: {}", layout.application_path().display()),
    ]
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn write_completions_script<W: Write>(shell: Shell, writer: &mut W) -> Result<()> {
    let mut command = Cli::command();
    clap_complete::generate(shell, &mut command, "creo-launcher", writer);
    writer
        .flush()
        .with_context(|| "failed writing generated completion script")
}

fn default_log_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// `-v` wins over the environment; otherwise `CREO_LOG`, then `RUST_LOG`.
fn log_filter(verbose: u8) -> EnvFilter {
    if verbose > 0 {
        return EnvFilter::new(default_log_directive(verbose));
    }
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_log_directive(0)))
}

fn init_tracing(verbose: u8) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
