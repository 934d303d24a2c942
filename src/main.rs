mod checks;
mod collect;
mod commands;
mod core;
mod model;
mod release;
mod source;
mod ui;

use clap::{Parser, Subcommand};
use core::error::{ProgressError, print_error};
use core::format::DocumentFormat;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Track release progress across a multi-repository meta-release program
#[derive(Parser)]
#[command(name = "release-progress")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Enable debug logging (overrides RELEASE_PROGRESS_LOG)
  #[arg(long, global = true)]
  debug: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Derive release states, milestones and warnings for every scheduled API
  Collect {
    /// Master schedule file (YAML or JSON)
    #[arg(long, short = 's')]
    schedule: PathBuf,
    /// Config file (default: progress.toml, .progress.toml or .config/progress.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
    /// Read artifacts from a snapshot file instead of GitHub
    #[arg(long)]
    artifacts: Option<PathBuf>,
    /// Write the progress document to this path
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
    /// Output format (default: from the output file extension)
    #[arg(long, value_enum)]
    format: Option<DocumentFormat>,
    /// Repositories fetched in parallel (overrides config)
    #[arg(long)]
    concurrency: Option<usize>,
    /// Global deadline in seconds, 0 for none (overrides config)
    #[arg(long)]
    timeout: Option<u64>,
    /// Print the document as JSON to stdout
    #[arg(long)]
    json: bool,
  },
  /// Validate an existing progress document
  Validate {
    /// Progress document (YAML or JSON)
    document: PathBuf,
    /// Output as JSON
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  let yellow = anstyle::Color::Ansi(anstyle::AnsiColor::Yellow);
  let green = anstyle::Color::Ansi(anstyle::AnsiColor::Green);
  let red = anstyle::Color::Ansi(anstyle::AnsiColor::Red);

  clap::builder::Styles::styled()
    .usage(anstyle::Style::new().bold().underline().fg_color(Some(yellow)))
    .header(anstyle::Style::new().bold().underline().fg_color(Some(yellow)))
    .literal(anstyle::Style::new().fg_color(Some(green)))
    .invalid(anstyle::Style::new().bold().fg_color(Some(red)))
    .error(anstyle::Style::new().bold().fg_color(Some(red)))
    .valid(anstyle::Style::new().bold().underline().fg_color(Some(green)))
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Initialize tracing from RELEASE_PROGRESS_LOG (default "info"), logging to stderr
fn init_tracing(debug: bool) {
  let filter = if debug {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_env("RELEASE_PROGRESS_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
  };

  tracing_subscriber::registry()
    .with(filter)
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.debug);

  let result = match cli.command {
    Commands::Collect {
      schedule,
      config,
      artifacts,
      output,
      format,
      concurrency,
      timeout,
      json,
    } => commands::run_collect(commands::CollectArgs {
      schedule,
      config,
      artifacts,
      output,
      format,
      concurrency,
      timeout,
      json,
    }),
    Commands::Validate { document, json } => commands::run_validate(&document, json),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ProgressError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
