use clap::Parser;
use classprune::analysis::LivenessMode;
use classprune::config::Config;
use classprune::graph::ResolutionStrategy;
use classprune::pipeline::Pipeline;
use classprune::refactor::SafeDeleter;
use classprune::report::{ReportFormat, Reporter};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::info;

/// classprune - delete Java classes together with the code only they use
#[derive(Parser, Debug)]
#[command(name = "classprune")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the project directory to analyze
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Fully qualified name of a class to delete (can be specified multiple times)
    #[arg(short, long = "target", value_name = "FQN")]
    targets: Vec<String>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path patterns to exclude (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Namespace whose classes are never deleted (can be specified multiple times)
    #[arg(long, value_name = "NAMESPACE")]
    reserve: Vec<String>,

    /// How simple type names are matched to project classes
    #[arg(long, value_enum)]
    resolution: Option<Resolution>,

    /// Admit candidates in one pass instead of iterating until stable
    #[arg(long)]
    single_pass: bool,

    /// Worker threads for scanning and extraction (default: all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Seconds each parallel stage may take before the run fails
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file (for json format)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Delete the files of the deletable classes
    #[arg(long)]
    delete: bool,

    /// Do not ask for confirmation before deleting
    #[arg(long)]
    yes: bool,

    /// Interactive mode for deletions (confirm each file)
    #[arg(long)]
    interactive: bool,

    /// Dry run - show what would be deleted without making changes
    #[arg(long)]
    dry_run: bool,

    /// Generate undo script
    #[arg(long)]
    undo_script: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Resolution {
    CatalogSearch,
    NamespaceQualify,
}

impl From<Resolution> for ResolutionStrategy {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::CatalogSearch => ResolutionStrategy::CatalogSearch,
            Resolution::NamespaceQualify => ResolutionStrategy::NamespaceQualify,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default)]
enum OutputFormat {
    #[default]
    Terminal,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => ReportFormat::Terminal,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    info!("classprune v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config(&cli)?;

    let analysis = Pipeline::new(&config)
        .with_progress(!cli.quiet)
        .run(&cli.path)
        .into_diagnostic()?;

    Reporter::new(config.report.format, cli.output.clone())
        .with_retained(config.report.show_retained)
        .report(&analysis)?;

    if !cli.delete && !cli.dry_run {
        return Ok(());
    }

    let plan = analysis.plan(&config);

    if !plan.shared.is_empty() {
        println!();
        println!("{}", "Files left in place (they also declare surviving classes):".yellow());
        for shared in &plan.shared {
            println!(
                "  {} {} {}",
                "!".yellow(),
                shared.path.display(),
                format!("(keeps {})", shared.surviving.join(", ")).dimmed()
            );
        }
    }

    if !cli.dry_run && !cli.yes && !cli.interactive && !plan.is_empty() {
        println!();
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete {} files?", plan.len()))
            .default(false)
            .interact()
            .into_diagnostic()?;

        if !confirmed {
            println!("{}", "Deletion cancelled.".yellow());
            return Ok(());
        }
    }

    let deleter = SafeDeleter::new(cli.interactive, cli.dry_run, cli.undo_script.clone());
    let summary = deleter.execute(&plan)?;
    info!(
        "Deletion finished: {} deleted, {} already gone, {} failed",
        summary.deleted.len(),
        summary.already_gone.len(),
        summary.failed.len()
    );

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        // Try to load from default locations
        Config::from_default_locations(&cli.path)?
    };

    // Override with CLI arguments
    config.targets.extend(cli.targets.iter().cloned());
    config.exclude.extend(cli.exclude.iter().cloned());
    config.reserved_namespaces.extend(cli.reserve.iter().cloned());

    if let Some(resolution) = cli.resolution {
        config.resolution = resolution.into();
    }
    if cli.single_pass {
        config.liveness = LivenessMode::SinglePass;
    }
    if let Some(threads) = cli.threads {
        config.workers.threads = Some(threads);
    }
    if let Some(timeout) = cli.timeout {
        config.workers.timeout_secs = timeout;
    }
    if let Some(format) = cli.format {
        config.report.format = format.into();
    }

    Ok(config)
}
