//! wrapperaudit command-line tool.
//!
//! Audits a project's Gradle wrapper properties file, lists conflicting
//! duplicate keys, shows the loaded properties, and generates / validates
//! audit policy files.

mod render;
mod style;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use wrapperaudit_core::policy::AuditPolicy;
use wrapperaudit_core::properties::{ConsistencyChecker, PropertyMap};
use wrapperaudit_core::WrapperAuditor;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// wrapperaudit command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "wrapperaudit",
    version,
    about = "Audit a Gradle wrapper properties file"
)]
struct Cli {
    /// Project root the properties file path is resolved against.
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// Path to a TOML audit policy (defaults apply when omitted).
    #[arg(short, long, global = true)]
    policy: Option<PathBuf>,

    /// Properties file to audit, overriding the policy's `file`.
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every check and report the results.
    Check {
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List keys that appear more than once with differing values.
    Conflicts,

    /// Show the loaded properties.
    Show,

    /// Write the default policy file.
    InitPolicy {
        /// Output path for the generated policy.
        #[arg(short, long, default_value = "./wrapperaudit.toml")]
        output: PathBuf,
    },

    /// Validate the policy file given with `--policy`.
    ValidatePolicy,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    // Minimal logging for CLI
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run a command. `Ok(false)` means the command completed but found problems.
fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::InitPolicy { output } => cmd_init_policy(&output).map(|()| true),
        Commands::ValidatePolicy => cmd_validate_policy(cli.policy.as_deref()).map(|()| true),
        Commands::Check { format } => {
            let policy = load_policy(cli.policy.as_deref(), cli.file)?;
            cmd_check(&cli.root, policy, format)
        }
        Commands::Conflicts => {
            let policy = load_policy(cli.policy.as_deref(), cli.file)?;
            cmd_conflicts(&cli.root.join(&policy.file))
        }
        Commands::Show => {
            let policy = load_policy(cli.policy.as_deref(), cli.file)?;
            cmd_show(&cli.root.join(&policy.file)).map(|()| true)
        }
    }
}

// ---------------------------------------------------------------------------
// Policy helpers
// ---------------------------------------------------------------------------

fn load_policy(path: Option<&Path>, file_override: Option<PathBuf>) -> Result<AuditPolicy> {
    let mut policy = match path {
        Some(path) => {
            AuditPolicy::load_and_validate(path).context("failed to load policy file")?
        }
        None => AuditPolicy::default(),
    };
    if let Some(file) = file_override {
        debug!(file = %file.display(), "overriding properties file path");
        policy.file = file;
    }
    Ok(policy)
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_check(root: &Path, policy: AuditPolicy, format: OutputFormat) -> Result<bool> {
    let report = WrapperAuditor::new(policy).run_in(root);

    match format {
        OutputFormat::Text => print!("{}", render::report_text(&report)),
        OutputFormat::Json => {
            println!("{}", report.to_json().context("failed to serialize report")?)
        }
    }

    Ok(report.is_clean())
}

fn cmd_conflicts(path: &Path) -> Result<bool> {
    if !path.exists() {
        anyhow::bail!("{} must exist", path.display());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let conflicts = ConsistencyChecker::check_text(&text);
    print!(
        "{}",
        render::conflicts_text(&path.display().to_string(), &conflicts)
    );
    Ok(conflicts.is_empty())
}

fn cmd_show(path: &Path) -> Result<()> {
    let map = PropertyMap::load(path).context("failed to load properties")?;
    println!("{}", render::properties_table(&map));
    println!();
    println!("{} properties in {}", map.len(), path.display());
    Ok(())
}

fn cmd_init_policy(output: &Path) -> Result<()> {
    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    std::fs::write(output, AuditPolicy::default_toml()).context("failed to write policy file")?;

    println!("Default policy written to {}", output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit the policy to match your project's wrapper conventions");
    println!(
        "  2. Validate with: wrapperaudit validate-policy --policy {}",
        output.display()
    );
    println!(
        "  3. Audit with: wrapperaudit check --policy {}",
        output.display()
    );

    Ok(())
}

fn cmd_validate_policy(path: Option<&Path>) -> Result<()> {
    let path = path.context("no policy given; pass --policy <FILE>")?;
    println!("Validating policy: {}", path.display());
    println!();

    let policy = AuditPolicy::load_from_file(path).context("failed to parse policy")?;
    println!("  [OK] TOML structure is valid");

    match policy.validate() {
        Ok(()) => println!("  [OK] All values are coherent"),
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("policy validation failed");
        }
    }

    println!();
    println!("Policy summary:");
    println!("  Properties file : {}", policy.file.display());
    println!("  Merge markers   : {}", policy.merge_markers.len());
    println!("  Required keys   : {}", policy.required_keys.len());
    println!("  Boolean flags   : {}", policy.boolean_flags.len());
    println!("  Distribution URL: {}*", policy.distribution_url.prefix);
    println!(
        "  Network timeout : ({}, {}] ms",
        policy.network_timeout.min_exclusive, policy.network_timeout.max_inclusive
    );
    println!("  Pinned values   : {}", policy.expected_values.len());
    println!();
    println!("Policy is valid.");

    Ok(())
}
