//! Bstalk CLI entrypoint.
//!
//! This is the main entrypoint for the bstalk command-line tool.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use bstalk::artifact::{ArtifactBundle, ArtifactStore, S3ArtifactStore};
use bstalk::cfn::StackEngine;
use bstalk::cli::{Cli, Commands, OutputFormatter};
use bstalk::config::{find_config_file, ConfigParser, ConfigValidator, DeployConfig};
use bstalk::error::{BstalkError, Result, SubmitError};
use bstalk::manifest::ManifestBuilder;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);

    match cli.command {
        Commands::Init { path, force } => cmd_init(&path, force),
        Commands::Validate { warnings } => cmd_validate(cli.config.as_ref(), warnings),
        Commands::Synth { out, compact } => cmd_synth(cli.config.as_ref(), out, compact),
        Commands::Deploy { yes } => cmd_deploy(cli.config.as_ref(), yes, &formatter).await,
        Commands::Status => cmd_status(cli.config.as_ref(), &formatter).await,
    }
}

/// Initialize a new project.
fn cmd_init(path: &PathBuf, force: bool) -> Result<()> {
    info!("Initializing new bstalk project in: {}", path.display());

    let config_path = path.join("bstalk.deploy.yaml");
    let env_path = path.join(".env.example");
    let gitignore_path = path.join(".gitignore");

    // Check if files exist
    if !force && config_path.exists() {
        eprintln!("Configuration file already exists: {}", config_path.display());
        eprintln!("Use --force to overwrite.");
        return Ok(());
    }

    // Create directory if needed
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }

    // Write config template
    let config_template = include_str!("../templates/bstalk.deploy.yaml");
    std::fs::write(&config_path, config_template)?;
    eprintln!("Created: {}", config_path.display());

    // Write .env.example
    let env_template = include_str!("../templates/.env.example");
    std::fs::write(&env_path, env_template)?;
    eprintln!("Created: {}", env_path.display());

    // Write/update .gitignore
    if gitignore_path.exists() {
        let existing = std::fs::read_to_string(&gitignore_path)?;
        if !existing.contains(".env") {
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(&gitignore_path)?;
            writeln!(file, "\n# Bstalk")?;
            writeln!(file, ".env")?;
            eprintln!("Updated: {}", gitignore_path.display());
        }
    } else {
        std::fs::write(&gitignore_path, ".env\n")?;
        eprintln!("Created: {}", gitignore_path.display());
    }

    eprintln!("\nProject initialized successfully!");
    eprintln!("Next steps:");
    eprintln!("  1. Copy .env.example to .env and fill in your AWS credentials");
    eprintln!("  2. Edit bstalk.deploy.yaml with your application settings");
    eprintln!("  3. Run 'bstalk validate' to check your configuration");
    eprintln!("  4. Run 'bstalk synth' to inspect the generated template");
    eprintln!("  5. Run 'bstalk deploy' to deploy your application");

    Ok(())
}

/// Validate configuration.
fn cmd_validate(config_path: Option<&PathBuf>, show_warnings: bool) -> Result<()> {
    let config_file = resolve_config_path(config_path)?;
    info!("Validating configuration: {}", config_file.display());

    let config = load_config(&config_file)?;

    let validator = ConfigValidator::new();
    let result = validator.validate(&config)?;

    if result.is_valid() {
        eprintln!("Configuration is valid!");
        if show_warnings && !result.warnings.is_empty() {
            eprintln!("\nWarnings:");
            for warning in &result.warnings {
                eprintln!("  - {warning}");
            }
        }
    }

    // Show summary
    eprintln!("\nConfiguration summary:");
    eprintln!("  Application: {}", config.application.name);
    eprintln!("  Environment: {}", config.environment_name());
    eprintln!("  Stack: {}", config.stack_name());
    eprintln!("  Bundle: {}", config.artifact.path.display());
    eprintln!("  Platform: {}", config.platform.solution_stack);
    eprintln!(
        "  Instances: {}-{} x {}",
        config.scaling.min_instances, config.scaling.max_instances, config.scaling.instance_types
    );

    Ok(())
}

/// Assemble the manifest and print the template without submitting.
fn cmd_synth(config_path: Option<&PathBuf>, out: Option<PathBuf>, compact: bool) -> Result<()> {
    let config_file = resolve_config_path(config_path)?;
    let config = load_and_validate_config(&config_file)?;

    // The bundle must exist so its content-addressed key can be derived,
    // but nothing is uploaded here.
    let bundle = ArtifactBundle::from_path(&config.artifact.path)?;
    let location = bundle.location_in(&config.artifact.bucket, config.artifact.prefix.as_deref());

    let manifest = ManifestBuilder::new(&config).build(&location)?;

    let body = if compact {
        manifest.template.to_json()?
    } else {
        manifest.template.to_json_pretty()?
    };

    if let Some(out_path) = out {
        std::fs::write(&out_path, &body)?;
        eprintln!("Template written to: {}", out_path.display());
    } else {
        println!("{body}");
    }

    Ok(())
}

/// Upload the bundle and submit the manifest to the engine.
async fn cmd_deploy(
    config_path: Option<&PathBuf>,
    auto_approve: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let config_file = resolve_config_path(config_path)?;
    let config = load_and_validate_config(&config_file)?;

    // Reference and upload the bundle. The content-addressed key makes this
    // a no-op when the same archive was uploaded before.
    let bundle = ArtifactBundle::from_path(&config.artifact.path)?;
    eprintln!(
        "Bundle: {} ({} bytes, {})",
        bundle.path().display(),
        bundle.size_bytes(),
        bundle.short_hash()
    );

    let store = S3ArtifactStore::new(
        &config.artifact.bucket,
        config.artifact.prefix.as_deref(),
        artifact_region(&config),
    )
    .await;
    let location = store.upload(&bundle).await?;

    let manifest = ManifestBuilder::new(&config).build(&location)?;

    // Show what will be submitted
    let output = formatter.format_manifest(&manifest);
    eprintln!("{output}");

    // Confirm
    if !auto_approve {
        eprint!("Submit this manifest? [y/N]: ");
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            eprintln!("Deployment cancelled.");
            return Ok(());
        }
    }

    let engine = StackEngine::new(config.stack.region.as_deref()).await;
    match engine.submit(&manifest).await {
        Ok(outcome) => {
            eprintln!("{}", formatter.format_outcome(&manifest.stack_name, &outcome));
            Ok(())
        }
        Err(BstalkError::Submit(SubmitError::NoChanges { stack_name })) => {
            eprintln!("Stack '{stack_name}' is already up to date.");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Show deployment status.
async fn cmd_status(config_path: Option<&PathBuf>, formatter: &OutputFormatter) -> Result<()> {
    let config_file = resolve_config_path(config_path)?;
    let config = load_config(&config_file)?;
    let stack_name = config.stack_name();

    let engine = StackEngine::new(config.stack.region.as_deref()).await;
    let summary = engine.status(&stack_name).await?;

    let output = formatter.format_status(&stack_name, summary.as_ref());
    eprintln!("{output}");

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Resolves the configuration file path.
fn resolve_config_path(config_path: Option<&PathBuf>) -> Result<PathBuf> {
    config_path.map_or_else(|| find_config_file("."), |path| Ok(path.clone()))
}

/// Loads configuration with .env and environment overrides applied.
fn load_config(config_file: &PathBuf) -> Result<DeployConfig> {
    debug!("Loading configuration from: {}", config_file.display());

    let parser = ConfigParser::new().with_base_path(
        config_file
            .parent()
            .unwrap_or_else(|| std::path::Path::new(".")),
    );
    parser.load_dotenv()?;

    parser.load_with_env(config_file)
}

/// Loads and validates configuration.
fn load_and_validate_config(config_file: &PathBuf) -> Result<DeployConfig> {
    let config = load_config(config_file)?;

    let validator = ConfigValidator::new();
    validator.validate(&config)?;

    Ok(config)
}

/// Region to use for artifact uploads, falling back to the stack region.
fn artifact_region(config: &DeployConfig) -> Option<&str> {
    config
        .artifact
        .region
        .as_deref()
        .or(config.stack.region.as_deref())
}
