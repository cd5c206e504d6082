use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ontodoc::{
    config::SiteConfig,
    core::{FileOutcome, SiteGenerator},
    templates::RenderConfig,
};

#[derive(Parser)]
#[command(
    name = "ontodoc",
    about = "Generate HTML documentation and CSV triple dumps for Turtle ontologies",
    long_about = None,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory searched for ontology files (overrides config)
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Root of the generated site (overrides config)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with_all = ["verbose", "debug"])]
    quiet: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate pages for every ontology under the input directory (default)
    Generate {
        /// Exit with an error if any file could not be documented
        #[arg(long)]
        strict: bool,
    },

    /// Validate configuration file
    Validate,

    /// Generate example configuration file
    GenerateConfig {
        /// Output path for configuration file
        #[arg(long, default_value = "ontodoc.yaml")]
        path: PathBuf,

        /// Configuration format (yaml or json)
        #[arg(short, long, default_value = "yaml")]
        format: ConfigFormat,
    },
}

#[derive(clap::ValueEnum, Clone)]
enum ConfigFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.debug {
        tracing::Level::TRACE
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else if cli.quiet {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stdout)
        .init();

    match cli.command {
        None => generate_command(cli.config, cli.input, cli.output, false),
        Some(Commands::Generate { strict }) => {
            generate_command(cli.config, cli.input, cli.output, strict)
        }
        Some(Commands::Validate) => validate_command(cli.config),
        Some(Commands::GenerateConfig { path, format }) => generate_config_command(path, format),
    }
}

fn load_config(
    config_path: Option<PathBuf>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<SiteConfig> {
    let mut config = match config_path {
        Some(path) => SiteConfig::from_file(&path)?,
        None => SiteConfig::default(),
    };

    // Override settings if provided
    if let Some(input) = input {
        config.input_dir = input;
    }
    if let Some(output) = output {
        config.output_dir = output;
    }

    config.validate()?;
    Ok(config)
}

fn generate_command(
    config_path: Option<PathBuf>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    strict: bool,
) -> Result<()> {
    let config = load_config(config_path, input, output)?;
    let generator = SiteGenerator::new(config, RenderConfig::today())?;

    let summary = generator.generate_all()?;

    println!("\n{}", " Generation Summary".bright_green().bold());
    println!(
        " Documented: {}",
        summary.documented().to_string().bright_cyan()
    );
    println!(" Not ontologies: {}", summary.not_ontologies());
    println!(" Processing time: {:.2}s", summary.processing_time_seconds);

    for report in &summary.files {
        if let FileOutcome::Documented { html, .. } = &report.outcome {
            println!("   {}", html.display().to_string().bright_green());
        }
    }

    if summary.failed() > 0 {
        println!(
            " {} {} file(s):",
            "Failed".bright_red(),
            summary.failed()
        );
        for (source, message) in summary.failures() {
            println!("   {}: {}", source.display().to_string().bright_red(), message);
        }
        if strict {
            anyhow::bail!("{} file(s) could not be documented", summary.failed());
        }
    } else {
        println!(" {} completed successfully!", "Generation".bright_green());
    }

    Ok(())
}

fn validate_command(config_path: Option<PathBuf>) -> Result<()> {
    println!("{}", " Validating configuration...".bright_blue().bold());

    let Some(path) = config_path else {
        anyhow::bail!("No configuration file given; pass one with --config");
    };

    match SiteConfig::from_file(&path) {
        Ok(config) => match config.validate() {
            Ok(()) => {
                println!(" Configuration is valid!");
                println!(" Input: {}", config.input_dir.display());
                println!(" Output: {}", config.output_dir.display().to_string().bright_green());
                println!(" Published at: {}", config.html_root_url);
                match config.template {
                    Some(ref template) => println!(" Template: {}", template.display()),
                    None => println!(" Template: built-in"),
                }
                Ok(())
            }
            Err(e) => {
                println!(" Configuration validation failed: {}", e.to_string().bright_red());
                Err(e)
            }
        },
        Err(e) => {
            println!(" Failed to load configuration: {}", e.to_string().bright_red());
            Err(e)
        }
    }
}

fn generate_config_command(output_path: PathBuf, format: ConfigFormat) -> Result<()> {
    println!("{}", " Generating example configuration...".bright_blue().bold());

    let config = SiteConfig::example();
    let content = match format {
        ConfigFormat::Yaml => serde_yaml::to_string(&config)?,
        ConfigFormat::Json => serde_json::to_string_pretty(&config)?,
    };

    std::fs::write(&output_path, content)?;

    println!(
        " Example configuration generated at: {}",
        output_path.display().to_string().bright_green()
    );
    println!(" Edit the file to customize for your use case");

    Ok(())
}
