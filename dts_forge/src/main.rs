//! # dts-forge - TypeScript declarations from a JSON type catalog.
//!
//! Runs the generation pipeline over a catalog exported by a service (or
//! written by hand for a non-Rust host), so declarations can be produced and
//! verified in CI without starting the service.
//!
//! ```bash
//! DTS_FORGE_LOG=debug dts-forge generate --catalog catalog.json --out frontend/src/types
//! dts-forge check --catalog catalog.json --manifest service/Cargo.toml
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dts_forge::{Generator, GeneratorConfig, StaticCatalog};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generates TypeScript declaration files from API types.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Wipes the output directory and writes one declaration file per entry type.
    Generate(RunArgs),

    /// Reports files that a `generate` run would add, change or delete.
    ///
    /// Exits with an error when the output directory is out of date.
    Check(RunArgs),

    /// Prints the files a `generate` run would write.
    Plan(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// JSON type catalog to read.
    #[arg(long, env = "DTS_FORGE_CATALOG")]
    catalog: PathBuf,

    /// Output directory. Defaults to the configured `ts_output_dir`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Standalone TOML configuration file.
    #[arg(long, conflicts_with = "manifest")]
    config: Option<PathBuf>,

    /// `Cargo.toml` whose `[package.metadata.dts_forge]` table is the configuration.
    #[arg(long)]
    manifest: Option<PathBuf>,
}

impl RunArgs {
    fn load_config(&self) -> Result<GeneratorConfig> {
        if let Some(path) = &self.config {
            return GeneratorConfig::from_toml_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()));
        }

        let manifest = self
            .manifest
            .clone()
            .unwrap_or_else(|| PathBuf::from("Cargo.toml"));
        if self.manifest.is_none() && !manifest.exists() {
            return Ok(GeneratorConfig::default());
        }
        let config = GeneratorConfig::from_cargo_manifest(&manifest)
            .with_context(|| format!("Failed to read {}", manifest.display()))?;
        Ok(config.unwrap_or_default())
    }

    fn load_catalog(&self) -> Result<StaticCatalog> {
        StaticCatalog::from_json_file(&self.catalog)
            .with_context(|| format!("Failed to load catalog from {}", self.catalog.display()))
    }

    fn output_dir(&self, config: &GeneratorConfig) -> PathBuf {
        self.out
            .clone()
            .unwrap_or_else(|| config.output_dir_or_default())
    }

    fn generator(&self) -> Result<(Generator<StaticCatalog>, PathBuf)> {
        let config = self.load_config()?;
        let catalog = self.load_catalog()?;
        let out = self.output_dir(&config);
        Ok((Generator::new(catalog).config(config), out))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DTS_FORGE_LOG")
        .unwrap_or_else(|_| EnvFilter::new("dts_forge=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate(&args)?,
        Commands::Check(args) => check(&args)?,
        Commands::Plan(args) => plan(&args)?,
    }

    Ok(())
}

/// Handler for the `generate` command.
fn generate(args: &RunArgs) -> Result<()> {
    let (generator, out) = args.generator()?;
    let report = generator
        .generate(&out)
        .context("Failed to generate TypeScript declarations")?;

    println!("✅ Generated {} declaration file(s).", report.files.len());
    println!("   You can find them in: {}", out.display());
    Ok(())
}

/// Handler for the `check` command.
fn check(args: &RunArgs) -> Result<()> {
    let (generator, out) = args.generator()?;
    let drift = generator
        .check(&out)
        .context("Failed to check TypeScript declarations")?;

    if drift.is_empty() {
        println!("✅ {} is up to date.", out.display());
        return Ok(());
    }
    for item in &drift {
        println!("   {}", item);
    }
    anyhow::bail!(
        "{} is out of date ({} difference(s)); run `dts-forge generate`.",
        out.display(),
        drift.len()
    );
}

/// Handler for the `plan` command.
fn plan(args: &RunArgs) -> Result<()> {
    let (generator, out) = args.generator()?;
    let declarations = generator
        .plan()
        .context("Failed to plan TypeScript declarations")?;

    for declaration in &declarations {
        println!("{}", out.join(&declaration.path).display());
    }
    Ok(())
}
