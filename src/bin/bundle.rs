//! Schema Bundle CLI
//!
//! Converts structural package files to XML Schema and bundles them into a
//! catalog fragment jar.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand, ValueEnum};
use schema_fragments::archive::read_jar_entries;
use schema_fragments::loader::{load_package, load_packages};
use schema_fragments::xsd::read_target_namespace;
use schema_fragments::{BundleConfig, Checksum, ConverterOptions, PackageOrder, SchemaConverter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-bundle")]
#[command(about = "Convert structural packages to XML Schema catalog fragments")]
struct Cli {
    /// Configuration file (defaults to schema-bundle.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a directory of packages into a fragment jar
    Archive {
        /// Directory containing package JSON files
        #[arg(short, long)]
        packages: PathBuf,
        /// Bundle symbolic name
        #[arg(short, long)]
        bundle_id: Option<String>,
        /// Directory inside the jar holding the schemas
        #[arg(long)]
        prefix: Option<String>,
        /// Output directory for the jar
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Package processing order
        #[arg(long, value_enum)]
        order: Option<OrderArg>,
        /// Convert and report without writing the jar
        #[arg(long)]
        dry_run: bool,
    },

    /// Convert a single package file to XML Schema
    Convert {
        /// Package JSON file
        package: PathBuf,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the entries of a fragment jar
    Inspect {
        /// Jar file
        jar: PathBuf,
    },

    /// Show the effective configuration or write a default one
    Config {
        /// Write the default configuration to this path
        #[arg(long)]
        init: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Namespace,
    Input,
}

impl From<OrderArg> for PackageOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Namespace => PackageOrder::Namespace,
            OrderArg::Input => PackageOrder::Input,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = BundleConfig::load_from(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Archive {
            packages,
            bundle_id,
            prefix,
            output,
            order,
            dry_run,
        } => {
            let bundle_id = bundle_id
                .or_else(|| config.bundle.id.clone())
                .ok_or_else(|| anyhow!("No bundle id given (use --bundle-id or [bundle] id)"))?;
            let prefix = prefix.unwrap_or_else(|| config.bundle.path_prefix.clone());

            let mut options = ConverterOptions::from(&config);
            if let Some(order) = order {
                options.order = order.into();
            }

            let packages = load_packages(&packages)
                .with_context(|| format!("Failed to load packages from {:?}", packages))?;
            println!("📦 Schema Bundle");
            println!("  Bundle: {}", bundle_id);
            println!("  Packages: {}", packages.len());
            println!();

            let converter = SchemaConverter::new(options);
            let (archive, report) = converter.create_archive_with_report(&packages, &bundle_id, &prefix)?;

            for entry in &report.converted {
                println!("  ✅ {} -> {}", entry.namespace, entry.path);
            }
            for skipped in &report.skipped {
                println!("  ⚠️  {} ({}): {}", skipped.name, skipped.namespace, skipped.reason);
            }
            println!();
            println!(
                "📊 {} converted, {} skipped",
                report.converted.len(),
                report.skipped.len()
            );

            if dry_run {
                println!("🔍 Dry run - not writing {}", archive.name());
                return Ok(());
            }

            let dir = output.unwrap_or_else(|| config.output_directory());
            let path = archive
                .save(&dir)
                .with_context(|| format!("Failed to write archive to {:?}", dir))?;
            println!("✅ Wrote {}", path.display());
        }

        Commands::Convert { package, output } => {
            let package = load_package(&package)?;
            let converter = SchemaConverter::new(ConverterOptions::from(&config));

            match output {
                Some(path) => {
                    let bytes = converter.convert_to_vec(&package)?;
                    fs::write(&path, bytes).with_context(|| format!("Failed to write {:?}", path))?;
                    eprintln!("✅ Wrote {}", path.display());
                }
                None => {
                    let stdout = io::stdout();
                    let mut lock = stdout.lock();
                    converter.convert(&package, &mut lock)?;
                    lock.flush()?;
                }
            }
        }

        Commands::Inspect { jar } => {
            let file = fs::File::open(&jar).with_context(|| format!("Failed to open {:?}", jar))?;
            let entries = read_jar_entries(file)?;

            println!("📦 {}", jar.display());
            for (name, content) in &entries {
                let checksum = Checksum::from_bytes(content);
                let namespace = if name.ends_with(".xsd") {
                    read_target_namespace(content)?.unwrap_or_else(|| "-".to_string())
                } else {
                    "-".to_string()
                };
                println!("  {}  {:<40} {}", &checksum.as_str()[..12], name, namespace);
            }
            println!();
            println!("  Total entries: {}", entries.len());
        }

        Commands::Config { init } => match init {
            Some(path) => {
                BundleConfig::default().save(&path)?;
                println!("✅ Wrote default configuration to {}", path);
            }
            None => {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        },
    }

    Ok(())
}
