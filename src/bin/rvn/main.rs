//! rvn CLI tool
//!
//! Command-line front end for raven-core.
//!
//! ## Commands
//!
//! - `parse <files>...`: parse markdown files and print their object graphs
//!
//! Directory roots come from the vault's config file unless overridden with `--objects-root` or
//! `--pages-root`. A file that fails to read or parse is reported on stderr and skipped; the
//! exit status is non-zero if any file failed.

use clap::{Parser, Subcommand};
use raven_core::{parse, ParseOptions, ParsedDocument, RavenError, VaultConfig};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rvn")]
#[command(author, version, about = "Parse markdown vault documents into object graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one or more markdown files and print the objects, traits and refs found
    Parse {
        /// Markdown files to parse
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Vault root; file IDs are derived relative to it
        #[arg(long, default_value = ".")]
        vault: PathBuf,

        /// Directory objects live in (overrides the vault config)
        #[arg(long)]
        objects_root: Option<String>,

        /// Directory pages live in (overrides the vault config)
        #[arg(long)]
        pages_root: Option<String>,

        /// Print the parsed documents as JSON
        #[arg(long)]
        json: bool,

        /// List every object, trait and ref
        #[arg(short, long)]
        verbose: bool,
    },
}

fn parse_file(path: &Path, vault: &Path, options: &ParseOptions) -> Result<ParsedDocument, RavenError> {
    let content = std::fs::read_to_string(path)?;
    let doc = parse(
        &content,
        &path.to_string_lossy(),
        &vault.to_string_lossy(),
        options,
    )?;
    Ok(doc)
}

fn print_summary(doc: &ParsedDocument, verbose: bool) {
    println!(
        "{}: {} objects, {} traits, {} refs",
        doc.file_path,
        doc.objects.len(),
        doc.traits.len(),
        doc.refs.len()
    );
    if !verbose {
        return;
    }
    for obj in &doc.objects {
        let end = obj.line_end.map_or_else(|| "EOF".to_string(), |end| end.to_string());
        println!("  {} [{}] lines {}-{}", obj.id, obj.object_type, obj.line_start, end);
    }
    for found in &doc.traits {
        let value = found.value.as_ref().map(|v| format!("({v})")).unwrap_or_default();
        println!(
            "  @{}{} line {} -> {}",
            found.trait_name, value, found.line, found.parent_object_id
        );
    }
    for found in &doc.refs {
        println!("  [[{}]] line {} <- {}", found.target_raw, found.line, found.source_id);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            files,
            vault,
            objects_root,
            pages_root,
            json,
            verbose,
        } => {
            let mut options = VaultConfig::load(&vault)?.parse_options();
            if objects_root.is_some() {
                options.objects_root = objects_root;
            }
            if pages_root.is_some() {
                options.pages_root = pages_root;
            }
            tracing::debug!("Parse options: {:?}", options);

            let mut docs = Vec::with_capacity(files.len());
            let mut failures = 0usize;
            for path in &files {
                match parse_file(path, &vault, &options) {
                    Ok(doc) => docs.push(doc),
                    Err(e) => {
                        failures += 1;
                        eprintln!("Error: {}: {e}", path.display());
                    }
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&docs)?);
            } else {
                for doc in &docs {
                    print_summary(doc, verbose);
                }
            }

            if failures > 0 {
                eprintln!("{failures} of {} files failed", files.len());
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
