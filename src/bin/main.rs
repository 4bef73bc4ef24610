use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use classcheck::{analyze, analyze_batch, FieldRegistry, UnitSummary};

#[derive(Parser)]
#[command(name = "classcheck")]
#[command(about = "Structural analysis of compiled classes for manipulation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze .class files and print their unit summaries
    Inspect {
        /// A .class file or a directory to scan recursively
        #[arg(value_name = "PATH")]
        input: PathBuf,

        /// Also print captured annotations and local variables
        #[arg(short, long)]
        verbose: bool,
    },

    /// Analyze a batch and print the frozen field registry
    Fields {
        /// A .class file or a directory to scan recursively
        #[arg(value_name = "PATH")]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Inspect { input, verbose } => inspect(input, *verbose),
        Commands::Fields { input } => fields(input),
    }
}

/// Collect the .class files under `input` (or `input` itself).
fn class_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(input) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().map_or(false, |ext| ext == "class")
        {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

fn inspect(input: &Path, verbose: bool) -> Result<()> {
    let registry = Arc::new(FieldRegistry::new());
    for path in class_files(input)? {
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let summary = analyze(&bytes, &registry)
            .with_context(|| format!("Failed to analyze {}", path.display()))?;
        print_summary(&summary, verbose);
    }
    Ok(())
}

fn print_summary(summary: &UnitSummary, verbose: bool) {
    println!("class {}", summary.class_name());
    println!("  version:     {}", summary.major_version());
    println!("  manipulated: {}", summary.is_already_manipulated());
    if let Some(super_class) = summary.super_class() {
        println!("  super:       {}", super_class);
    }
    for interface in summary.interfaces() {
        println!("  implements:  {}", interface);
    }
    for method in summary.methods() {
        let kind = if method.is_static() { "static " } else { "" };
        println!("  method:      {}{} {}", kind, method.name(), method.descriptor());
        if verbose {
            for annotation in method.annotations() {
                println!("    annotation: {}", annotation.desc());
            }
            for (parameter, annotations) in method.parameter_annotations() {
                for annotation in annotations {
                    println!("    param {}:    {}", parameter, annotation.desc());
                }
            }
            for local in method.local_variables() {
                println!("    local {}:    {} {}", local.index, local.name, local.descriptor);
            }
        }
    }
    for (inner, _) in summary.inner_classes_and_methods() {
        println!("  inner:       {}", inner);
    }
}

fn fields(input: &Path) -> Result<()> {
    let paths = class_files(input)?;
    let mut images = Vec::with_capacity(paths.len());
    for path in &paths {
        images.push(
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?,
        );
    }
    let units: Vec<&[u8]> = images.iter().map(Vec::as_slice).collect();

    let registry = Arc::new(FieldRegistry::new());
    analyze_batch(&units, &registry).context("Failed to analyze batch")?;

    for (owner, fields) in registry.snapshot() {
        println!("{}", owner);
        for field in fields {
            println!("  {} {} (access {:#06x})", field.descriptor, field.name, field.access);
        }
    }
    Ok(())
}
