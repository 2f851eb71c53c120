//! Command-line interface for the converter.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{ConvertOptions, Domain, JobFile, MissingIdentityPolicy};
use crate::converter::{convert, ConversionReport};
use crate::error::Result;

/// Port data converter - flatten port and country XML documents into CSV.
#[derive(Parser)]
#[command(name = "port-data-converter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert one XML document to CSV.
    Convert {
        /// Source dataset
        domain: Domain,

        /// Input XML file (default: the domain's file in the current directory)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output CSV file (default: the domain's file in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Store the flat table here and read it back before exploding
        #[arg(long)]
        intermediate: Option<PathBuf>,

        /// Skip records that lack an identity element instead of failing
        #[arg(long)]
        skip_invalid: bool,
    },

    /// Run the conversions listed in a YAML job file, in order.
    RunJobs {
        /// Job file
        file: PathBuf,
    },

    /// List the supported domains and their default files.
    Domains,
}

impl Commands {
    /// Conversion options for a `convert` invocation.
    fn convert_options(
        domain: Domain,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        intermediate: Option<PathBuf>,
        skip_invalid: bool,
    ) -> ConvertOptions {
        let mut options = ConvertOptions::for_domain(domain);
        if let Some(input) = input {
            options = options.with_input(input);
        }
        if let Some(output) = output {
            options = options.with_output(output);
        }
        if let Some(intermediate) = intermediate {
            options = options.with_intermediate(intermediate);
        }
        if skip_invalid {
            options = options.with_missing_identity(MissingIdentityPolicy::Skip);
        }
        options
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            domain,
            input,
            output,
            intermediate,
            skip_invalid,
        } => {
            let options =
                Commands::convert_options(domain, input, output, intermediate, skip_invalid);
            convert_command(&options).map(|_| ())
        }
        Commands::RunJobs { file } => run_jobs_command(&file),
        Commands::Domains => {
            domains_command();
            Ok(())
        }
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Execute one conversion and print its summary.
fn convert_command(options: &ConvertOptions) -> Result<ConversionReport> {
    println!(
        "{} {} from {}",
        style("Converting").bold(),
        style(options.domain).cyan(),
        style(options.input.display()).green()
    );

    let pb = spinner();
    pb.set_message("Converting records...");

    let report = match convert(options) {
        Ok(report) => report,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    println!("  Entities: {}", report.entities);
    println!("  Sections: {}", report.section_columns.len());
    if !report.warnings.is_empty() {
        println!("  Warnings: {}", style(report.warnings.len()).yellow().bold());
        for warning in &report.warnings {
            println!("    {}", style(warning).yellow());
        }
    }
    println!(
        "{} {}",
        style("Saved to:").green().bold(),
        report.output.display()
    );

    Ok(report)
}

/// Execute every job of a job file; the first failure stops the batch.
fn run_jobs_command(file: &Path) -> Result<()> {
    let jobs = JobFile::load(file)?;
    println!(
        "{} {} job(s) from {}",
        style("Running").bold(),
        jobs.len(),
        style(file.display()).green()
    );

    for options in &jobs {
        println!();
        convert_command(options)?;
    }

    Ok(())
}

fn domains_command() {
    for domain in Domain::ALL {
        println!(
            "{} {} -> {}",
            style(format!("{domain:<18}")).cyan(),
            domain.default_input(),
            domain.default_output()
        );
    }
}
