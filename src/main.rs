//! Img2GE -- plot local images with GPS data onto Google Earth via a crafted KML.
//!
//! Usage:
//! ```bash
//! img2ge -r -v -o holiday.kml ~/Pictures/2014
//! ```

use clap::Parser;
use flexi_logger::{LogSpecification, Logger};
use img2ge::config::{Settings, Verbosity};
use img2ge::pipeline;
use log::{info, warn};
use std::path::PathBuf;
use std::process::ExitCode;

/// Plot local images with GPS data onto Google Earth via a crafted KML file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Recurse into subfolders
    #[arg(short = 'r', long = "recursive")]
    recursive: bool,

    /// Output filename [default: Img2GE.kml]
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Verbosity level (-vv for most verbose)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// YAML settings file; command line flags take precedence
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Abort on the first unreadable image instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Write a JSON run summary to this file
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Paths to folder(s) with image(s)
    #[arg(value_name = "PATH", required = true, num_args = 1..)]
    paths: Vec<PathBuf>,
}

impl Cli {
    fn settings(&self) -> Result<Settings, img2ge::ConfigError> {
        let mut settings = match &self.config {
            Some(path) => Settings::load_from_yaml(path)?,
            None => Settings::default(),
        };
        if self.recursive {
            settings.recursive = true;
        }
        if self.strict {
            settings.fail_fast = true;
        }
        if let Some(output) = &self.output {
            settings.output = output.clone();
        }
        Ok(settings)
    }
}

fn execute(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = cli.settings()?;
    let summary = pipeline::run(&cli.paths, &settings)?;

    if !summary.failures.is_empty() {
        warn!(
            "{} image(s) could not be read and were skipped",
            summary.failures.len()
        );
    }
    if let Some(path) = &cli.summary {
        pipeline::write_summary(&summary, path)?;
        info!("Summary saved as: {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    // clap handles --help / --version and usage errors itself
    let cli = Cli::parse();

    let verbosity = Verbosity::from_count(cli.verbose);
    let _logger = match Logger::with(
        LogSpecification::builder()
            .default(verbosity.level_filter())
            .build(),
    )
    .log_to_stderr()
    .start()
    {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("img2ge: logger unavailable: {e}");
            None
        }
    };

    // An interrupted run exits cleanly without writing output.
    if let Err(e) = ctrlc::set_handler(|| std::process::exit(0)) {
        warn!("Cannot install interrupt handler: {e}");
    }

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let program_name = std::env::args()
                .next()
                .map(PathBuf::from)
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_else(|| "img2ge".to_string());
            let indent = " ".repeat(program_name.len());
            eprintln!("{program_name}: {e}");
            eprintln!("{indent}  for help use --help");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_flags_override_defaults() {
        let cli = Cli::try_parse_from(["img2ge", "-r", "-vv", "-o", "trip.kml", "a", "b"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.paths, vec![PathBuf::from("a"), PathBuf::from("b")]);

        let settings = cli.settings().unwrap();
        assert!(settings.recursive);
        assert!(!settings.fail_fast);
        assert_eq!(settings.output, PathBuf::from("trip.kml"));
    }

    #[test]
    fn test_cli_defaults_and_required_paths() {
        let cli = Cli::try_parse_from(["img2ge", "photos"]).unwrap();
        let settings = cli.settings().unwrap();
        assert_eq!(settings.output, PathBuf::from("Img2GE.kml"));
        assert!(!settings.recursive);
        let verbosity = Verbosity::from_count(cli.verbose);
        assert_eq!(verbosity, Verbosity::Normal);
        assert_eq!(verbosity.level_filter(), log::LevelFilter::Info);

        assert!(Cli::try_parse_from(["img2ge"]).is_err());
    }
}
