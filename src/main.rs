//! bfactor-scene CLI
//!
//! Usage:
//!   bfactor-scene [OPTIONS] [CONFIG]
//!
//! Options:
//!   -o, --output <IMAGE>     Override the image path written by the script
//!   -s, --script <FILE>      Write the script to a file instead of stdout
//!   --check <SCRIPT>         Lint an existing command script
//!   --classify <VALUE>...    Print the color band for attribute values
//!   --print-config           Print the effective configuration as TOML
//!   -v, --verbose            Increase log verbosity (repeatable)
//!   -q, --quiet              Silence all logging
//!   -h, --help               Print help

mod logging;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::info;

use bfactor_scene::{
    check_script, render_script, LintWarning, OutputTarget, SceneConfig, SceneError,
};

#[derive(Parser)]
#[command(name = "bfactor-scene")]
#[command(about = "Generate cartoon scenes colored by per-atom B-factor bands")]
struct Cli {
    /// Scene configuration file (TOML); built-in defaults when omitted
    config: Option<PathBuf>,

    /// Override the image path written by the script
    #[arg(short, long, value_name = "IMAGE")]
    output: Option<PathBuf>,

    /// Write the generated script to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Lint an existing command script instead of generating one
    #[arg(long, value_name = "SCRIPT")]
    check: Option<PathBuf>,

    /// Print the color band each attribute value falls into
    #[arg(long, value_name = "VALUE", num_args = 1.., allow_negative_numbers = true)]
    classify: Vec<f64>,

    /// Print the effective configuration as TOML
    #[arg(long)]
    print_config: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all logging
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::setup_logging(cli.verbose, cli.quiet) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    // Lint mode does not need a scene configuration
    if let Some(path) = &cli.check {
        process::exit(run_check(path));
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    if cli.print_config {
        match config.to_toml_string() {
            Ok(text) => print!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    if !cli.classify.is_empty() {
        for value in &cli.classify {
            let band = config.palette.classify(*value);
            println!("{}\t{}\t{}", value, band.name, band.rgb);
        }
        return;
    }

    let script = match render_script(&config) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    match &cli.script {
        Some(path) => {
            if let Err(e) = fs::write(path, &script) {
                eprintln!("Error writing script '{}': {}", path.display(), e);
                process::exit(1);
            }
            info!(path = %path.display(), "wrote scene script");
        }
        None => print!("{}", script),
    }
}

fn load_config(cli: &Cli) -> Result<SceneConfig, SceneError> {
    let mut config = match &cli.config {
        Some(path) => SceneConfig::from_file(path)?,
        None => SceneConfig::default(),
    };
    if let Some(output) = &cli.output {
        config.output = OutputTarget::new(output)?;
    }
    Ok(config)
}

/// Lint a script file, returning the process exit code
fn run_check(path: &Path) -> i32 {
    let source = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            return 1;
        }
    };

    let filename = path.display().to_string();
    match check_script(&source) {
        Ok(warnings) if warnings.is_empty() => {
            info!(path = %filename, "no lint warnings");
            0
        }
        Ok(warnings) => {
            eprint!("{}", lint_report(&source, &filename, &warnings));
            2
        }
        Err(SceneError::Parse(errors)) => {
            for e in &errors {
                eprint!("{}", e.format(&source, &filename));
            }
            1
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

/// One `file:line: warning[category]: message` line per warning
fn lint_report(source: &str, filename: &str, warnings: &[LintWarning]) -> String {
    warnings
        .iter()
        .map(|w| {
            let line = source[..w.span.start].matches('\n').count() + 1;
            format!("{}:{}: warning[{}]: {}\n", filename, line, w.category, w.message)
        })
        .collect()
}
