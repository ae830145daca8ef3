//! crd2kcl CLI - convert Kubernetes CRDs into KCL modules organized by API version

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

mod commands;
mod error;
mod exit_codes;
mod progress;

use commands::Settings;
use progress::StepLine;

#[derive(Parser)]
#[command(name = "crd2kcl")]
#[command(version)]
#[command(about = "Convert Kubernetes CRDs into KCL schema modules organized by API version", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output (step details and converter output)
    #[arg(long, global = true)]
    debug: bool,

    /// Directory holding the generated modules
    #[arg(long, global = true, default_value = "modules", env = "CRD2KCL_MODULES_DIR")]
    modules_dir: PathBuf,

    /// Directory where discovered configurations are saved
    #[arg(long, global = true, default_value = "config", env = "CRD2KCL_CONFIG_DIR")]
    config_dir: PathBuf,

    /// Converter program, called as `<program> import -m crd <input> -o <output>`
    #[arg(long, global = true, default_value = "kcl", env = "CRD2KCL_CONVERTER")]
    converter: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the CRDs listed in a JSON configuration file
    Convert {
        /// Path to the JSON configuration
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Discover CRDs from a GitHub directory page, save the configuration, then convert
    Discover {
        /// GitHub directory URL (https://github.com/<owner>/<repo>/tree/<ref>/<dir>)
        #[arg(short, long)]
        url: String,

        /// Module name
        #[arg(short, long)]
        name: String,

        /// Only write the configuration, don't convert
        #[arg(long)]
        no_convert: bool,
    },
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    let steps = StepLine::new(cli.debug);
    init_tracing(cli.debug, steps.clone());

    let settings = Settings {
        modules_dir: cli.modules_dir,
        config_dir: cli.config_dir,
        converter: cli.converter,
        verbose: cli.debug,
        steps,
    };

    let result = match cli.command {
        Commands::Convert { config } => commands::convert::run(&config, &settings),
        Commands::Discover {
            url,
            name,
            no_convert,
        } => commands::discover::run(&url, &name, no_convert, &settings),
    };

    if let Err(err) = result {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Log to stderr through the status line so warnings are never overdrawn
fn init_tracing(debug: bool, steps: StepLine) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(steps)
        .init();
}
