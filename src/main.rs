use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use strings_translator::commands::{self, Source};
use strings_translator::config::Config;
use strings_translator::logging;

#[derive(Parser)]
#[command(name = "strings-translator")]
#[command(author, version, about = "Find and translate missing Android string resources", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level: error, warn, info or debug (overrides STRINGS_TRANSLATOR_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a strings-translator.json configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,

        /// Comma-separated target locales
        #[arg(short, long, default_value = "es,fr,de")]
        locales: String,

        /// Short description of the application for the translator
        #[arg(long)]
        context: Option<String>,

        /// GitHub repository as owner/repo
        #[arg(long)]
        github: Option<String>,
    },

    /// List string resources and the translations each locale is missing
    Scan {
        /// Local checkout to scan (default: current directory)
        #[arg(long, conflicts_with = "github")]
        root: Option<PathBuf>,

        /// Scan the configured GitHub repository instead
        #[arg(long)]
        github: bool,

        /// Print the full scan result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Translate missing strings and save them for publishing
    Translate {
        /// Target locale (repeatable; defaults to targetLocales from the config)
        #[arg(short, long = "locale")]
        locales: Vec<String>,

        /// Where to write the translations (default: translations.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Application description (overrides config)
        #[arg(long)]
        context: Option<String>,

        /// Local checkout to scan (default: current directory)
        #[arg(long, conflicts_with = "github")]
        root: Option<PathBuf>,

        /// Scan the configured GitHub repository instead
        #[arg(long)]
        github: bool,
    },

    /// Merge translations into locale files, locally or as a GitHub pull request
    Publish {
        /// Translations written by `translate`
        #[arg(short, long)]
        input: PathBuf,

        /// Local checkout to write to (default: current directory)
        #[arg(long, conflicts_with = "github")]
        root: Option<PathBuf>,

        /// Open a pull request on the configured GitHub repository
        #[arg(long)]
        github: bool,

        /// Show the files that would be written without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// List languages with known display names
    Languages {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref());

    // Load configuration; `init` runs before any exists
    let load_config = || Config::load_or_default(cli.config.as_ref());

    match cli.command {
        Commands::Init {
            force,
            locales,
            context,
            github,
        } => {
            commands::init::run(force, &locales, context, github)?;
        }
        Commands::Scan { root, github, json } => {
            let config = load_config()?;
            commands::scan::run(&config, Source::from_args(root, github), json)?;
        }
        Commands::Translate {
            locales,
            output,
            context,
            root,
            github,
        } => {
            let config = load_config()?;
            commands::translate::run(
                &config,
                Source::from_args(root, github),
                locales,
                output,
                context,
            )?;
        }
        Commands::Publish {
            input,
            root,
            github,
            dry_run,
        } => {
            let config = load_config()?;
            commands::publish::run(&config, Source::from_args(root, github), &input, dry_run)?;
        }
        Commands::Languages { json } => {
            commands::languages::run(json)?;
        }
    }

    Ok(())
}
