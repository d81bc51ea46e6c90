use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use locale_router::config::load_config;
use locale_router::{LocaleRouter, RequestView};

#[derive(Parser)]
#[command(name = "locale-cli")]
#[command(about = "Offline tooling for the locale router", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file
    Check {
        /// Path to the TOML configuration file
        config: PathBuf,
    },
    /// Resolve one synthetic request and print the outcome as JSON
    Resolve {
        /// Path to the TOML configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Absolute request URL, e.g. https://example.com/de/about
        url: String,

        /// Value of the locale cookie
        #[arg(long)]
        cookie: Option<String>,

        /// Raw Accept-Language header
        #[arg(long)]
        accept_language: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config } => match load_config(&config) {
            Ok(config) => {
                let summary = json!({
                    "valid": true,
                    "locales": config.routing.locales,
                    "default_locale": config.routing.default_locale,
                    "locale_prefix": config.routing.locale_prefix.as_str(),
                    "domains": config.routing.domains.len(),
                    "pathnames": config.routing.pathnames.len(),
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Resolve {
            config,
            url,
            cookie,
            accept_language,
        } => {
            let config = load_config(&config)?;
            let router = LocaleRouter::new(&config.routing)?;

            let mut request = RequestView::from_url(&url)?;
            if let Some(cookie) = cookie {
                request = request.with_cookie(cookie);
            }
            if let Some(header) = accept_language {
                request = request.with_accept_language(&header);
            }

            let outcome = router.route(&request);
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}
