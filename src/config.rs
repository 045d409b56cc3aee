use clap::{Args, Parser, Subcommand};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Config file picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "qna-board.yaml";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// Base URL of the board server
    #[arg(long, env = "QNA_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Accept every confirmation prompt
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load the sidebar and topbar and show the unread badges
    Chrome,
    /// Load the topbar and click its logout button
    Logout,
    /// Edit a post through its edit dialog
    Edit {
        post_id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a post
    Delete { post_id: String },
    /// Answer a post through the reply dialog
    Reply {
        post_id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
}

/// Form input typed into a dialog before it is submitted.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldArgs {
    /// Field value, repeatable
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// File attachment, repeatable
    #[arg(long = "attach", value_name = "NAME=PATH", value_parser = parse_assignment)]
    pub attach: Vec<(String, String)>,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got `{raw}`")),
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub client: ClientSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    /// Where the user lands after deleting a post.
    pub listing_path: String,
    /// Where the user lands after logging out.
    pub home_path: String,
    pub assume_yes: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub json: bool,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Self::resolve(&cli)
    }

    /// Layer defaults, config file, `QNA_` environment and CLI flags.
    ///
    /// Priority: CLI flag > environment > config file > defaults.
    pub fn resolve(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("client.base_url", "http://127.0.0.1:8000")?
            .set_default("client.listing_path", "/qna")?
            .set_default("client.home_path", "/")?
            .set_default("client.assume_yes", false)?
            .set_default("logging.json", false)?
            .set_default("logging.filter", "info")?;

        if let Some(path) = &cli.config {
            builder = builder.add_source(File::with_name(path));
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));
        }

        // E.g. QNA_CLIENT__BASE_URL=http://board.local
        builder = builder.add_source(
            Environment::with_prefix("QNA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(base_url) = &cli.base_url {
            builder = builder.set_override("client.base_url", base_url.as_str())?;
        }
        if cli.yes {
            builder = builder.set_override("client.assume_yes", true)?;
        }
        if cli.log_json {
            builder = builder.set_override("logging.json", true)?;
        }

        builder.build()?.try_deserialize()
    }
}
