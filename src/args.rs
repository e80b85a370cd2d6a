//! This module defines the command line arguments the news feed client accepts.

use std::{io::IsTerminal as _, path::PathBuf};
use termcolor::ColorChoice;


#[derive(Debug, clap::Parser)]
#[clap(about = "Terminal client for the news feed GraphQL API.")]
pub(crate) struct Args {
    #[clap(subcommand)]
    pub(crate) cmd: Command,

    /// Whether to use colors when printing to stdout/stderr: 'auto', 'always'
    /// or 'never'.
    #[clap(long, global = true, default_value = "auto", value_parser = parse_color_choice)]
    pub(crate) color: ColorChoice,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Command {
    /// Mounts the application, navigates to the given path and prints the
    /// resulting page.
    ///
    /// Exits with 1 if the page could not be rendered.
    Open {
        /// Path to navigate to, e.g. `/`, `/?category=sports` or
        /// `/article/some-slug`.
        #[clap(default_value = "/")]
        path: String,

        #[clap(flatten)]
        shared: Shared,
    },

    /// Prints the route table.
    Routes,

    /// Submits a new article.
    CreateArticle {
        #[clap(flatten)]
        args: crate::cmd::create_article::Args,

        #[clap(flatten)]
        shared: Shared,
    },

    /// Checks config, connection to the GraphQL server and whether the server
    /// API matches what this client sends.
    ///
    /// Exits with 0 if everything is Ok, and with 1 otherwise.
    Check {
        #[clap(flatten)]
        shared: Shared,
    },

    /// Outputs a template for the configuration file (which includes
    /// descriptions or all options).
    WriteConfig {
        /// Target file. If not specified, the template is written to stdout.
        target: Option<PathBuf>,
    },
}

#[derive(Debug, clap::Args)]
pub(crate) struct Shared {
    /// Path to the configuration file. If this is not specified, the client
    /// tries `NEWS_FEED_CONFIG_PATH`, `config.toml` and
    /// `/etc/news-feed/config.toml`, and otherwise uses built-in defaults.
    #[clap(short, long)]
    pub(crate) config: Option<PathBuf>,
}

impl Command {
    /// Name used for `${cmd}` in the log file path.
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open",
            Self::Routes => "routes",
            Self::CreateArticle { .. } => "create-article",
            Self::Check { .. } => "check",
            Self::WriteConfig { .. } => "write-config",
        }
    }
}

impl Args {
    pub(crate) fn stdout_color(&self) -> ColorChoice {
        resolve_auto(self.color, std::io::stdout().is_terminal())
    }

    pub(crate) fn stderr_color(&self) -> ColorChoice {
        resolve_auto(self.color, std::io::stderr().is_terminal())
    }
}

fn resolve_auto(choice: ColorChoice, is_terminal: bool) -> ColorChoice {
    match (choice, is_terminal) {
        (ColorChoice::Auto, true) => ColorChoice::Always,
        (ColorChoice::Auto, false) => ColorChoice::Never,
        (other, _) => other,
    }
}

fn parse_color_choice(s: &str) -> Result<ColorChoice, String> {
    match s {
        "auto" => Ok(ColorChoice::Auto),
        "always" => Ok(ColorChoice::Always),
        "never" => Ok(ColorChoice::Never),
        other => Err(format!("invalid color choice '{other}'")),
    }
}
