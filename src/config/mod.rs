use std::{
    fmt, fs, io::{self, Write}, net::{Ipv4Addr, Ipv6Addr}, path::{Path, PathBuf}, str::FromStr, time::Duration,
};
use confique::Config as _;
use hyper::Uri;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::prelude::*;


/// The locations where we look for a configuration file. The first existing
/// file in this list is used.
const DEFAULT_PATHS: &[&str] = &[
    "config.toml",
    "/etc/news-feed/config.toml",
];

const CONFIG_PATH_ENV: &str = "NEWS_FEED_CONFIG_PATH";

/// Configuration for the news feed client.
///
/// All relative paths are relative to the location of this configuration file.
/// Duration values are specified as string with a unit, e.g. "27s". Valid
/// units: 'ms', 's', 'min', 'h' and 'd'.
#[derive(Debug, confique::Config)]
pub(crate) struct Config {
    #[config(nested)]
    pub(crate) graphql: crate::client::GraphQlConfig,

    #[config(nested)]
    pub(crate) app: crate::app::AppConfig,

    #[config(nested)]
    pub(crate) log: crate::logger::LogConfig,
}

/// Where a loaded configuration came from.
#[derive(Debug)]
pub(crate) enum ConfigSource {
    File(PathBuf),
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "'{}'", path.display()),
            Self::Defaults => f.write_str("built-in defaults"),
        }
    }
}

impl Config {
    /// Tries to find a config file by checking `NEWS_FEED_CONFIG_PATH` and
    /// the list of default locations. If the environment variable is not set
    /// and no file exists, the built-in defaults are used.
    pub(crate) fn from_env_or_default_locations() -> Result<(Self, ConfigSource)> {
        let path = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => DEFAULT_PATHS.iter().map(PathBuf::from).find(|p| p.exists()),
        };

        match path {
            Some(path) => {
                let config = Self::load_from(&path)
                    .context(format!("failed to load configuration from '{}'", path.display()))?;
                Ok((config, ConfigSource::File(path)))
            }
            None => {
                let config = Self::builder()
                    .load()
                    .context("failed to build configuration from defaults")?;
                Ok((config, ConfigSource::Defaults))
            }
        }
    }

    /// Loads the configuration from a specific TOML file.
    pub(crate) fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Config::from_file(path)
            .context(format!("failed to read config file '{}'", path.display()))?;

        config.fix_paths(path)?;

        Ok(config)
    }

    /// Goes through all paths in the configuration and changes relative paths
    /// to be absolute based on the path of the configuration file itself.
    fn fix_paths(&mut self, config_path: &Path) -> Result<()> {
        let absolute_config_path = config_path.canonicalize()
            .context("failed to canonicalize config path")?;
        let base = absolute_config_path.parent()
            .ok_or_else(|| anyhow!("config file path has no parent"))?;

        if let Some(p) = &mut self.log.file {
            if p.is_relative() {
                *p = base.join(&p);
            }
        }

        Ok(())
    }
}

/// Writes the generated TOML config template file to the given destination or
/// stdout.
pub(crate) fn write_template(path: Option<&PathBuf>) -> Result<()> {
    use confique::toml::FormatOptions;

    info!(
        "Writing configuration template to '{}'",
        path.map(|p| p.display().to_string()).unwrap_or("<stdout>".into()),
    );

    let mut options = FormatOptions::default();
    options.general.nested_field_gap = 2;
    let template = confique::toml::template::<Config>(options);
    match path {
        Some(path) => fs::write(path, template)?,
        None => io::stdout().write_all(template.as_bytes())?,
    }

    Ok(())
}

/// Our custom format for durations. We allow a couple useful units and require
/// a unit to increase readability of config files.
pub(crate) fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let s = String::deserialize(deserializer)?;
    parse_duration(&s).map_err(D::Error::custom)
}

fn parse_duration(s: &str) -> Result<Duration, String> {
    // Allow unit-less zeroes
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let start_unit = s.find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| "no time unit for duration".to_owned())?;
    let (num, unit) = s.split_at(start_unit);
    let num: u32 = num.parse()
        .map_err(|e| format!("invalid integer for duration: {e}"))?;
    let num: u64 = num.into();

    match unit {
        "ms" => Ok(Duration::from_millis(num)),
        "s" => Ok(Duration::from_secs(num)),
        "min" => Ok(Duration::from_secs(num * 60)),
        "h" => Ok(Duration::from_secs(num * 60 * 60)),
        "d" => Ok(Duration::from_secs(num * 60 * 60 * 24)),
        _ => Err("invalid unit of time for duration".to_owned()),
    }
}

/// Parses a URI with some default checks. Is required to have an HTTP(S)
/// scheme, a host, no userinfo, no query part. A path is allowed. Plain HTTP
/// is only accepted for loopback hosts or with the `#allow-insecure` fragment.
pub(crate) fn parse_normal_http_uri(src: &str) -> Result<Uri> {
    const SAFE_WORD: &str = "allow-insecure";

    let url: Url = src.parse().map_err(|e| anyhow!("invalid URL: {e}"))?;

    anyhow::ensure!(url.query().is_none(), "URL must not contain a query part");
    anyhow::ensure!(!url.fragment().is_some_and(|f| f != SAFE_WORD),
        "URL must not have a fragment part, except for optionally '{SAFE_WORD}'");
    anyhow::ensure!(url.username().is_empty(), "URL must not contain username part");
    anyhow::ensure!(url.password().is_none(), "URL must not contain password part");
    anyhow::ensure!(["http", "https"].contains(&url.scheme()),
        "URL scheme must be 'http' or 'https'");

    let host = url.host_str().ok_or(anyhow!("URL must have a host"))?;
    let is_local = {
        let bracketed_ipv6 = host.strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .and_then(|h| h.parse::<Ipv6Addr>().ok());

        if let Some(ipv6) = bracketed_ipv6 {
            ipv6.is_loopback()
        } else if let Ok(ipv4) = host.parse::<Ipv4Addr>() {
            ipv4.is_loopback()
        } else {
            // "localhost" could resolve to anything, but this only catches
            // human errors.
            host == "localhost"
        }
    };

    if url.scheme() != "https" && !(is_local || url.fragment() == Some(SAFE_WORD)) {
        bail!("Potentially dangerous URL with non-local host and 'http' scheme. \
            If you really want to use unencrypted HTTP for non-local hosts, \
            confirm by specifing the URL as '{url}#{SAFE_WORD}'");
    }

    Uri::builder()
        .scheme(url.scheme())
        .authority(url.authority())
        .path_and_query(url.path())
        .build()
        .context("failed to build URI")
}


/// Full URL of a GraphQL endpoint, e.g. `http://127.0.0.1:8000/graphql`.
#[derive(Clone, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub(crate) struct GraphQlEndpoint(Uri);

impl GraphQlEndpoint {
    pub(crate) fn uri(&self) -> &Uri {
        &self.0
    }
}

impl fmt::Display for GraphQlEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for GraphQlEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<GraphQlEndpoint> for String {
    fn from(value: GraphQlEndpoint) -> Self {
        value.to_string()
    }
}

impl FromStr for GraphQlEndpoint {
    type Err = anyhow::Error;
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let uri = parse_normal_http_uri(src)?;
        anyhow::ensure!(uri.path() != "/", "GraphQL endpoint must contain a path, e.g. '/graphql'");
        Ok(Self(uri))
    }
}

impl TryFrom<String> for GraphQlEndpoint {
    type Error = <Self as FromStr>::Err;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
