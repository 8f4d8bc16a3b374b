//! Runtime configuration from the environment and an optional `.env.local` file.

use crate::youtube_api::DEFAULT_API_BASE_URL;
use eyre::Context;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::{env, fmt, fs};

/// File consulted for anything the process environment doesn't set.
pub const DEFAULT_ENV_FILE: &str = ".env.local";

/// Where the server listens unless told otherwise.
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

pub const API_KEY_VAR: &str = "YOUTUBE_API_KEY";
pub const ADDR_VAR: &str = "YOUTUBE_CATALOG_ADDR";
pub const API_BASE_URL_VAR: &str = "YOUTUBE_API_BASE_URL";

#[derive(Clone)]
pub struct Config {
    /// Key used when a request doesn't bring its own.
    pub api_key: Option<String>,
    pub addr: SocketAddr,
    pub api_base_url: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("addr", &self.addr)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl Config {
    /// Loads the configuration from the process environment, then [`DEFAULT_ENV_FILE`].
    pub fn load() -> eyre::Result<Self> {
        Self::load_from(Path::new(DEFAULT_ENV_FILE))
    }

    /// Like [`Config::load`], with a different fallback file. A missing file is not an error.
    pub fn load_from(env_file: &Path) -> eyre::Result<Self> {
        let file_vars = read_env_file(env_file)?;
        Self::from_sources(&file_vars, env_var)
    }

    /// Builds the configuration from already-read file variables and an environment lookup.
    ///
    /// The environment wins over the file. Blank values count as unset.
    pub fn from_sources(
        file_vars: &HashMap<String, String>,
        env_lookup: impl Fn(&str) -> Option<String>,
    ) -> eyre::Result<Self> {
        fn given(value: Option<&str>) -> Option<String> {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(String::from)
        }
        let lookup = |key: &str| {
            given(env_lookup(key).as_deref())
                .or_else(|| given(file_vars.get(key).map(String::as_str)))
        };

        let addr = lookup(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr
            .parse::<SocketAddr>()
            .with_context(|| format!("{ADDR_VAR}={addr} is not a socket address"))?;

        Ok(Self {
            api_key: lookup(API_KEY_VAR),
            addr,
            api_base_url: lookup(API_BASE_URL_VAR)
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        })
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Reads a `KEY=value` file. Blank lines and `#` comments are skipped, values may be quoted, and
/// a leading `export ` is ignored.
pub fn read_env_file(path: &Path) -> eyre::Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(parse_env_file(&content))
}

pub fn parse_env_file(content: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);
        vars.insert(key.to_string(), value.to_string());
    }
    vars
}
