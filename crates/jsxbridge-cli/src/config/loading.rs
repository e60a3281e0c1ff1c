use crate::config::JsxbridgeConfig;
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json},
};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "jsxbridge.config.json";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "JSXBRIDGE_";

/// A loaded config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    pub config: JsxbridgeConfig,
}

impl ConfigFile {
    /// Load `path`, or `./jsxbridge.config.json` when `None`.
    ///
    /// Relative paths resolve against the working directory. A missing file is a
    /// [`ConfigError::NotFound`]; anything figment cannot extract is a
    /// [`ConfigError::Invalid`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let path = match path {
            Some(path) => cwd.join(path),
            None => cwd.join(CONFIG_FILE_NAME),
        };
        if !path.is_file() {
            return Err(ConfigError::NotFound(path).into());
        }

        let config = Figment::new()
            .merge(Json::file(&path))
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .lowercase(false)
                    .map(|key| env_key_to_field(key.as_str()).into()),
            )
            .extract::<JsxbridgeConfig>()
            .map_err(|e| ConfigError::Invalid {
                path: path.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!("loaded config from {}", path.display());
        Ok(Self { path, config })
    }

    /// Directory holding the config file; relative config paths resolve against it.
    pub fn root(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Map an environment key (prefix stripped) to its config field:
/// `DEV_CONNECT_PORT` becomes `devConnectPort`.
pub fn env_key_to_field(key: &str) -> String {
    let mut field = String::with_capacity(key.len());
    let mut upper_next = false;
    for c in key.chars() {
        if c == '_' {
            upper_next = !field.is_empty();
        } else if upper_next {
            field.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            field.push(c.to_ascii_lowercase());
        }
    }
    field
}
