use crate::config::JsxbridgeConfig;
use crate::error::{ConfigError, Result};
use jsxbridge::ReloadTarget;

impl JsxbridgeConfig {
    /// Check the configuration for logical consistency.
    ///
    /// At most one reload target may be configured; [`reload_target`](Self::reload_target)
    /// enforces that one exists when watch mode needs it.
    pub fn validate(&self) -> Result<()> {
        if self.js_entry.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "jsEntry".to_string(),
                hint: "Point jsEntry at the module to bundle, e.g. \"lib/index.js\"".to_string(),
            }
            .into());
        }

        if self.dest.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "dest".to_string(),
                hint: "Point dest at the script to write, e.g. \"dist/index.jsx\"".to_string(),
            }
            .into());
        }

        if self.app.is_some() && self.dev_connect_port.is_some() {
            return Err(ConfigError::ConflictingOptions(
                "app and devConnectPort both select a reload target".to_string(),
            )
            .into());
        }

        if let Some(app) = &self.app {
            if app.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "app".to_string(),
                    value: format!("{:?}", app),
                    hint: "Use the application name, e.g. \"Adobe Illustrator\"".to_string(),
                }
                .into());
            }
        }

        if self.dev_connect_port == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "devConnectPort".to_string(),
                value: "0".to_string(),
                hint: "Use the port the companion extension listens on".to_string(),
            }
            .into());
        }

        if self.dev_connect_host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "devConnectHost".to_string(),
                value: format!("{:?}", self.dev_connect_host),
                hint: "Omit it to use localhost".to_string(),
            }
            .into());
        }

        if let (Some(log), Some(dev)) = (self.log_server_port, self.dev_connect_port) {
            if log == dev {
                return Err(ConfigError::ConflictingOptions(format!(
                    "logServerPort and devConnectPort are both {}",
                    log
                ))
                .into());
            }
        }

        Ok(())
    }

    /// The configured reload target, if any.
    pub fn reload_target(&self) -> Option<ReloadTarget> {
        match (&self.app, self.dev_connect_port) {
            (Some(app), _) => Some(ReloadTarget::AutomationBridge { app: app.clone() }),
            (None, Some(port)) => Some(ReloadTarget::NetworkPush {
                host: self.dev_connect_host.clone(),
                port,
            }),
            (None, None) => None,
        }
    }

    /// The reload target watch mode delivers to. Exactly one must be configured.
    pub fn require_reload_target(&self) -> Result<ReloadTarget> {
        self.reload_target().ok_or_else(|| {
            ConfigError::MissingField {
                field: "app".to_string(),
                hint: "Set app to reload through the automation bridge, or devConnectPort to \
                       push to the companion extension"
                    .to_string(),
            }
            .into()
        })
    }
}
