use crate::config::JsxbridgeConfig;
use jsxbridge::{BuildConfig, ToolOverrides};
use std::path::Path;

impl JsxbridgeConfig {
    /// Library configuration for a project rooted at `root`.
    pub fn to_build_config(&self, root: &Path) -> BuildConfig {
        let mut config = BuildConfig::new(&self.js_entry, &self.dest)
            .root(root)
            .minify(self.minify)
            .tools(ToolOverrides {
                compiler: self.compiler.clone(),
                bundler: self.bundler.clone(),
            });

        if let Some(ts_entry) = &self.ts_entry {
            config = config.ts_entry(ts_entry);
        }
        if let Some(target) = self.reload_target() {
            config = config.reload(target);
        }
        if let Some(port) = self.log_server_port {
            config = config.log_server_port(port);
        }
        config
    }
}
