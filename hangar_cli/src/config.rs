use std::{io::Write, path::PathBuf};

use termion::{color, style};

use log::*;

#[derive(Debug, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub team: Option<String>,
    pub token: Option<models::Token>,
    pub insecure: bool,
}

impl Config {
    pub async fn load(path: PathBuf, target: String) -> Result<Config, anyhow::Error> {
        raw::load(path, target).await
    }

    /// Loads the config, falling back to the default one. A config file that
    /// exists but can not be read is reported to `err_out` regardless of the
    /// log level.
    pub async fn load_or_default(
        path: PathBuf,
        target: String,
        err_out: &mut impl Write,
    ) -> Config {
        match Config::load(path, target).await {
            Ok(config) => config,
            Err(err) => {
                error!("Failed to load config, using default: {:#}", err);
                writeln!(
                    err_out,
                    "{}Failed to load config, using default: {:#}{}",
                    color::Fg(color::Yellow),
                    err,
                    style::Reset
                )
                .ok();
                Config::default()
            }
        }
    }
}

impl hangar_client::ClientConfig for Config {
    fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }

    fn team(&self) -> Option<&str> {
        self.team.as_deref()
    }

    fn token(&self) -> Option<&models::Token> {
        self.token.as_ref()
    }

    fn insecure(&self) -> bool {
        self.insecure
    }
}

mod raw {
    use std::{collections::HashMap, path::PathBuf};

    use anyhow::Context;
    use serde::{Deserialize, Serialize};

    use log::*;

    type ConfigTargets = HashMap<String, Target>;

    #[derive(Deserialize, Serialize, Clone, Default)]
    struct Target {
        pub api: Option<String>,
        pub team: Option<String>,
        pub token: Option<models::Token>,
        pub insecure: Option<bool>,
    }

    pub async fn load(path: PathBuf, target: String) -> Result<super::Config, anyhow::Error> {
        if !path.exists() {
            warn!("Config doesn't exists, loading default");
            return Ok(super::Config::default());
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Can not read {}", path.display()))?;
        let config_targets: ConfigTargets = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;

        let mut config = super::Config::default();

        let config_target = config_targets.get(&target).cloned().unwrap_or_else(|| {
            debug!("Target {} is not in config", target);
            Target::default()
        });
        let config_default = config_targets.get("__default__").cloned().unwrap_or_default();

        config.api_url = config_target.api.or(config_default.api);
        config.team = config_target.team.or(config_default.team);
        config.token = config_target.token.or(config_default.token);
        config.insecure = config_target
            .insecure
            .or(config_default.insecure)
            .unwrap_or(false);

        Ok(config)
    }
}
