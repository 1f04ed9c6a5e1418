// Avolta Publications - content backend for the Avolta corporate website
// Copyright (C) 2025 Avolta Web Team
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use chrono::Duration;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "avolta.toml";
pub const ENV_PREFIX: &str = "AVOLTA_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,

    /// Public URL prefix under which uploaded files are served
    #[serde(default = "default_uploads_url")]
    pub uploads_url: String,

    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,

    #[serde(default = "default_session_timeout_hours")]
    pub session_timeout_hours: i64,

    #[serde(default)]
    pub secure_cookies: bool,

    #[serde(default = "default_superadmin_email")]
    pub superadmin_email: String,

    /// Creates the superadmin on first run. Without it the server only starts
    /// when a superadmin was already provisioned.
    #[serde(default)]
    pub superadmin_password: Option<String>,

    #[serde(default)]
    pub development_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: default_database_url(),
            uploads_dir: default_uploads_dir(),
            uploads_url: default_uploads_url(),
            max_upload_size: default_max_upload_size(),
            session_timeout_hours: default_session_timeout_hours(),
            secure_cookies: false,
            superadmin_email: default_superadmin_email(),
            superadmin_password: None,
            development_mode: false,
        }
    }
}

impl Config {
    /// Defaults, then `avolta.toml`, then `AVOLTA_*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_figment(Self::figment())
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config: Config = figment.extract()?;

        if config.session_timeout_hours <= 0 {
            anyhow::bail!("session_timeout_hours must be positive");
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_lifetime(&self) -> Duration {
        Duration::hours(self.session_timeout_hours)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_database_url() -> String {
    "sqlite:avolta.db".to_string()
}

fn default_uploads_dir() -> String {
    "uploads".to_string()
}

fn default_uploads_url() -> String {
    "/uploads".to_string()
}

fn default_max_upload_size() -> usize {
    10 * 1024 * 1024
}

fn default_session_timeout_hours() -> i64 {
    24
}

fn default_superadmin_email() -> String {
    "superadmin@avolta.be".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.database_url, "sqlite:avolta.db");
        assert_eq!(config.max_upload_size, 10_485_760);
        assert_eq!(config.session_lifetime(), Duration::hours(24));
        assert!(!config.secure_cookies);
        assert!(config.superadmin_password.is_none());
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let figment = Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(
            r#"
            port = 8080
            database_url = "sqlite:data/avolta.db"
            superadmin_password = "change-me-now"
            "#,
        ));

        let config = Config::from_figment(figment).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "sqlite:data/avolta.db");
        assert_eq!(config.superadmin_password.as_deref(), Some("change-me-now"));
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_rejects_non_positive_session_timeout() {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string("session_timeout_hours = 0"));

        assert!(Config::from_figment(figment).is_err());
    }
}
