// Configuration layer: resolves the host/port/credentials quadruple from
// a TOML file under the user's configuration directory. The file is
// created with defaults on the first run, and every load re-validates the
// network values before anything touches the wire.

use std::fs;
use std::net::IpAddr;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Resolved configuration for a single invocation. Read-only once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "Network", default)]
    pub network: Network,
    #[serde(rename = "Administration", default)]
    pub administration: Administration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    #[serde(rename = "Host", default = "default_host")]
    pub host: String,
    #[serde(rename = "Port", default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Administration {
    #[serde(rename = "Username", default = "default_username")]
    pub username: String,
    #[serde(rename = "Password", default = "default_password")]
    pub password: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "secret".to_string()
}

impl Default for Network {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for Administration {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            network: Network::default(),
            administration: Administration::default(),
        }
    }
}

impl Settings {
    /// Parse and validate a TOML configuration document.
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(content).map_err(|e| Error::Configuration(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the network values after deserialization. The host must be an
    /// IPv4 or IPv6 literal and the port must fall in [1, 65535].
    pub fn validate(&self) -> Result<()> {
        self.host_addr()?;
        if self.network.port == 0 {
            return Err(Error::Configuration(
                "port number out of range".to_string(),
            ));
        }
        Ok(())
    }

    fn host_addr(&self) -> Result<IpAddr> {
        self.network.host.parse::<IpAddr>().map_err(|_| {
            Error::Configuration(format!(
                "{} is not a valid IPv4 or IPv6 address",
                self.network.host
            ))
        })
    }

    /// Base URI of the REST API. IPv6 hosts are bracketed.
    pub fn base_url(&self) -> String {
        match self.host_addr() {
            Ok(IpAddr::V6(addr)) => format!("http://[{}]:{}", addr, self.network.port),
            _ => format!("http://{}:{}", self.network.host, self.network.port),
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kalliope_rest")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load the configuration file, creating it with defaults on first run.
pub fn load() -> Result<Settings> {
    let path = config_path();

    if !path.is_file() {
        let settings = Settings::default();
        write_default(&settings)?;
        debug!("created default configuration at {}", path.display());
        return Ok(settings);
    }

    let content =
        fs::read_to_string(&path).map_err(|e| Error::Configuration(e.to_string()))?;
    let settings = Settings::parse(&content)?;
    debug!("loaded configuration from {}", path.display());
    Ok(settings)
}

fn write_default(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    fs::create_dir_all(&dir).map_err(|e| Error::Configuration(e.to_string()))?;

    let path = config_path();
    let content =
        toml::to_string_pretty(settings).map_err(|e| Error::Configuration(e.to_string()))?;
    fs::write(&path, content).map_err(|e| Error::Configuration(e.to_string()))?;
    set_owner_only_permissions(&path)?;
    Ok(())
}

// The file carries the administration password.
#[cfg(unix)]
fn set_owner_only_permissions(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| Error::Configuration(e.to_string()))
}

#[cfg(not(unix))]
fn set_owner_only_permissions(_path: &std::path::Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.network.host, "127.0.0.1");
        assert_eq!(settings.network.port, 5000);
        assert_eq!(settings.administration.username, "admin");
        assert_eq!(settings.administration.password, "secret");
    }

    #[test]
    fn parses_documented_file() {
        let content = r#"
[Network]
Host = "127.0.0.1"
Port = 5000

[Administration]
Username = "admin"
Password = "secret"
"#;
        let settings = Settings::parse(content).unwrap();
        assert_eq!(settings.network.host, "127.0.0.1");
        assert_eq!(settings.network.port, 5000);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings = Settings::parse("[Network]\nHost = \"10.0.0.1\"\n").unwrap();
        assert_eq!(settings.network.host, "10.0.0.1");
        assert_eq!(settings.network.port, 5000);
        assert_eq!(settings.administration.username, "admin");
    }

    #[test]
    fn rejects_invalid_host() {
        let settings = Settings::parse("[Network]\nHost = \"999.999.999.999\"\n");
        assert!(matches!(settings, Err(Error::Configuration(_))));
    }

    #[test]
    fn rejects_hostname_that_is_not_an_ip_literal() {
        let settings = Settings::parse("[Network]\nHost = \"localhost\"\n");
        assert!(matches!(settings, Err(Error::Configuration(_))));
    }

    #[test]
    fn rejects_port_out_of_range() {
        let settings = Settings::parse("[Network]\nPort = 70000\n");
        assert!(matches!(settings, Err(Error::Configuration(_))));
    }

    #[test]
    fn rejects_port_zero() {
        let settings = Settings::parse("[Network]\nPort = 0\n");
        assert!(matches!(settings, Err(Error::Configuration(_))));
    }

    #[test]
    fn rejects_garbage_document() {
        assert!(matches!(
            Settings::parse("not a toml document ["),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn base_url_for_ipv4() {
        let settings = Settings::default();
        assert_eq!(settings.base_url(), "http://127.0.0.1:5000");
    }

    #[test]
    fn base_url_brackets_ipv6() {
        let settings = Settings::parse("[Network]\nHost = \"::1\"\n").unwrap();
        assert_eq!(settings.base_url(), "http://[::1]:5000");
    }

    #[test]
    fn default_round_trips_through_toml() {
        let content = toml::to_string_pretty(&Settings::default()).unwrap();
        assert!(content.contains("[Network]"));
        assert!(content.contains("[Administration]"));
        let parsed = Settings::parse(&content).unwrap();
        assert_eq!(parsed.network.port, 5000);
    }
}
