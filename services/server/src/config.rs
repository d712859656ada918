//! Environment-driven configuration.
//!
//! `DATABASE_URL` is required; everything else has a deployment default:
//! `BIND_ADDR` (0.0.0.0:3000), `MQTT_BROKER_URL` (mqtt://localhost),
//! `MQTT_CLIENT_ID` (randomized per process so parallel backends never
//! steal each other's broker session).

use std::env;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub broker: BrokerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid broker URL '{url}': {reason}")]
    InvalidBrokerUrl { url: String, reason: String },
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_owned());
        let broker_url =
            env::var("MQTT_BROKER_URL").unwrap_or_else(|_| "mqtt://localhost".to_owned());
        let client_id = env::var("MQTT_CLIENT_ID").unwrap_or_else(|_| default_client_id());
        let broker = parse_broker_url(&broker_url, client_id)?;
        Ok(Self {
            database_url,
            bind_addr,
            broker,
        })
    }
}

/// Parse `mqtt://host[:port]` (also accepts `tcp://` or a bare host);
/// the port defaults to 1883.
pub fn parse_broker_url(url: &str, client_id: String) -> Result<BrokerConfig, ConfigError> {
    let rest = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    let (host, port) = match rest.rsplit_once(':') {
        Some((host, port_str)) => {
            let port = port_str
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidBrokerUrl {
                    url: url.to_owned(),
                    reason: format!("bad port '{port_str}': {e}"),
                })?;
            (host, port)
        }
        None => (rest, 1883),
    };

    if host.is_empty() {
        return Err(ConfigError::InvalidBrokerUrl {
            url: url.to_owned(),
            reason: "empty host".to_owned(),
        });
    }

    Ok(BrokerConfig {
        host: host.to_owned(),
        port,
        client_id,
    })
}

fn default_client_id() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("backend_logger_{:x}{:x}", std::process::id(), nanos)
}
