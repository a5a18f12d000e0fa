use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use vitals_core::error::{Result, VitalsError};

pub const ENV_PORT: &str = "PORT";
pub const ENV_HOST: &str = "HOST";
pub const ENV_GREETING_MESSAGE: &str = "GREETING_MESSAGE";
pub const ENV_APP_VERSION: &str = "APP_VERSION";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub greeting: GreetingSection,
}

impl ServerConfig {
    pub(crate) fn from_vars<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = match get(ENV_HOST) {
            Some(v) => v.trim().parse::<IpAddr>().map_err(|e| {
                VitalsError::BadRequest(format!("{ENV_HOST} must be an IP address ({v}): {e}"))
            })?,
            None => default_host(),
        };

        let port = match get(ENV_PORT) {
            Some(v) => v.trim().parse::<u16>().map_err(|_| {
                VitalsError::BadRequest(format!("{ENV_PORT} must be between 1 and 65535, got {v}"))
            })?,
            None => default_port(),
        };

        let greeting = GreetingSection {
            message: get(ENV_GREETING_MESSAGE).unwrap_or_else(default_message),
            version: get(ENV_APP_VERSION).unwrap_or_else(default_version),
        };

        Ok(Self { host, port, greeting })
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(VitalsError::BadRequest(format!(
                "{ENV_PORT} must be between 1 and 65535, got 0"
            )));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            greeting: GreetingSection::default(),
        }
    }
}

/// Static payload of the greeting endpoint.
#[derive(Debug, Clone)]
pub struct GreetingSection {
    pub message: String,
    pub version: String,
}

impl Default for GreetingSection {
    fn default() -> Self {
        Self {
            message: default_message(),
            version: default_version(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}
fn default_port() -> u16 {
    3000
}
fn default_message() -> String {
    "Hello from vitals".into()
}
fn default_version() -> String {
    env!("CARGO_PKG_VERSION").into()
}
