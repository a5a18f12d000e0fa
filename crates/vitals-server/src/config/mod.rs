//! Server config loader (environment variables, strict parsing).

pub mod schema;

use vitals_core::error::Result;

pub use schema::{GreetingSection, ServerConfig};

/// Load from the process environment.
pub fn load_from_env() -> Result<ServerConfig> {
    load_from_lookup(|key| std::env::var(key).ok())
}

/// Load through an arbitrary lookup. Empty values count as unset.
pub fn load_from_lookup<F>(lookup: F) -> Result<ServerConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let cfg = ServerConfig::from_vars(get)?;
    cfg.validate()?;
    Ok(cfg)
}
