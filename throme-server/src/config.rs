use std::collections::HashMap;
use std::net::SocketAddr;

use anyhow::Context;
use tracing::{info, warn};

use crate::variants::VariantRegistry;

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_ROUTER_URL: &str = "https://router.huggingface.co/v1";
pub const DEFAULT_INFERENCE_URL: &str = "https://router.huggingface.co/hf-inference";

/// Process-wide settings, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub router_url: String,
    pub inference_url: String,
    /// Token per credential variable name; missing variables are absent.
    pub credentials: HashMap<String, String>,
}

impl ServerConfig {
    pub fn from_env(registry: &VariantRegistry) -> anyhow::Result<Self> {
        Self::from_lookup(registry, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(registry: &VariantRegistry, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = lookup("THROME_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr
            .parse::<SocketAddr>()
            .with_context(|| format!("THROME_ADDR is not a socket address: {addr}"))?;

        let router_url = lookup("HF_ROUTER_URL").unwrap_or_else(|| DEFAULT_ROUTER_URL.to_string());
        let inference_url =
            lookup("HF_INFERENCE_URL").unwrap_or_else(|| DEFAULT_INFERENCE_URL.to_string());

        let mut credentials = HashMap::new();
        for variant in registry.iter() {
            if credentials.contains_key(variant.credential) {
                continue;
            }
            match lookup(variant.credential).filter(|token| !token.trim().is_empty()) {
                Some(token) => {
                    info!("{} loaded", variant.credential);
                    credentials.insert(variant.credential.to_string(), token);
                }
                None => warn!("{} not set in environment", variant.credential),
            }
        }

        Ok(Self {
            addr,
            router_url,
            inference_url,
            credentials,
        })
    }

    pub fn credential(&self, name: &str) -> Option<&str> {
        self.credentials.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(
        pairs: &'static [(&'static str, &'static str)],
    ) -> impl Fn(&str) -> Option<String> {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults_apply() {
        let config =
            ServerConfig::from_lookup(&VariantRegistry::builtin(), lookup_from(&[])).unwrap();
        assert_eq!(config.addr, DEFAULT_ADDR.parse().unwrap());
        assert_eq!(config.router_url, DEFAULT_ROUTER_URL);
        assert!(config.credentials.is_empty());
    }

    #[test]
    fn credentials_are_collected_per_variable() {
        let config = ServerConfig::from_lookup(
            &VariantRegistry::builtin(),
            lookup_from(&[("HF_ACCESS_TOKEN", "hf_one"), ("HF_ACCESS_TOKEN2", " ")]),
        )
        .unwrap();
        assert_eq!(config.credential("HF_ACCESS_TOKEN"), Some("hf_one"));
        assert_eq!(config.credential("HF_ACCESS_TOKEN2"), None);
    }

    #[test]
    fn bad_address_is_rejected() {
        let result = ServerConfig::from_lookup(
            &VariantRegistry::builtin(),
            lookup_from(&[("THROME_ADDR", "nope")]),
        );
        assert!(result.is_err());
    }
}
