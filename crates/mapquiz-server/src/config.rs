//! Server configuration from environment variables.

use anyhow::Context;
use mapquiz_core::{LoaderConfig, Sampler};
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SHAPEFILE: &str = "BC250_2017_Unidade_Federacao_A.shp";
const DEFAULT_MAX_TRIALS: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub shapefile: PathBuf,
    pub loader: LoaderConfig,
    /// Rejection-sampling cap; `None` samples until a point is accepted
    pub max_trials: Option<u64>,
}

impl ServerConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = LoaderConfig::default();

        let addr = lookup("SERVER_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.into())
            .parse::<SocketAddr>()
            .context("SERVER_ADDR is not a socket address")?;

        let shapefile: PathBuf = lookup("MAPQUIZ_SHAPEFILE")
            .unwrap_or_else(|| DEFAULT_SHAPEFILE.into())
            .into();

        let loader = LoaderConfig {
            name_field: lookup("MAPQUIZ_NAME_FIELD").unwrap_or(defaults.name_field),
            abbreviation_field: lookup("MAPQUIZ_ABBREV_FIELD")
                .unwrap_or(defaults.abbreviation_field),
        };

        let max_trials = match lookup("MAPQUIZ_MAX_TRIALS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("MAPQUIZ_MAX_TRIALS is not a number")?,
            None => DEFAULT_MAX_TRIALS,
        };

        Ok(Self {
            addr,
            shapefile,
            loader,
            max_trials: (max_trials > 0).then_some(max_trials),
        })
    }

    pub fn sampler(&self) -> Sampler {
        match self.max_trials {
            Some(cap) => Sampler::with_trial_cap(cap),
            None => Sampler::unbounded(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.shapefile, PathBuf::from(DEFAULT_SHAPEFILE));
        assert_eq!(config.loader, LoaderConfig::default());
        assert_eq!(config.max_trials, Some(DEFAULT_MAX_TRIALS));
        assert_eq!(config.sampler().max_trials(), Some(DEFAULT_MAX_TRIALS));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("SERVER_ADDR", "127.0.0.1:9000"),
            ("MAPQUIZ_SHAPEFILE", "/data/states.shp"),
            ("MAPQUIZ_NAME_FIELD", "NAME_1"),
            ("MAPQUIZ_ABBREV_FIELD", "HASC_1"),
            ("MAPQUIZ_MAX_TRIALS", "0"),
        ]))
        .unwrap();

        assert_eq!(config.addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.shapefile, PathBuf::from("/data/states.shp"));
        assert_eq!(config.loader.name_field, "NAME_1");
        assert_eq!(config.loader.abbreviation_field, "HASC_1");
        assert_eq!(config.max_trials, None);
        assert_eq!(config.sampler(), Sampler::unbounded());
        assert_eq!(config.sampler().max_trials(), None);
    }

    #[test]
    fn test_invalid_values() {
        assert!(ServerConfig::from_lookup(lookup(&[("SERVER_ADDR", "nowhere")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("MAPQUIZ_MAX_TRIALS", "many")])).is_err());
    }
}
