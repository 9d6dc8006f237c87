use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_OUTPUT_DIR: &str = "vunit_out";

/// Values given on the command line. Each one set here hides its environment variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub seed: Option<i32>,
    pub force_regen: bool,
}

/// Settings resolved from the command line first, then the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub output_dir: PathBuf,
    pub seed: Option<i32>,
    pub force_regen: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

impl Config {
    /// Only variables not already decided by `cli` are read or validated.
    pub fn from_env(cli: Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(cli, |var| std::env::var(var).ok())
    }

    pub fn from_lookup(
        cli: Overrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let output_dir = match cli.output_dir {
            Some(dir) => dir,
            None => lookup("TBGEN_OUTPUT_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        };

        let seed = match cli.seed {
            Some(seed) => Some(seed),
            None => match lookup("TBGEN_SEED") {
                Some(raw) if !raw.trim().is_empty() => {
                    Some(raw.trim().parse::<i32>().map_err(|_| ConfigError::InvalidEnv {
                        var: "TBGEN_SEED",
                        value: raw.clone(),
                    })?)
                }
                _ => None,
            },
        };

        let force_regen = cli.force_regen || env_flag(&lookup, "TBGEN_FORCE_REGEN")?;

        Ok(Self {
            output_dir,
            seed,
            force_regen,
        })
    }
}

fn env_flag(
    lookup: impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<bool, ConfigError> {
    match lookup(var).as_deref().map(str::trim) {
        None | Some("") | Some("0") => Ok(false),
        Some("1") => Ok(true),
        Some(other) => Err(ConfigError::InvalidEnv {
            var,
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        config_with(Overrides::default(), vars)
    }

    fn config_with(cli: Overrides, vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(cli, |var| vars.get(var).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from("vunit_out"));
        assert_eq!(cfg.seed, None);
        assert!(!cfg.force_regen);
    }

    #[test]
    fn reads_all_vars() {
        let cfg = config(&[
            ("TBGEN_OUTPUT_DIR", "/tmp/out"),
            ("TBGEN_SEED", "-2147483648"),
            ("TBGEN_FORCE_REGEN", "1"),
        ])
        .unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(cfg.seed, Some(i32::MIN));
        assert!(cfg.force_regen);
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            config(&[("TBGEN_SEED", "4294967296")]).unwrap_err(),
            ConfigError::InvalidEnv {
                var: "TBGEN_SEED",
                value: "4294967296".into(),
            }
        );
        assert!(config(&[("TBGEN_FORCE_REGEN", "yes")]).is_err());
    }

    #[test]
    fn cli_values_hide_their_env_vars() {
        let bad = [
            ("TBGEN_SEED", "abc"),
            ("TBGEN_FORCE_REGEN", "yes"),
            ("TBGEN_OUTPUT_DIR", "/env/out"),
        ];
        let cfg = config_with(
            Overrides {
                output_dir: Some(PathBuf::from("cli_out")),
                seed: Some(1),
                force_regen: true,
            },
            &bad,
        )
        .unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from("cli_out"));
        assert_eq!(cfg.seed, Some(1));
        assert!(cfg.force_regen);

        let err = config_with(
            Overrides {
                seed: Some(1),
                ..Overrides::default()
            },
            &bad,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidEnv {
                var: "TBGEN_FORCE_REGEN",
                value: "yes".into(),
            }
        );
    }
}
