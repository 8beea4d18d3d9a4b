mod defaults;

use crate::cli::Cli;
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use directories::ProjectDirs;
use mdprep::engine::config::{PipelineConfig, PipelineConfigBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialToolsConfig {
    python: Option<PathBuf>,
    vmd: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSystemBuilderConfig {
    topology: Option<PathBuf>,
    #[serde(rename = "solvent-padding")]
    solvent_padding: Option<f64>,
    #[serde(rename = "salt-concentration")]
    salt_concentration: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialPipelineConfig {
    #[serde(rename = "destination-root")]
    destination_root: Option<PathBuf>,
    template: Option<PathBuf>,
    ph: Option<f64>,
    #[serde(rename = "tool-timeout-secs")]
    tool_timeout_secs: Option<u64>,
    tools: Option<PartialToolsConfig>,
    #[serde(rename = "system-builder")]
    system_builder: Option<PartialSystemBuilderConfig>,
}

/// `config.toml` in the per-user configuration directory.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mdprep").map(|dirs| dirs.config_dir().join("config.toml"))
}

impl PartialPipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads the file named on the command line, else the per-user file if
    /// one exists, else starts empty.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => {
                debug!("No configuration file found; using built-in defaults.");
                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli(self, args: &Cli) -> Result<PipelineConfig> {
        let defaults = DefaultsConfig::default();
        let tools = self.tools.unwrap_or_default();
        let system_builder = self.system_builder.unwrap_or_default();

        let mut builder = PipelineConfigBuilder::new()
            .destination_root(
                args.destination_root
                    .clone()
                    .or(self.destination_root)
                    .unwrap_or(defaults.destination_root),
            )
            .template_path(
                args.template
                    .clone()
                    .or(self.template)
                    .unwrap_or(defaults.template),
            )
            .topology_path(
                args.topology
                    .clone()
                    .or(system_builder.topology)
                    .unwrap_or(defaults.topology),
            )
            .ph(args.ph.or(self.ph).unwrap_or(defaults.ph))
            .python(tools.python.unwrap_or(defaults.python))
            .vmd(tools.vmd.unwrap_or(defaults.vmd))
            .timeout(self.tool_timeout_secs.map(Duration::from_secs));

        if let Some(padding) = system_builder.solvent_padding {
            builder = builder.solvent_padding(padding);
        }
        if let Some(concentration) = system_builder.salt_concentration {
            builder = builder.salt_concentration(concentration);
        }

        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use mdprep::engine::config::ConfigError;
    use std::fs;
    use tempfile::tempdir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn built_in_defaults_apply_without_file_or_flags() {
        let cli = Cli::parse_from(["mdprep", "/in"]);
        let config = PartialPipelineConfig::default().merge_with_cli(&cli).unwrap();
        let defaults = DefaultsConfig::default();

        assert_eq!(config.destination_root, defaults.destination_root);
        assert_eq!(config.template_path, defaults.template);
        assert_eq!(config.system_builder.topology_path, defaults.topology);
        assert_eq!(config.protonation.ph, 7.0);
        assert_eq!(config.system_builder.solvent_padding, 12.0);
        assert_eq!(config.system_builder.salt_concentration, 0.15);
        assert_eq!(config.tools.vmd, PathBuf::from("vmd"));
        assert!(config.tools.timeout.is_none());
    }

    #[test]
    fn file_values_are_loaded() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            destination-root = "/scratch/ready"
            template = "/scratch/min.conf"
            ph = 6.8
            tool-timeout-secs = 1800

            [tools]
            python = "/opt/conda/bin/python"
            vmd = "/opt/vmd/bin/vmd"

            [system-builder]
            topology = "/opt/top_all36_prot.rtf"
            solvent-padding = 10.0
            salt-concentration = 0.1
            "#,
        );
        let cli = Cli::parse_from(["mdprep", "/in"]);

        let config = PartialPipelineConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&cli)
            .unwrap();

        assert_eq!(config.destination_root, PathBuf::from("/scratch/ready"));
        assert_eq!(config.template_path, PathBuf::from("/scratch/min.conf"));
        assert_eq!(config.protonation.ph, 6.8);
        assert_eq!(config.tools.timeout, Some(Duration::from_secs(1800)));
        assert_eq!(config.tools.python, PathBuf::from("/opt/conda/bin/python"));
        assert_eq!(
            config.system_builder.topology_path,
            PathBuf::from("/opt/top_all36_prot.rtf")
        );
        assert_eq!(config.system_builder.solvent_padding, 10.0);
        assert_eq!(config.system_builder.salt_concentration, 0.1);
    }

    #[test]
    fn cli_args_override_file_values() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            destination-root = "/scratch/ready"
            ph = 6.8

            [system-builder]
            topology = "/opt/top_all36_prot.rtf"
            "#,
        );
        let cli = Cli::parse_from([
            "mdprep",
            "/in",
            "--dest",
            "/elsewhere",
            "--ph",
            "7.4",
            "--topology",
            "/custom/top.rtf",
        ]);

        let config = PartialPipelineConfig::from_file(&path)
            .unwrap()
            .merge_with_cli(&cli)
            .unwrap();

        assert_eq!(config.destination_root, PathBuf::from("/elsewhere"));
        assert_eq!(config.protonation.ph, 7.4);
        assert_eq!(config.system_builder.topology_path, PathBuf::from("/custom/top.rtf"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), "destination_root = \"/typo\"\n");

        let result = PartialPipelineConfig::from_file(&path);

        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn out_of_range_ph_is_a_config_error() {
        let cli = Cli::parse_from(["mdprep", "/in", "--ph", "15"]);

        let result = PartialPipelineConfig::default().merge_with_cli(&cli);

        assert!(matches!(
            result,
            Err(CliError::Config(ConfigError::OutOfRange { name: "ph", .. }))
        ));
    }

    #[test]
    fn explicit_config_path_must_exist() {
        let dir = tempdir().unwrap();
        let result = PartialPipelineConfig::discover(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
