use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Parameter '{name}' is out of range: {value}")]
    OutOfRange { name: &'static str, value: f64 },
}

/// External programs the pipeline drives.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolsConfig {
    /// Python interpreter that can run `-m pdb2pqr`.
    pub python: PathBuf,
    /// VMD executable used for psfgen, solvate and autoionize.
    pub vmd: PathBuf,
    /// Upper bound on any single tool invocation; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProtonationConfig {
    pub ph: f64,
    pub forcefield: String,
    pub titration_method: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemBuilderConfig {
    /// CHARMM residue topology file loaded by psfgen.
    pub topology_path: PathBuf,
    /// Water padding around the solute, in Å.
    pub solvent_padding: f64,
    /// Salt concentration for autoionize, in mol/L.
    pub salt_concentration: f64,
}

/// Settings for a batch run, built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub destination_root: PathBuf,
    pub template_path: PathBuf,
    pub structure_extension: String,
    pub tools: ToolsConfig,
    pub protonation: ProtonationConfig,
    pub system_builder: SystemBuilderConfig,
}

#[derive(Default)]
pub struct PipelineConfigBuilder {
    destination_root: Option<PathBuf>,
    template_path: Option<PathBuf>,
    topology_path: Option<PathBuf>,
    structure_extension: Option<String>,
    python: Option<PathBuf>,
    vmd: Option<PathBuf>,
    timeout: Option<Duration>,
    ph: Option<f64>,
    forcefield: Option<String>,
    titration_method: Option<String>,
    solvent_padding: Option<f64>,
    salt_concentration: Option<f64>,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn destination_root(mut self, path: PathBuf) -> Self {
        self.destination_root = Some(path);
        self
    }
    pub fn template_path(mut self, path: PathBuf) -> Self {
        self.template_path = Some(path);
        self
    }
    pub fn topology_path(mut self, path: PathBuf) -> Self {
        self.topology_path = Some(path);
        self
    }
    pub fn structure_extension(mut self, extension: impl Into<String>) -> Self {
        self.structure_extension = Some(extension.into());
        self
    }
    pub fn python(mut self, path: PathBuf) -> Self {
        self.python = Some(path);
        self
    }
    pub fn vmd(mut self, path: PathBuf) -> Self {
        self.vmd = Some(path);
        self
    }
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn ph(mut self, ph: f64) -> Self {
        self.ph = Some(ph);
        self
    }
    pub fn forcefield(mut self, name: impl Into<String>) -> Self {
        self.forcefield = Some(name.into());
        self
    }
    pub fn titration_method(mut self, method: impl Into<String>) -> Self {
        self.titration_method = Some(method.into());
        self
    }
    pub fn solvent_padding(mut self, padding: f64) -> Self {
        self.solvent_padding = Some(padding);
        self
    }
    pub fn salt_concentration(mut self, concentration: f64) -> Self {
        self.salt_concentration = Some(concentration);
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let ph = self.ph.unwrap_or(7.0);
        if !(0.0..=14.0).contains(&ph) {
            return Err(ConfigError::OutOfRange {
                name: "ph",
                value: ph,
            });
        }
        let solvent_padding = self.solvent_padding.unwrap_or(12.0);
        if solvent_padding <= 0.0 || !solvent_padding.is_finite() {
            return Err(ConfigError::OutOfRange {
                name: "solvent_padding",
                value: solvent_padding,
            });
        }
        let salt_concentration = self.salt_concentration.unwrap_or(0.15);
        if salt_concentration < 0.0 || !salt_concentration.is_finite() {
            return Err(ConfigError::OutOfRange {
                name: "salt_concentration",
                value: salt_concentration,
            });
        }

        Ok(PipelineConfig {
            destination_root: self
                .destination_root
                .ok_or(ConfigError::MissingParameter("destination_root"))?,
            template_path: self
                .template_path
                .ok_or(ConfigError::MissingParameter("template_path"))?,
            structure_extension: self.structure_extension.unwrap_or_else(|| "cif".into()),
            tools: ToolsConfig {
                python: self.python.unwrap_or_else(|| PathBuf::from("python3")),
                vmd: self.vmd.unwrap_or_else(|| PathBuf::from("vmd")),
                timeout: self.timeout,
            },
            protonation: ProtonationConfig {
                ph,
                forcefield: self.forcefield.unwrap_or_else(|| "CHARMM".into()),
                titration_method: self.titration_method.unwrap_or_else(|| "propka".into()),
            },
            system_builder: SystemBuilderConfig {
                topology_path: self
                    .topology_path
                    .ok_or(ConfigError::MissingParameter("topology_path"))?,
                solvent_padding,
                salt_concentration,
            },
        })
    }
}
