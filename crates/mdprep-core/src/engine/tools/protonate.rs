use super::runner;
use super::{Protonator, ToolError};
use crate::engine::config::{ProtonationConfig, ToolsConfig};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::info;

/// Runs `pdb2pqr` (PROPKA titration) as a Python module.
#[derive(Debug, Clone)]
pub struct Pdb2PqrProtonator {
    python: PathBuf,
    ph: f64,
    forcefield: String,
    titration_method: String,
    timeout: Option<Duration>,
}

/// Output paths of one protonation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtonationOutputs {
    pub pdb: PathBuf,
    pub pqr: PathBuf,
}

impl ProtonationOutputs {
    /// `<stem>_ph<pH>.pdb` and `.pqr` next to `input`, with the pH written
    /// with at least one decimal (`7.0`, `6.5`).
    pub fn for_input(input: &Path, ph: f64) -> Self {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        let base = format!("{}_ph{:?}", stem, ph);
        Self {
            pdb: input.with_file_name(format!("{}.pdb", base)),
            pqr: input.with_file_name(format!("{}.pqr", base)),
        }
    }
}

impl Pdb2PqrProtonator {
    pub fn new(tools: &ToolsConfig, protonation: &ProtonationConfig) -> Self {
        Self {
            python: tools.python.clone(),
            ph: protonation.ph,
            forcefield: protonation.forcefield.clone(),
            titration_method: protonation.titration_method.clone(),
            timeout: tools.timeout,
        }
    }

    pub fn arguments(&self, input: &Path, outputs: &ProtonationOutputs) -> Vec<OsString> {
        vec![
            "-m".into(),
            "pdb2pqr".into(),
            "--ff".into(),
            self.forcefield.clone().into(),
            "--with-ph".into(),
            format!("{:?}", self.ph).into(),
            "--titration-state-method".into(),
            self.titration_method.clone().into(),
            "--pdb-output".into(),
            outputs.pdb.clone().into(),
            input.into(),
            outputs.pqr.clone().into(),
        ]
    }
}

impl Protonator for Pdb2PqrProtonator {
    fn protonate(&self, input: &Path) -> Result<PathBuf, ToolError> {
        let outputs = ProtonationOutputs::for_input(input, self.ph);
        info!("Protonating {:?} at pH {:?}", input, self.ph);

        let mut command = Command::new(&self.python);
        command.args(self.arguments(input, &outputs));
        runner::run_checked(&mut command, self.timeout)?;

        Ok(outputs.pdb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::PipelineConfigBuilder;

    fn protonator(python: &str) -> Pdb2PqrProtonator {
        let config = PipelineConfigBuilder::new()
            .destination_root(PathBuf::from("/out"))
            .template_path(PathBuf::from("/arq.conf"))
            .topology_path(PathBuf::from("/top.rtf"))
            .python(PathBuf::from(python))
            .build()
            .unwrap();
        Pdb2PqrProtonator::new(&config.tools, &config.protonation)
    }

    #[test]
    fn outputs_are_named_after_input_stem_and_ph() {
        let outputs = ProtonationOutputs::for_input(Path::new("/in/job1/model.pdb"), 7.0);
        assert_eq!(outputs.pdb, PathBuf::from("/in/job1/model_ph7.0.pdb"));
        assert_eq!(outputs.pqr, PathBuf::from("/in/job1/model_ph7.0.pqr"));

        let outputs = ProtonationOutputs::for_input(Path::new("model.v2.pdb"), 6.5);
        assert_eq!(outputs.pdb, PathBuf::from("model.v2_ph6.5.pdb"));
    }

    #[test]
    fn arguments_request_charmm_propka_titration() {
        let p = protonator("python3");
        let input = Path::new("/in/model.pdb");
        let outputs = ProtonationOutputs::for_input(input, 7.0);
        let args: Vec<String> = p
            .arguments(input, &outputs)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-m",
                "pdb2pqr",
                "--ff",
                "CHARMM",
                "--with-ph",
                "7.0",
                "--titration-state-method",
                "propka",
                "--pdb-output",
                "/in/model_ph7.0.pdb",
                "/in/model.pdb",
                "/in/model_ph7.0.pqr",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_surfaces_its_diagnostic() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("fake-python");
        std::fs::write(&fake, "#!/bin/sh\necho 'PROPKA: unknown residue XYZ' >&2\nexit 1\n")
            .unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let p = protonator(fake.to_str().unwrap());
        let err = p.protonate(&dir.path().join("model.pdb")).unwrap_err();
        match err {
            ToolError::Failed { diagnostic, .. } => {
                assert_eq!(diagnostic, "PROPKA: unknown residue XYZ")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
