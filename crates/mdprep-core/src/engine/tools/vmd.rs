use super::runner;
use super::{BuildRequest, BuiltSystem, SystemBuilder, ToolError};
use crate::engine::config::{SystemBuilderConfig, ToolsConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info};

pub const SCRIPT_NAME: &str = "run_vmd.tcl";

/// Builds the simulation system with VMD's psfgen, solvate and autoionize
/// plugins, driven by a generated Tcl script run in text mode.
#[derive(Debug, Clone)]
pub struct VmdSystemBuilder {
    vmd: PathBuf,
    topology: PathBuf,
    solvent_padding: f64,
    salt_concentration: f64,
    timeout: Option<Duration>,
}

impl VmdSystemBuilder {
    pub fn new(tools: &ToolsConfig, builder: &SystemBuilderConfig) -> Self {
        Self {
            vmd: tools.vmd.clone(),
            topology: builder.topology_path.clone(),
            solvent_padding: builder.solvent_padding,
            salt_concentration: builder.salt_concentration,
            timeout: tools.timeout,
        }
    }

    /// Renders the control script. Structure paths are relative to the job
    /// directory, which is the working directory VMD runs in.
    pub fn script(&self, job_id: &str, structure: &Path) -> String {
        let pdb = structure
            .file_name()
            .unwrap_or_default()
            .to_string_lossy();
        format!(
            r#"
package require psfgen
topology "{topology}"

pdbalias residue HIS HSD
pdbalias atom ILE CD1 CD

segment U {{
    pdb "{pdb}"
    first NTER
    last CTER
    auto angles dihedrals
}}

coordpdb "{pdb}" U
guesscoord

writepsf {job}_base.psf
writepdb {job}_base.pdb

package require solvate
solvate {job}_base.psf {job}_base.pdb -t {padding:?} -o {job}_solv

package require autoionize
autoionize -psf {job}_solv.psf -pdb {job}_solv.pdb -sc {salt:?} -o {job}_final

exit
"#,
            topology = self.topology.display(),
            pdb = pdb,
            job = job_id,
            padding = self.solvent_padding,
            salt = self.salt_concentration,
        )
    }
}

impl SystemBuilder for VmdSystemBuilder {
    fn build(&self, request: &BuildRequest) -> Result<BuiltSystem, ToolError> {
        let script_path = request.job_dir.join(SCRIPT_NAME);
        fs::write(&script_path, self.script(request.job_id, request.structure)).map_err(
            |source| ToolError::Write {
                path: script_path.clone(),
                source,
            },
        )?;
        debug!("Wrote VMD control script {:?}", script_path);

        info!("Building solvated system for '{}'", request.job_id);
        let mut command = Command::new(&self.vmd);
        command
            .arg("-dispdev")
            .arg("text")
            .arg("-e")
            .arg(&script_path)
            .current_dir(request.job_dir);
        runner::run_checked(&mut command, self.timeout)?;

        let built = BuiltSystem::expected(request.job_dir, request.job_id);
        for path in [&built.pdb, &built.psf] {
            if !path.is_file() {
                return Err(ToolError::MissingOutput {
                    tool: "VMD",
                    path: path.clone(),
                });
            }
        }
        Ok(built)
    }
}
