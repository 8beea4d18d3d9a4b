use super::{StructureConverter, ToolError};
use crate::core::io::staging;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Converts mmCIF models to PDB with `pdbtbx`.
///
/// The PDB is written next to the input. An existing PDB at that path is
/// reused as-is, which makes re-running a batch cheap.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdbtbxConverter;

impl PdbtbxConverter {
    pub fn new() -> Self {
        Self
    }

    pub fn output_path(input: &Path) -> PathBuf {
        input.with_extension("pdb")
    }
}

fn join_errors(errors: &[pdbtbx::PDBError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl StructureConverter for PdbtbxConverter {
    fn convert(&self, input: &Path) -> Result<PathBuf, ToolError> {
        let output = Self::output_path(input);
        if output.exists() {
            info!("Reusing existing PDB {:?}", output);
            return Ok(output);
        }

        let conversion_err = |message: String| ToolError::Conversion {
            path: input.to_path_buf(),
            message,
        };

        let (structure, warnings) = pdbtbx::open(input.to_string_lossy())
            .map_err(|errors| conversion_err(join_errors(&errors)))?;
        if !warnings.is_empty() {
            debug!(
                "pdbtbx reported {} warning(s) reading {:?}: {}",
                warnings.len(),
                input,
                join_errors(&warnings)
            );
        }

        // pdbtbx picks the output format from the extension, so the staging
        // file must end in `.pdb` too.
        let dir = output.parent().unwrap_or_else(|| Path::new("."));
        let staged = staging::staged_file_in(dir, ".pdb").map_err(|source| ToolError::Write {
            path: output.clone(),
            source,
        })?;
        pdbtbx::save(
            &structure,
            staged.path().to_string_lossy(),
            pdbtbx::StrictnessLevel::Loose,
        )
        .map_err(|errors| conversion_err(join_errors(&errors)))?;
        staged.persist(&output).map_err(|e| ToolError::Write {
            path: output.clone(),
            source: e.error,
        })?;

        info!("Converted {:?} to {:?}", input, output);
        Ok(output)
    }
}
