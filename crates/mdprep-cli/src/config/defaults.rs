use std::path::PathBuf;

/// Values used when neither the configuration file nor the command line
/// provides one. They match the layout of the lab workstation the pipeline
/// was first run on.
pub struct DefaultsConfig {
    pub destination_root: PathBuf,
    pub template: PathBuf,
    pub topology: PathBuf,
    pub ph: f64,
    pub python: PathBuf,
    pub vmd: PathBuf,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            destination_root: PathBuf::from("/home/alphafold/prontos_dinamica/phaseolin01"),
            template: PathBuf::from("/home/alphafold/pipeline/03-prepara_dinamica/arq.conf"),
            topology: PathBuf::from(
                "/programs/vmd-2.0.0a7/plugins/noarch/tcl/readcharmmtop1.2/top_all36_prot.rtf",
            ),
            ph: 7.0,
            python: PathBuf::from("python3"),
            vmd: PathBuf::from("vmd"),
        }
    }
}
