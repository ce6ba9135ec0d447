use fragsearch::engine::config::DEFAULT_LICENSE_ENV_VAR;

/// Embedded RDKit decomposition helper, run with `python -c`.
pub const REPLACE_CORE_SCRIPT: &str = include_str!("../../python/replace_core.py");

pub struct DefaultsConfig {
    pub executable: String,
    pub databases: Vec<String>,
    pub nproc: usize,
    pub license_env_var: String,
    pub license_candidates: Vec<String>,
    pub python: String,
    pub workers: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            executable: "/db1/OpenEye/ubuntu18/bin/brood".to_string(),
            databases: vec![
                "/db1/brood/chembl20".to_string(),
                "/db1/brood/gostarDB".to_string(),
                "/db1/brood/surechemblDB/part1".to_string(),
                "/db1/brood/surechemblDB/part2".to_string(),
                "/db1/brood/surechemblDB/part3".to_string(),
                "/db1/brood/surechemblDB/part4".to_string(),
                "/db1/brood/surechemblDB/part5".to_string(),
            ],
            nproc: 1,
            license_env_var: DEFAULT_LICENSE_ENV_VAR.to_string(),
            license_candidates: vec![
                "/db1/OpenEye/license/oe_license.txt".to_string(),
                "/db1/OpenEye/oe_license.txt".to_string(),
            ],
            python: "python3".to_string(),
            workers: 1,
        }
    }
}
