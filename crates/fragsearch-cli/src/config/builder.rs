use super::defaults::{DefaultsConfig, REPLACE_CORE_SCRIPT};
use super::file::{FileConfig, FileLicenseConfig};
use super::models::AppConfig;
use crate::cli::SearchArgs;
use crate::error::{CliError, Result};
use fragsearch::core::decompose::command::CommandDecomposer;
use fragsearch::engine::config::{
    FilterFloors, LicenseConfig, SearchConfigBuilder, SearchRequest,
};
use fragsearch::engine::error::EngineError;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

pub fn build_config(args: &SearchArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let search_file = file_config.search.take().unwrap_or_default();
    let databases = if !args.databases.is_empty() {
        args.databases.clone()
    } else {
        search_file
            .databases
            .unwrap_or_else(|| defaults.databases.clone())
    };
    let request = SearchRequest {
        core: args.core.clone(),
        scaffold: args.scaffold.clone(),
        databases: databases.into_iter().map(Into::into).collect(),
        nproc: args.nproc.or(search_file.nproc).unwrap_or(defaults.nproc),
        extra_params: args.other_params.clone().or(search_file.other_params),
    };

    let executable = args
        .executable
        .clone()
        .or(search_file.executable)
        .unwrap_or_else(|| PathBuf::from(&defaults.executable));

    let license = resolve_license(
        args.license.as_deref(),
        file_config.license.take().unwrap_or_default(),
        &defaults,
    )?;

    let filters_file = file_config.filters.take().unwrap_or_default();
    let floors = FilterFloors {
        min_mol_wt: filters_file.min_mol_wt.unwrap_or(0.0),
        min_psa: filters_file.min_psa.unwrap_or(0.0),
        min_heavy_atoms: filters_file.min_heavy_atoms.unwrap_or(0),
    };

    let exec_file = file_config.execution.take().unwrap_or_default();
    let timeout = args
        .timeout
        .or(exec_file.timeout_secs)
        .map(Duration::from_secs);
    let keep_intermediates =
        args.keep_intermediates || exec_file.keep_intermediates.unwrap_or(false);

    let output_file = file_config.output.take().unwrap_or_default();
    let mut builder = SearchConfigBuilder::new()
        .executable(executable)
        .license(license)
        .floors(floors)
        .workers(args.workers.or(exec_file.workers).unwrap_or(defaults.workers))
        .timeout(timeout)
        .keep_intermediates(keep_intermediates);
    if let Some(work_dir) = args.work_dir.clone().or(output_file.work_dir) {
        builder = builder.work_dir(work_dir);
    }
    if let Some(output) = args.output.clone().or(output_file.table) {
        builder = builder.output_path(output);
    }
    if let Some(run_log) = args.run_log.clone().or(output_file.run_log) {
        builder = builder.log_path(run_log);
    }
    if let Some(rows) = output_file.header_rows {
        builder = builder.header_rows(rows);
    }
    let search = builder.build().map_err(EngineError::from)?;

    let decomposer_file = file_config.decomposer.take().unwrap_or_default();
    let decomposer = match args.decomposer.clone().or(decomposer_file.program) {
        Some(program) => {
            CommandDecomposer::new(program).with_args(decomposer_file.args.unwrap_or_default())
        }
        None => CommandDecomposer::new(decomposer_file.python.unwrap_or(defaults.python))
            .with_args(["-c", REPLACE_CORE_SCRIPT]),
    };

    debug!("Resolved search configuration: {:?}", search);
    Ok(AppConfig {
        request,
        search,
        decomposer,
    })
}

/// An explicit license path must exist; otherwise the first existing candidate wins.
/// No license at all is allowed, since some installations do not need one.
fn resolve_license(
    cli_path: Option<&Path>,
    file_license: FileLicenseConfig,
    defaults: &DefaultsConfig,
) -> Result<Option<LicenseConfig>> {
    let env_var = file_license
        .env_var
        .unwrap_or_else(|| defaults.license_env_var.clone());

    if let Some(path) = cli_path.map(Path::to_path_buf).or(file_license.path) {
        if !path.is_file() {
            return Err(CliError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("License file does not exist: {}", path.display()),
            )));
        }
        return Ok(Some(LicenseConfig { env_var, path }));
    }

    let candidates = file_license.candidates.unwrap_or_else(|| {
        defaults
            .license_candidates
            .iter()
            .map(PathBuf::from)
            .collect()
    });
    match candidates.into_iter().find(|path| path.is_file()) {
        Some(path) => {
            debug!("Using license file {:?}", path);
            Ok(Some(LicenseConfig { env_var, path }))
        }
        None => {
            warn!("No license file found; searches run without {} set.", env_var);
            Ok(None)
        }
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str, kind: &str) -> Result<T> {
    value_str.parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    if set_values.is_empty() {
        return Ok(config);
    }
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "search.executable" => {
                config.search.get_or_insert_with(Default::default).executable =
                    Some(PathBuf::from(value_str));
            }
            "search.nproc" => {
                config.search.get_or_insert_with(Default::default).nproc =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "search.other-params" => {
                config.search.get_or_insert_with(Default::default).other_params =
                    Some(value_str.to_string());
            }
            "license.path" => {
                config.license.get_or_insert_with(Default::default).path =
                    Some(PathBuf::from(value_str));
            }
            "license.env-var" => {
                config.license.get_or_insert_with(Default::default).env_var =
                    Some(value_str.to_string());
            }
            "filters.min-mol-wt" => {
                config.filters.get_or_insert_with(Default::default).min_mol_wt =
                    Some(parse_value(key, value_str, "float")?);
            }
            "filters.min-psa" => {
                config.filters.get_or_insert_with(Default::default).min_psa =
                    Some(parse_value(key, value_str, "float")?);
            }
            "filters.min-heavy-atoms" => {
                config
                    .filters
                    .get_or_insert_with(Default::default)
                    .min_heavy_atoms = Some(parse_value(key, value_str, "integer")?);
            }
            "execution.workers" => {
                config.execution.get_or_insert_with(Default::default).workers =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "execution.timeout-secs" => {
                config
                    .execution
                    .get_or_insert_with(Default::default)
                    .timeout_secs = Some(parse_value(key, value_str, "integer")?);
            }
            "execution.keep-intermediates" => {
                config
                    .execution
                    .get_or_insert_with(Default::default)
                    .keep_intermediates = Some(parse_value(key, value_str, "boolean")?);
            }
            "output.header-rows" => {
                config.output.get_or_insert_with(Default::default).header_rows =
                    Some(parse_value(key, value_str, "integer")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
