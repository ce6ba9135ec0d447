use super::config::SearchConfig;
use super::run_log::RunLog;
use crate::core::models::job::{Job, JobId};
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How a single search ended. None of these stop the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum JobStatus {
    Succeeded,
    Failed { code: Option<i32> },
    TimedOut,
    SpawnFailed { reason: String },
    Cancelled,
}

impl JobStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Succeeded)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Succeeded => f.write_str("succeeded"),
            JobStatus::Failed { code: Some(code) } => write!(f, "failed with exit code {}", code),
            JobStatus::Failed { code: None } => f.write_str("terminated by signal"),
            JobStatus::TimedOut => f.write_str("timed out"),
            JobStatus::SpawnFailed { reason } => write!(f, "could not be started: {}", reason),
            JobStatus::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobResult {
    pub id: JobId,
    pub prefix: String,
    pub status: JobStatus,
    /// The job's table, present only when the search succeeded and wrote one.
    pub output: Option<PathBuf>,
    pub elapsed: Duration,
}

enum WaitOutcome {
    Exited(io::Result<std::process::ExitStatus>),
    TimedOut,
    Cancelled,
}

/// Runs the external search executable for one job at a time.
pub struct SearchInvoker<'a> {
    config: &'a SearchConfig,
    log: Option<&'a RunLog>,
}

impl<'a> SearchInvoker<'a> {
    pub fn new(config: &'a SearchConfig, log: Option<&'a RunLog>) -> Self {
        Self { config, log }
    }

    /// The full argv for `job`, executable first.
    pub fn command_line(&self, job: &Job) -> Vec<String> {
        let mut argv = vec![
            self.config.executable.display().to_string(),
            "-db".to_string(),
            job.database.to_string(),
            "-queryMol".to_string(),
            job.query_path.display().to_string(),
            "-queryFrag".to_string(),
            job.fragment_path.display().to_string(),
            "-prefix".to_string(),
            job.prefix.clone(),
        ];
        argv.extend(self.config.floors.to_args());
        if job.nproc > 1 {
            argv.push("-mpi_np".to_string());
            argv.push(job.nproc.to_string());
        }
        argv.extend(job.extra_params.iter().cloned());
        argv
    }

    pub fn output_path(&self, job: &Job) -> PathBuf {
        self.config.work_dir.join(job.id.output_file_name())
    }

    /// Runs `job` to completion, timeout or cancellation and reports what happened.
    pub async fn invoke(&self, job: &Job, cancel: &CancellationToken) -> JobResult {
        let started = Instant::now();
        if cancel.is_cancelled() {
            return self.finish(job, JobStatus::Cancelled, started);
        }

        let argv = self.command_line(job);
        if let Some(log) = self.log {
            log.command(&argv);
        }
        info!("Starting search {}", job.prefix);
        debug!("Command line: {:?}", argv);

        let output_path = self.output_path(job);
        remove_stale(&output_path);

        let console_path = self.config.work_dir.join(job.id.console_file_name());
        let mut command = Command::new(&argv[0]);
        command
            .args(&argv[1..])
            .current_dir(&self.config.work_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        match console_streams(&console_path) {
            Ok((stdout, stderr)) => {
                command.stdout(stdout).stderr(stderr);
            }
            Err(e) => {
                warn!("Cannot capture output of {} in {:?}: {}", job.prefix, console_path, e);
                command.stdout(Stdio::null()).stderr(Stdio::null());
            }
        }
        if let Some(license) = &self.config.license {
            command.env(&license.env_var, &license.path);
        }

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                let status = JobStatus::SpawnFailed {
                    reason: e.to_string(),
                };
                return self.finish(job, status, started);
            }
        };

        let timeout = self.config.execution.timeout;
        let outcome = tokio::select! {
            result = child.wait() => WaitOutcome::Exited(result),
            _ = sleep_or_forever(timeout) => WaitOutcome::TimedOut,
            _ = cancel.cancelled() => WaitOutcome::Cancelled,
        };

        let status = match outcome {
            WaitOutcome::Exited(Ok(exit)) if exit.success() => JobStatus::Succeeded,
            WaitOutcome::Exited(Ok(exit)) => JobStatus::Failed { code: exit.code() },
            WaitOutcome::Exited(Err(e)) => JobStatus::SpawnFailed {
                reason: e.to_string(),
            },
            WaitOutcome::TimedOut => {
                kill(&mut child, &job.prefix).await;
                JobStatus::TimedOut
            }
            WaitOutcome::Cancelled => {
                kill(&mut child, &job.prefix).await;
                JobStatus::Cancelled
            }
        };

        if status.is_success() && !self.config.execution.keep_intermediates {
            remove_stale(&console_path);
        }
        self.finish(job, status, started)
    }

    fn finish(&self, job: &Job, status: JobStatus, started: Instant) -> JobResult {
        let output = if status.is_success() {
            let path = self.output_path(job);
            if path.is_file() {
                Some(path)
            } else {
                info!("Search {} finished without writing a table.", job.prefix);
                None
            }
        } else {
            warn!("Search {} {}.", job.prefix, status);
            if !self.config.execution.keep_intermediates {
                remove_stale(&self.output_path(job));
            }
            None
        };

        JobResult {
            id: job.id,
            prefix: job.prefix.clone(),
            status,
            output,
            elapsed: started.elapsed(),
        }
    }
}

fn console_streams(path: &Path) -> io::Result<(Stdio, Stdio)> {
    let stdout = File::create(path)?;
    let stderr = stdout.try_clone()?;
    Ok((Stdio::from(stdout), Stdio::from(stderr)))
}

fn remove_stale(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed stale file {:?}", path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {:?}: {}", path, e),
    }
}

async fn sleep_or_forever(timeout: Option<Duration>) {
    match timeout {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending::<()>().await,
    }
}

async fn kill(child: &mut tokio::process::Child, prefix: &str) {
    if let Err(e) = child.kill().await {
        warn!("Failed to kill search {}: {}", prefix, e);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::models::job::DatabaseRef;
    use crate::engine::config::{FilterFloors, LicenseConfig, SearchConfigBuilder};
    use serial_test::serial;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::{TempDir, tempdir};

    fn fake_search(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake_search.sh");
        let script = format!(
            "#!/bin/sh\n\
             prefix=''\n\
             db=''\n\
             while [ $# -gt 0 ]; do\n\
               case \"$1\" in\n\
                 -prefix) prefix=\"$2\"; shift 2;;\n\
                 -db) db=\"$2\"; shift 2;;\n\
                 *) shift;;\n\
               esac\n\
             done\n\
             {}\n",
            body
        );
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn setup(body: &str) -> (TempDir, SearchConfig) {
        let dir = tempdir().unwrap();
        let exe = fake_search(dir.path(), body);
        let config = SearchConfigBuilder::new()
            .executable(exe)
            .work_dir(dir.path())
            .timeout(Some(Duration::from_secs(2)))
            .build()
            .unwrap();
        (dir, config)
    }

    fn job(config: &SearchConfig, nproc: usize, extra: &[&str]) -> Job {
        let id = JobId::new(0, 1);
        Job {
            id,
            prefix: id.prefix(),
            query_path: config.work_dir.join("core.smi"),
            fragment_path: config.work_dir.join("frag000.smi"),
            database: DatabaseRef::new("/db/chembl20"),
            extra_params: extra.iter().map(|s| s.to_string()).collect(),
            nproc,
        }
    }

    #[test]
    fn command_line_follows_search_contract() {
        let config = SearchConfigBuilder::new()
            .executable("/opt/brood")
            .work_dir("/w")
            .build()
            .unwrap();
        let invoker = SearchInvoker::new(&config, None);

        let argv = invoker.command_line(&job(&config, 1, &[]));
        assert_eq!(
            argv,
            vec![
                "/opt/brood",
                "-db",
                "/db/chembl20",
                "-queryMol",
                "/w/core.smi",
                "-queryFrag",
                "/w/frag000.smi",
                "-prefix",
                "frag000_db001",
                "-minMolWt",
                "0.0",
                "-minpsa",
                "0",
                "-minHvyAtom",
                "0",
            ]
        );
    }

    #[test]
    fn parallelism_flag_only_above_one_processor_and_extras_come_last() {
        let config = SearchConfigBuilder::new()
            .executable("/opt/brood")
            .floors(FilterFloors {
                min_mol_wt: 150.5,
                min_psa: 20.0,
                min_heavy_atoms: 3,
            })
            .build()
            .unwrap();
        let invoker = SearchInvoker::new(&config, None);

        let argv = invoker.command_line(&job(&config, 8, &["-maxHits", "100"]));
        let tail: Vec<_> = argv[9..].iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec![
                "-minMolWt", "150.5", "-minpsa", "20", "-minHvyAtom", "3", "-mpi_np", "8",
                "-maxHits", "100",
            ]
        );

        let single = invoker.command_line(&job(&config, 1, &[]));
        assert!(!single.contains(&"-mpi_np".to_string()));
    }

    #[tokio::test]
    #[serial]
    async fn successful_search_reports_its_table() {
        let (_dir, config) = setup("printf 'A,B\\nsub,x\\n1,2\\n' > \"$prefix.csv\"");
        let invoker = SearchInvoker::new(&config, None);

        let result = invoker
            .invoke(&job(&config, 1, &[]), &CancellationToken::new())
            .await;

        assert_eq!(result.status, JobStatus::Succeeded);
        assert_eq!(
            result.output,
            Some(config.work_dir.join("frag000_db001.csv"))
        );
        assert!(!config.work_dir.join("frag000_db001.log").exists());
    }

    #[tokio::test]
    #[serial]
    async fn success_without_table_is_missing_output() {
        let (_dir, config) = setup("exit 0");
        let invoker = SearchInvoker::new(&config, None);

        let result = invoker
            .invoke(&job(&config, 1, &[]), &CancellationToken::new())
            .await;

        assert_eq!(result.status, JobStatus::Succeeded);
        assert_eq!(result.output, None);
    }

    #[tokio::test]
    #[serial]
    async fn stale_table_from_previous_run_is_not_reused() {
        let (_dir, config) = setup("exit 0");
        std::fs::write(config.work_dir.join("frag000_db001.csv"), "old,data\n,\n1,2\n").unwrap();
        let invoker = SearchInvoker::new(&config, None);

        let result = invoker
            .invoke(&job(&config, 1, &[]), &CancellationToken::new())
            .await;

        assert_eq!(result.output, None);
    }

    #[tokio::test]
    #[serial]
    async fn non_zero_exit_is_recorded_and_console_kept() {
        let (_dir, config) = setup(
            "echo 'license expired' >&2\nprintf 'A\\nsub\\npartial\\n' > \"$prefix.csv\"\nexit 3",
        );
        let invoker = SearchInvoker::new(&config, None);

        let result = invoker
            .invoke(&job(&config, 1, &[]), &CancellationToken::new())
            .await;

        assert_eq!(result.status, JobStatus::Failed { code: Some(3) });
        assert_eq!(result.output, None);
        let console = std::fs::read_to_string(config.work_dir.join("frag000_db001.log")).unwrap();
        assert!(console.contains("license expired"));
        assert!(!config.work_dir.join("frag000_db001.csv").exists());
    }

    #[tokio::test]
    #[serial]
    async fn failed_search_table_survives_when_intermediates_are_kept() {
        let (_dir, config) = setup("printf 'A\\nsub\\npartial\\n' > \"$prefix.csv\"\nexit 3");
        let config = SearchConfig {
            execution: crate::engine::config::ExecutionConfig {
                keep_intermediates: true,
                ..config.execution.clone()
            },
            ..config
        };
        let invoker = SearchInvoker::new(&config, None);

        let result = invoker
            .invoke(&job(&config, 1, &[]), &CancellationToken::new())
            .await;

        assert_eq!(result.status, JobStatus::Failed { code: Some(3) });
        assert_eq!(result.output, None);
        assert!(config.work_dir.join("frag000_db001.csv").exists());
    }

    #[tokio::test]
    #[serial]
    async fn slow_search_times_out_and_half_written_table_is_dropped() {
        let (_dir, config) = setup("printf 'A\\nsub\\n1\\n' > \"$prefix.csv\"\nexec sleep 30");
        let config = SearchConfig {
            execution: crate::engine::config::ExecutionConfig {
                timeout: Some(Duration::from_millis(200)),
                ..config.execution.clone()
            },
            ..config
        };
        let invoker = SearchInvoker::new(&config, None);

        let result = invoker
            .invoke(&job(&config, 1, &[]), &CancellationToken::new())
            .await;

        assert_eq!(result.status, JobStatus::TimedOut);
        assert!(result.elapsed < Duration::from_secs(10));
        assert!(!config.work_dir.join("frag000_db001.csv").exists());
    }

    #[tokio::test]
    #[serial]
    async fn cancellation_kills_running_search() {
        let (_dir, config) = setup("exec sleep 30");
        let invoker = SearchInvoker::new(&config, None);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });
        let result = invoker.invoke(&job(&config, 1, &[]), &cancel).await;

        assert_eq!(result.status, JobStatus::Cancelled);
        assert!(result.elapsed < Duration::from_secs(2));
    }

    #[tokio::test]
    #[serial]
    async fn already_cancelled_job_is_never_started() {
        let (_dir, config) = setup("touch started");
        let invoker = SearchInvoker::new(&config, None);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = invoker.invoke(&job(&config, 1, &[]), &cancel).await;

        assert_eq!(result.status, JobStatus::Cancelled);
        assert!(!config.work_dir.join("started").exists());
    }

    #[tokio::test]
    #[serial]
    async fn missing_executable_is_spawn_failure() {
        let dir = tempdir().unwrap();
        let config = SearchConfigBuilder::new()
            .executable(dir.path().join("no-such-brood"))
            .work_dir(dir.path())
            .build()
            .unwrap();
        let invoker = SearchInvoker::new(&config, None);

        let result = invoker
            .invoke(&job(&config, 1, &[]), &CancellationToken::new())
            .await;

        assert!(matches!(result.status, JobStatus::SpawnFailed { .. }));
    }

    #[tokio::test]
    #[serial]
    async fn license_is_exported_to_the_child_only() {
        let (_dir, config) = setup("echo \"$OE_LICENSE\" > license_seen");
        let config = SearchConfig {
            license: Some(LicenseConfig::new("/licenses/oe_license.txt")),
            ..config
        };
        let invoker = SearchInvoker::new(&config, None);

        invoker
            .invoke(&job(&config, 1, &[]), &CancellationToken::new())
            .await;

        let seen = std::fs::read_to_string(config.work_dir.join("license_seen")).unwrap();
        assert_eq!(seen.trim(), "/licenses/oe_license.txt");
        assert_ne!(
            std::env::var("OE_LICENSE").ok().as_deref(),
            Some("/licenses/oe_license.txt")
        );
    }

    #[tokio::test]
    #[serial]
    async fn command_is_logged_before_execution() {
        let (dir, config) = setup("exit 1");
        let log_path = dir.path().join("log.dat");
        let log = RunLog::create(&log_path).unwrap();
        let invoker = SearchInvoker::new(&config, Some(&log));

        invoker
            .invoke(&job(&config, 2, &[]), &CancellationToken::new())
            .await;
        drop(log);

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("\"-prefix\", \"frag000_db001\""));
        assert!(content.contains("\"-mpi_np\", \"2\""));
    }
}
