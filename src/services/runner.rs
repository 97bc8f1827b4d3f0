use std::path::PathBuf;
use tokio::process::Command;
use tokio::sync::{mpsc, watch};

/// A single scan request: the saved path of an uploaded file.
#[derive(Debug)]
pub struct ScanJob {
    pub file_path: PathBuf,
}

/// Scheduling handle for the background scan worker.
///
/// Uploads enqueue jobs here and return immediately; the worker invokes the
/// analysis script and the client never observes its completion.
#[derive(Clone)]
pub struct ScanRunner {
    tx: mpsc::UnboundedSender<ScanJob>,
}

impl ScanRunner {
    /// Spawns the worker task and returns the handle used to feed it.
    pub fn spawn(script_path: PathBuf, shutdown: watch::Receiver<bool>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = ScanWorker {
            script_path,
            rx,
            shutdown,
        };
        tokio::spawn(async move {
            worker.run().await;
        });
        Self { tx }
    }

    /// Queues a scan of the given file. Fire and forget: the caller gets no
    /// completion signal, and a failed launch is only visible in the log.
    pub fn schedule(&self, file_path: PathBuf) {
        if self.tx.send(ScanJob { file_path }).is_err() {
            tracing::error!("Scan worker has stopped, dropping job");
        }
    }
}

struct ScanWorker {
    script_path: PathBuf,
    rx: mpsc::UnboundedReceiver<ScanJob>,
    shutdown: watch::Receiver<bool>,
}

impl ScanWorker {
    async fn run(mut self) {
        tracing::info!("🚀 Scan worker started ({})", self.script_path.display());

        loop {
            tokio::select! {
                _ = self.shutdown.changed() => {
                    tracing::info!("🛑 Scan worker shutting down");
                    break;
                }
                job = self.rx.recv() => match job {
                    Some(job) => self.run_script(&job).await,
                    None => break,
                },
            }
        }
    }

    async fn run_script(&self, job: &ScanJob) {
        tracing::info!(
            "Running {} {}",
            self.script_path.display(),
            job.file_path.display()
        );

        // Exit status and stderr are captured for the log only; nothing is
        // retried or reported back to the uploader.
        match Command::new(&self.script_path)
            .arg(&job.file_path)
            .output()
            .await
        {
            Ok(output) if output.status.success() => {
                tracing::info!("Script finished for {}", job.file_path.display());
            }
            Ok(output) => {
                tracing::error!(
                    "Script exited with {} for {}: {}",
                    output.status,
                    job.file_path.display(),
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            Err(e) => {
                tracing::error!("Error running script: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[cfg(unix)]
    fn write_stub_script(dir: &std::path::Path, log: &std::path::Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("stub.sh");
        std::fs::write(&script, format!("#!/bin/sh\necho \"$1\" >> {}\n", log.display())).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    #[cfg(unix)]
    async fn wait_for_log(log: &std::path::Path) -> String {
        for _ in 0..50 {
            if let Ok(contents) = std::fs::read_to_string(log) {
                if !contents.is_empty() {
                    return contents;
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("stub script never ran");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runner_invokes_script_with_file_path() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("invocations.log");
        let script = write_stub_script(dir.path(), &log);

        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let runner = ScanRunner::spawn(script, shutdown_rx);

        let target = dir.path().join("payload.bin");
        runner.schedule(target.clone());

        let contents = wait_for_log(&log).await;
        assert_eq!(contents.trim(), target.to_str().unwrap());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runner_survives_failing_script() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("invocations.log");

        let script = dir.path().join("fail.sh");
        std::fs::write(
            &script,
            format!("#!/bin/sh\nif [ \"$1\" = \"bad\" ]; then exit 1; fi\necho \"$1\" >> {}\n", log.display()),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let runner = ScanRunner::spawn(script, shutdown_rx);

        // A non-zero exit must not kill the worker
        runner.schedule(PathBuf::from("bad"));
        runner.schedule(PathBuf::from("good"));

        let contents = wait_for_log(&log).await;
        assert_eq!(contents.trim(), "good");
    }

    #[tokio::test]
    async fn test_runner_stops_on_shutdown() {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let runner = ScanRunner::spawn(PathBuf::from("/nonexistent"), shutdown_rx);

        shutdown_tx.send(true).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // The worker is gone; scheduling just logs and drops the job
        runner.schedule(PathBuf::from("ignored"));
    }
}
