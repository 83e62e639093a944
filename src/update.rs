use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{info, warn};

/// Outcome of one regeneration run.
///
/// `exit_code` is `None` when the spawn itself failed or the process died to
/// a signal; both count as failures, carrying the reason in `stderr`.
#[derive(Debug)]
pub struct Invocation {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Invocation {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs the regeneration script that rewrites the derived weeks artifact.
pub struct Updater {
    script: PathBuf,
}

impl Updater {
    pub fn new(script: PathBuf) -> Self {
        Self { script }
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Spawn the script with no arguments, stream its output line-by-line to
    /// the log while capturing it, and wait for exit.
    ///
    /// Never fails the caller: a spawn error comes back as a failed
    /// [`Invocation`] with the OS error in `stderr`, the same shape as a
    /// non-zero exit.
    pub async fn run(&self) -> Invocation {
        info!(script = %self.script.display(), "running regeneration script");

        let mut child = match Command::new(&self.script)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(err) => {
                warn!(script = %self.script.display(), %err, "failed to spawn regeneration script");
                return Invocation {
                    exit_code: None,
                    stdout: String::new(),
                    stderr: err.to_string(),
                };
            }
        };

        // Drain both pipes concurrently with the wait; a script that fills
        // one pipe while we block on the other would deadlock otherwise.
        let out_pipe = child.stdout.take();
        let err_pipe = child.stderr.take();
        let (stdout, stderr, status) = tokio::join!(
            drain(out_pipe, "stdout"),
            drain(err_pipe, "stderr"),
            child.wait(),
        );

        let exit_code = match status {
            Ok(status) => status.code(),
            Err(err) => {
                warn!(%err, "failed waiting for regeneration script");
                None
            }
        };

        match exit_code {
            Some(0) => info!("regeneration script finished"),
            Some(code) => warn!(code, "regeneration script failed"),
            None => warn!("regeneration script terminated without an exit code"),
        }

        Invocation {
            exit_code,
            stdout,
            stderr,
        }
    }
}

/// Read a child pipe to EOF, logging each line and accumulating the text.
async fn drain<R>(pipe: Option<R>, stream: &str) -> String
where
    R: AsyncRead + Unpin,
{
    let Some(pipe) = pipe else {
        return String::new();
    };

    let mut lines = BufReader::new(pipe).lines();
    let mut captured = String::new();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                info!("[update-weeks {stream}] {line}");
                captured.push_str(&line);
                captured.push('\n');
            }
            Ok(None) => break,
            Err(err) => {
                warn!(%err, stream, "error reading script output");
                break;
            }
        }
    }
    captured
}
