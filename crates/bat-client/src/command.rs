use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use bat_core::Credentials;

use crate::error::ClientError;

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured output of a finished ciao-cli invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CliOutput {
    /// Ordered stdout lines, as the parsers consume them.
    pub fn stdout_lines(&self) -> Vec<&str> {
        self.stdout.lines().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiaoCli {
    pub binary: PathBuf,
}

impl Default for CiaoCli {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ciao-cli"),
        }
    }
}

impl CiaoCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Run the client with exactly the credential environment, waiting up
    /// to `timeout` for it to exit.
    ///
    /// A child that misses the deadline is killed and reaped before the
    /// timeout is reported, so a stuck command cannot outlive its test.
    pub fn run<I, S>(
        &self,
        credentials: &Credentials,
        timeout: Duration,
        args: I,
    ) -> Result<CliOutput, ClientError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let owned_args: Vec<OsString> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_os_string())
            .collect();
        let rendered = render_command(&self.binary, &owned_args);

        let mut command = Command::new(&self.binary);
        command.env_clear();
        for (key, value) in credentials.vars() {
            command.env(key, value);
        }
        for arg in &owned_args {
            command.arg(arg);
        }
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        let start = Instant::now();
        let mut child = command.spawn().map_err(|source| ClientError::Io {
            command: rendered.clone(),
            source,
        })?;

        loop {
            match child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) => {}
                Err(source) => {
                    return Err(ClientError::Io {
                        command: rendered,
                        source,
                    })
                }
            }

            if start.elapsed() >= timeout {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ClientError::Timeout {
                    command: rendered,
                    timeout_secs: timeout.as_secs(),
                });
            }

            thread::sleep(WAIT_POLL_INTERVAL);
        }

        let output = child.wait_with_output().map_err(|source| ClientError::Io {
            command: rendered.clone(),
            source,
        })?;

        let stdout =
            String::from_utf8(output.stdout).map_err(|source| ClientError::NonUtf8Output {
                command: rendered.clone(),
                stream: "stdout",
                source,
            })?;
        let stderr =
            String::from_utf8(output.stderr).map_err(|source| ClientError::NonUtf8Output {
                command: rendered.clone(),
                stream: "stderr",
                source,
            })?;

        if !output.status.success() {
            return Err(ClientError::CommandFailed {
                command: rendered,
                status: output.status.code(),
                stdout,
                stderr,
            });
        }

        Ok(CliOutput { stdout, stderr })
    }
}

fn render_command(binary: &Path, args: &[OsString]) -> String {
    let mut rendered = binary.to_string_lossy().into_owned();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}
