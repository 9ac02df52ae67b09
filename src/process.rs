//! Child process plumbing for the external tag tools.
//!
//! Every invocation gets an explicit environment, an optional working
//! directory and an optional deadline. Exit codes are returned as data; the
//! caller decides what counts as failure.

use crate::environment::IndexEnvironment;
use crate::error::{Result, TagError};
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::str::FromStr;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How a command line is turned into a child process. Fixed per runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecMode {
    /// Exec the binary with its argv.
    #[default]
    Direct,
    /// Hand the quoted command line to the platform shell. On unix the shell
    /// and whatever it starts share one process group, which is killed as a
    /// whole on timeout. Elsewhere only the shell itself is killed.
    Shell,
}

impl FromStr for ExecMode {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "direct" | "exec" => Ok(ExecMode::Direct),
            "shell" | "sh" => Ok(ExecMode::Shell),
            _ => Err(format!("unknown exec mode: {raw}")),
        }
    }
}

/// Which output streams to keep. Uncaptured streams go to the null device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capture {
    pub stdout: bool,
    pub stderr: bool,
}

impl Capture {
    pub const NONE: Capture = Capture {
        stdout: false,
        stderr: false,
    };
    pub const STDOUT: Capture = Capture {
        stdout: true,
        stderr: false,
    };
    pub const STDERR: Capture = Capture {
        stdout: false,
        stderr: true,
    };
    pub const BOTH: Capture = Capture {
        stdout: true,
        stderr: true,
    };
}

#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `None` when the child was terminated by a signal.
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Split a command line using shell quoting rules.
pub fn split_command(line: &str) -> Result<Vec<String>> {
    let argv =
        shlex::split(line).ok_or_else(|| TagError::Command(format!("unbalanced quoting: {line}")))?;
    if argv.is_empty() {
        return Err(TagError::Command("empty command".to_string()));
    }
    Ok(argv)
}

#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    mode: ExecMode,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(mode: ExecMode, timeout: Option<Duration>) -> Self {
        Self { mode, timeout }
    }

    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    /// Tokenize `line` and run it. See [`ProcessRunner::run`].
    pub fn run_line(
        &self,
        line: &str,
        env: &IndexEnvironment,
        cwd: Option<&Path>,
        capture: Capture,
    ) -> Result<ProcessOutput> {
        let argv = split_command(line)?;
        self.run(&argv, env, cwd, capture)
    }

    /// Run `argv` to completion (or until the deadline), blocking the caller.
    pub fn run(
        &self,
        argv: &[String],
        env: &IndexEnvironment,
        cwd: Option<&Path>,
        capture: Capture,
    ) -> Result<ProcessOutput> {
        let Some(program) = argv.first() else {
            return Err(TagError::Command("empty command".to_string()));
        };
        let mut cmd = self.build_command(argv)?;
        cmd.env_clear();
        cmd.envs(env.iter());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        cmd.stdout(if capture.stdout {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        cmd.stderr(if capture.stderr {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|source| TagError::Spawn {
            program: program.clone(),
            source,
        })?;

        // Drain both pipes concurrently; a child blocked on a full stderr pipe
        // would otherwise never exit.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = self.wait(&mut child, program)?;
        let output = ProcessOutput {
            stdout: collect(stdout)?,
            stderr: collect(stderr)?,
            exit_code: status.code(),
        };
        tracing::debug!(
            program = %program,
            args = argv.len() - 1,
            exit_code = ?output.exit_code,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "tool finished"
        );
        Ok(output)
    }

    fn build_command(&self, argv: &[String]) -> Result<Command> {
        match self.mode {
            ExecMode::Direct => {
                let mut cmd = Command::new(&argv[0]);
                cmd.args(&argv[1..]);
                Ok(cmd)
            }
            ExecMode::Shell => shell_command(argv),
        }
    }

    fn wait(&self, child: &mut Child, program: &str) -> Result<ExitStatus> {
        let Some(timeout) = self.timeout else {
            return Ok(child.wait()?);
        };
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            let now = Instant::now();
            if now >= deadline {
                kill_tree(child);
                let _ = child.wait();
                tracing::warn!(program, timeout_secs = timeout.as_secs(), "killed tool after timeout");
                return Err(TagError::TimedOut {
                    program: program.to_string(),
                    timeout,
                });
            }
            thread::sleep(POLL_INTERVAL.min(deadline - now));
        }
    }
}

#[cfg(unix)]
fn shell_command(argv: &[String]) -> Result<Command> {
    let line = shlex::try_join(argv.iter().map(String::as_str))
        .map_err(|err| TagError::Command(err.to_string()))?;
    let mut cmd = Command::new("/bin/sh");
    cmd.arg("-c").arg(line);
    Ok(cmd)
}

#[cfg(not(unix))]
fn shell_command(argv: &[String]) -> Result<Command> {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").args(argv);
    Ok(cmd)
}

/// Kill the child and, on unix, every process in its group.
#[cfg(unix)]
fn kill_tree(child: &mut Child) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    if killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL).is_err() {
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
    let _ = child.kill();
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn collect(handle: Option<JoinHandle<io::Result<Vec<u8>>>>) -> Result<Vec<u8>> {
    let Some(handle) = handle else {
        return Ok(Vec::new());
    };
    match handle.join() {
        Ok(result) => Ok(result?),
        Err(_) => Err(TagError::Io(io::Error::other("output reader thread panicked"))),
    }
}
