//! Utilities related to launching external programs.
//!
//! Every external tool (the basecaller, the object storage client, `tar`, and
//! `pod5`) is described by a [`CommandLine`] before it is run. Keeping the
//! description separate from the execution lets the exact command be logged,
//! shown in dry runs, and asserted on in tests.

use std::ffi::OsStr;
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::Child;
use std::process::Command;
use std::process::ExitStatus;
use std::process::Output;
use std::process::Stdio;
use std::sync::mpsc;
use std::sync::mpsc::RecvTimeoutError;
use std::sync::mpsc::Sender;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::debug;

use crate::cancel::CancellationToken;
use crate::errors::ToolError;

/// How often a running child process is checked for completion or
/// cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// The largest piece of streamed output handed over at once.
const CHUNK_SIZE: usize = 64 * 1024;

/// A program and its arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLine {
    program: PathBuf,
    args: Vec<OsString>,
}

impl CommandLine {
    /// Creates a new [`CommandLine`] for the given program with no arguments.
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        CommandLine {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends an argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    /// The program that will be launched.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The arguments passed to the program.
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// A short name for the program, used in error messages.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .unwrap_or(self.program.as_os_str())
            .to_string_lossy()
            .into_owned()
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).stdin(Stdio::null());
        command
    }

    fn spawn(&self, mut command: Command) -> Result<Child, ToolError> {
        debug!("running: {}", self);
        command.spawn().map_err(|source| ToolError::Spawn {
            program: self.program_name(),
            source,
        })
    }

    fn check_cancelled(&self, cancel: &CancellationToken) -> Result<(), ToolError> {
        if cancel.is_cancelled() {
            return Err(ToolError::Cancelled {
                program: self.program_name(),
            });
        }

        Ok(())
    }

    /// Runs the program to completion. Standard output is discarded and
    /// standard error is passed through to our own.
    pub fn run(&self, cancel: &CancellationToken) -> Result<(), ToolError> {
        self.run_with(Stdio::null(), Stdio::inherit(), cancel)
    }

    /// Runs the program to completion with the given standard output and
    /// standard error destinations.
    pub fn run_with(
        &self,
        stdout: Stdio,
        stderr: Stdio,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError> {
        self.check_cancelled(cancel)?;

        let mut command = self.command();
        command.stdout(stdout).stderr(stderr);
        let child = self.spawn(command)?;

        let status = self.wait(child, cancel)?;
        self.check_status(status)
    }

    /// Runs the program and captures everything it writes. Intended for short
    /// queries such as version checks and listings.
    pub fn output(&self, cancel: &CancellationToken) -> Result<Output, ToolError> {
        self.check_cancelled(cancel)?;

        let mut command = self.command();
        command.stdout(Stdio::piped()).stderr(Stdio::piped());
        let mut child = self.spawn(command)?;

        // Drain both pipes while the child is polled.
        let stdout = child.stdout.take().map(read_to_end);
        let stderr = child.stderr.take().map(read_to_end);

        let status = self.wait(child, cancel)?;
        let output = Output {
            status,
            stdout: self.join(stdout)?,
            stderr: self.join(stderr)?,
        };

        self.check_status(output.status)?;
        Ok(output)
    }

    /// Runs the program and copies its standard output into `sink` as it is
    /// produced. Standard error is passed through to our own.
    pub fn stream_stdout(
        &self,
        sink: &mut dyn Write,
        cancel: &CancellationToken,
    ) -> Result<(), ToolError> {
        self.check_cancelled(cancel)?;

        let mut command = self.command();
        command.stdout(Stdio::piped()).stderr(Stdio::inherit());
        let mut child = self.spawn(command)?;

        let (tx, rx) = mpsc::channel();
        match child.stdout.take() {
            Some(stdout) => {
                thread::spawn(move || forward_chunks(stdout, tx));
            }
            None => drop(tx),
        }

        loop {
            if cancel.is_cancelled() {
                return Err(self.abort(&mut child));
            }

            let chunk = match rx.recv_timeout(POLL_INTERVAL) {
                Ok(chunk) => chunk,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            if let Err(source) = chunk.and_then(|chunk| sink.write_all(&chunk)) {
                kill(&mut child);
                return Err(self.io_error(source));
            }
        }

        let status = self.wait(child, cancel)?;
        self.check_status(status)
    }

    fn wait(&self, mut child: Child, cancel: &CancellationToken) -> Result<ExitStatus, ToolError> {
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {}
                Err(source) => return Err(self.io_error(source)),
            }

            if cancel.is_cancelled() {
                return Err(self.abort(&mut child));
            }

            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Kills a running child in response to cancellation.
    fn abort(&self, child: &mut Child) -> ToolError {
        debug!("cancelling: {}", self);
        kill(child);
        ToolError::Cancelled {
            program: self.program_name(),
        }
    }

    /// Collects the bytes gathered by a [`read_to_end`] thread.
    fn join(&self, reader: Option<JoinHandle<io::Result<Vec<u8>>>>) -> Result<Vec<u8>, ToolError> {
        let Some(reader) = reader else {
            return Ok(Vec::new());
        };

        reader
            .join()
            .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "pipe reader panicked")))
            .map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: io::Error) -> ToolError {
        ToolError::Io {
            program: self.program_name(),
            source,
        }
    }

    fn check_status(&self, status: ExitStatus) -> Result<(), ToolError> {
        if status.success() {
            Ok(())
        } else {
            Err(ToolError::Status {
                program: self.program_name(),
                code: status.code(),
            })
        }
    }
}

/// Kills `child` and reaps it. Killing an already exited process is harmless.
fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn read_to_end<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

/// Sends everything read from `reader` down `tx` in chunks. A read error is
/// forwarded and ends the stream.
fn forward_chunks<R: Read>(mut reader: R, tx: Sender<io::Result<Vec<u8>>>) {
    let mut buffer = [0; CHUNK_SIZE];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => return,
            Ok(n) => {
                if tx.send(Ok(buffer[..n].to_vec())).is_err() {
                    return;
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => {
                let _ = tx.send(Err(err));
                return;
            }
        }
    }
}

/// Quotes a single argument for display if it would otherwise be ambiguous
/// when pasted into a shell.
fn quote(arg: &OsStr) -> String {
    let arg = arg.to_string_lossy();
    let needs_quotes = arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '$' | '`' | '\\' | ';' | '&' | '|'));

    if needs_quotes {
        format!("'{}'", arg.replace('\'', r"'\''"))
    } else {
        arg.into_owned()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(self.program.as_os_str()))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_quotes_only_when_needed() {
        let command = CommandLine::new("/opt/dorado/current/bin/dorado")
            .arg("basecaller")
            .arg("sup@v5.0.0")
            .arg("/data/my run")
            .args(["-x", "cuda:0,1"]);

        assert_eq!(
            command.to_string(),
            "/opt/dorado/current/bin/dorado basecaller sup@v5.0.0 '/data/my run' -x cuda:0,1"
        );
    }

    #[test]
    fn test_program_name_is_the_file_name() {
        let command = CommandLine::new("/usr/local/bin/pod5");
        assert_eq!(command.program_name(), "pod5");
    }

    #[test]
    fn test_cancelled_commands_never_launch() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = CommandLine::new("/definitely/not/a/real/program").run(&cancel);
        assert!(matches!(result, Err(ToolError::Cancelled { .. })));
    }

    #[test]
    fn test_missing_program_is_a_spawn_error() {
        let result =
            CommandLine::new("/definitely/not/a/real/program").run(&CancellationToken::new());
        assert!(matches!(result, Err(ToolError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_is_reported() {
        let result = CommandLine::new("sh")
            .args(["-c", "exit 3"])
            .run(&CancellationToken::new());
        assert!(matches!(
            result,
            Err(ToolError::Status { code: Some(3), .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_stream_stdout_copies_output() {
        let mut sink = Vec::new();
        CommandLine::new("sh")
            .args(["-c", "printf 'read_id\\tlength\\n'"])
            .stream_stdout(&mut sink, &CancellationToken::new())
            .unwrap();
        assert_eq!(sink, b"read_id\tlength\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_output_captures_both_streams() {
        let output = CommandLine::new("sh")
            .args(["-c", "printf 'dorado 0.7.2'; printf 'warming up' >&2"])
            .output(&CancellationToken::new())
            .unwrap();
        assert_eq!(output.stdout, b"dorado 0.7.2");
        assert_eq!(output.stderr, b"warming up");
    }

    /// A token that is cancelled from another thread after `delay`.
    #[cfg(unix)]
    fn cancel_after(delay: Duration) -> CancellationToken {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            trigger.cancel();
        });
        cancel
    }

    #[cfg(unix)]
    fn assert_killed_promptly<F>(launch: F)
    where
        F: FnOnce(&CommandLine, &CancellationToken) -> Result<(), ToolError>,
    {
        let sleeper = CommandLine::new("sh").args(["-c", "exec sleep 3"]);
        let cancel = cancel_after(Duration::from_millis(200));

        let started = std::time::Instant::now();
        let result = launch(&sleeper, &cancel);
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(ToolError::Cancelled { .. })));
        assert!(elapsed < Duration::from_millis(1500), "took {:?}", elapsed);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_is_killed_on_cancel() {
        assert_killed_promptly(|command, cancel| command.run(cancel));
    }

    #[cfg(unix)]
    #[test]
    fn test_output_is_killed_on_cancel() {
        assert_killed_promptly(|command, cancel| command.output(cancel).map(|_| ()));
    }

    #[cfg(unix)]
    #[test]
    fn test_stream_stdout_is_killed_on_cancel() {
        let mut sink = Vec::new();
        assert_killed_promptly(|command, cancel| command.stream_stdout(&mut sink, cancel));
        assert!(sink.is_empty());
    }
}
