//! Child process output streaming.
//!
//! A spawned child's stdout and stderr are read inside one async task and
//! every chunk is forwarded to an [`OutputSink`] the moment a read returns,
//! newline or not. The task resolves to a [`ProcessOutcome`] only after both
//! pipes reach EOF and the child has exited.

use super::feedback::FeedbackAnalyzer;
use colored::*;
use indicatif::ProgressBar;
use std::io::{self, Write};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tracing::{debug, trace};

const CHUNK_SIZE: usize = 8 * 1024;

/// Result of one child process run. The exit code is the only control signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// `None` when the child was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout_bytes: usize,
    pub stderr_bytes: usize,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Exit code for display, `"signal"` when there is none.
    pub fn code_label(&self) -> String {
        match self.exit_code {
            Some(code) => code.to_string(),
            None => "signal".to_string(),
        }
    }
}

/// Receives raw child output as it is produced. Chunk boundaries are
/// arbitrary: a line or a UTF-8 sequence may be split across calls.
pub trait OutputSink {
    fn on_stdout(&mut self, chunk: &[u8]);
    fn on_stderr(&mut self, chunk: &[u8]);
    fn on_exit(&mut self, _outcome: &ProcessOutcome) {}
}

/// Drive `child` to completion, streaming both pipes into `sink`.
pub async fn stream_child<S>(mut child: Child, sink: &mut S) -> io::Result<ProcessOutcome>
where
    S: OutputSink + ?Sized,
{
    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();
    let mut stdout_open = stdout.is_some();
    let mut stderr_open = stderr.is_some();
    let mut out_buf = vec![0u8; CHUNK_SIZE];
    let mut err_buf = vec![0u8; CHUNK_SIZE];
    let mut stdout_bytes = 0;
    let mut stderr_bytes = 0;

    while stdout_open || stderr_open {
        tokio::select! {
            read = next_chunk(&mut stdout, &mut out_buf), if stdout_open => {
                match read? {
                    0 => stdout_open = false,
                    n => {
                        sink.on_stdout(&out_buf[..n]);
                        stdout_bytes += n;
                    }
                }
            }
            read = next_chunk(&mut stderr, &mut err_buf), if stderr_open => {
                match read? {
                    0 => stderr_open = false,
                    n => {
                        sink.on_stderr(&err_buf[..n]);
                        stderr_bytes += n;
                    }
                }
            }
        }
    }

    let status = child.wait().await?;
    trace!(?status, stdout_bytes, stderr_bytes, "child closed");

    let outcome = ProcessOutcome {
        exit_code: status.code(),
        stdout_bytes,
        stderr_bytes,
    };
    sink.on_exit(&outcome);
    Ok(outcome)
}

// `read` is cancel safe: a read dropped by `select!` consumed nothing.
async fn next_chunk<R>(reader: &mut Option<R>, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    match reader {
        Some(reader) => reader.read(buf).await,
        None => Ok(0),
    }
}

/// Decodes a byte stream lossily without splitting a UTF-8 sequence that
/// straddles two chunks.
#[derive(Debug, Default)]
struct Utf8Stream {
    pending: Vec<u8>,
}

impl Utf8Stream {
    fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        let split = self.pending.len() - incomplete_tail(&self.pending);
        let text = String::from_utf8_lossy(&self.pending[..split]).into_owned();
        self.pending.drain(..split);
        text
    }

    fn finish(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        text
    }
}

/// Length of a truncated multi-byte sequence at the end of `bytes`.
fn incomplete_tail(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let byte = bytes[bytes.len() - back];
        if byte & 0xC0 == 0x80 {
            continue;
        }
        let width = match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        return if width > back { back } else { 0 };
    }
    0
}

/// Splits a byte stream into complete lines, `\n` or `\r\n` terminated.
#[derive(Debug, Default)]
struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(decode_line(&line));
        }
        lines
    }

    fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = decode_line(&self.pending);
        self.pending.clear();
        Some(line)
    }
}

fn decode_line(buf: &[u8]) -> String {
    let text = String::from_utf8_lossy(buf);
    text.trim_end_matches(['\n', '\r']).to_string()
}

fn write_now(mut out: impl Write, text: &str) {
    if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
        debug!("could not forward child output: {}", e);
    }
}

/// Re-emits compiler output on stdout, one complete line at a time.
///
/// Stderr is framed under a "Build Error" heading and fed to the
/// [`FeedbackAnalyzer`]. A spinner, when given, is suspended around each line
/// so the two never interleave on the terminal.
pub struct CompilerSink {
    progress: Option<ProgressBar>,
    stdout: LineSplitter,
    stderr: LineSplitter,
    stderr_seen: bool,
    feedback: FeedbackAnalyzer,
}

impl CompilerSink {
    pub fn new(progress: Option<ProgressBar>) -> Self {
        Self {
            progress,
            stdout: LineSplitter::default(),
            stderr: LineSplitter::default(),
            stderr_seen: false,
            feedback: FeedbackAnalyzer::default(),
        }
    }

    /// First hint the analyzer matched on compiler stderr, if any.
    pub fn hint(&self) -> Option<&str> {
        self.feedback.hint()
    }

    fn emit(&self, line: &str) {
        match &self.progress {
            Some(pb) => pb.suspend(|| println!("{}", line)),
            None => println!("{}", line),
        }
    }

    fn emit_stderr(&mut self, line: &str) {
        if !self.stderr_seen {
            self.stderr_seen = true;
            self.emit(&format!("\n{}", "Build Error:".red().bold()));
            self.emit(&crate::ui::rule());
        }
        self.feedback.observe(line);
        self.emit(line);
    }
}

impl OutputSink for CompilerSink {
    fn on_stdout(&mut self, chunk: &[u8]) {
        for line in self.stdout.push(chunk) {
            self.emit(&line);
        }
    }

    fn on_stderr(&mut self, chunk: &[u8]) {
        for line in self.stderr.push(chunk) {
            self.emit_stderr(&line);
        }
    }

    fn on_exit(&mut self, _outcome: &ProcessOutcome) {
        if let Some(line) = self.stdout.finish() {
            self.emit(&line);
        }
        if let Some(line) = self.stderr.finish() {
            self.emit_stderr(&line);
        }
        if let Some(pb) = self.progress.take() {
            pb.finish_and_clear();
        }
        if self.stderr_seen {
            println!("{}", crate::ui::rule());
        }
    }
}

/// Passes the built program's output straight through to our stdout, both
/// streams, flushed per chunk so prompts show before input is read.
#[derive(Debug, Default)]
pub struct PassthroughSink {
    stdout: Utf8Stream,
    stderr: Utf8Stream,
}

impl OutputSink for PassthroughSink {
    fn on_stdout(&mut self, chunk: &[u8]) {
        let text = self.stdout.decode(chunk);
        write_now(io::stdout().lock(), &text);
    }

    fn on_stderr(&mut self, chunk: &[u8]) {
        let text = self.stderr.decode(chunk);
        write_now(io::stdout().lock(), &text);
    }

    fn on_exit(&mut self, _outcome: &ProcessOutcome) {
        write_now(io::stdout().lock(), &self.stdout.finish());
        write_now(io::stdout().lock(), &self.stderr.finish());
    }
}

/// Keeps all output in memory. Meant for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exits: Vec<ProcessOutcome>,
}

impl RecordingSink {
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

impl OutputSink for RecordingSink {
    fn on_stdout(&mut self, chunk: &[u8]) {
        self.stdout.extend_from_slice(chunk);
    }

    fn on_stderr(&mut self, chunk: &[u8]) {
        self.stderr.extend_from_slice(chunk);
    }

    fn on_exit(&mut self, outcome: &ProcessOutcome) {
        self.exits.push(*outcome);
    }
}
