//! # word-automation
//!
//! Ask an installed Microsoft Word for the page count of a document, using
//! whatever inter-process automation channel the host OS offers:
//!
//! | Host    | Channel                                   | Tool                    |
//! |---------|-------------------------------------------|-------------------------|
//! | Windows | `Word.Application` COM object             | `powershell` / `pwsh`   |
//! | macOS   | AppleScript `tell application "Microsoft Word"` | `osascript`       |
//!
//! Word lays the document out with its own engine, so the number it reports
//! is the most faithful one obtainable. It is also the slowest (Word has to
//! start) and the least portable, which is why every call is bounded by a
//! timeout and every failure is an ordinary [`AutomationError`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use word_automation::{count_pages, Backend, DEFAULT_TIMEOUT};
//!
//! match count_pages(Backend::WordCom, Path::new(r"C:\cv.docx"), DEFAULT_TIMEOUT) {
//!     Ok(pages) => println!("{pages} pages"),
//!     Err(e) => eprintln!("Word unavailable: {e}"),
//! }
//! ```
//!
//! The document path never becomes part of the script text: PowerShell reads
//! it from an environment variable and AppleScript receives it as `argv`.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

// ── Public constants ─────────────────────────────────────────────────────────

/// Default upper bound for one automation round trip, Word start-up included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// `WdStatistic.wdStatisticPages`.
pub const WD_STATISTIC_PAGES: u8 = 2;

/// Environment variable through which the PowerShell script receives the path.
const PATH_ENV_VAR: &str = "WORD_AUTOMATION_DOC_PATH";

/// Default install location of Word on macOS.
const MAC_WORD_APP: &str = "/Applications/Microsoft Word.app";

/// How often a running script is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

const POWERSHELL_SCRIPT: &str = r#"
$ErrorActionPreference = 'Stop'
$word = New-Object -ComObject Word.Application
try {
    $word.Visible = $false
    $word.DisplayAlerts = 0
    $doc = $word.Documents.Open($env:WORD_AUTOMATION_DOC_PATH, $false, $true)
    try {
        [Console]::Out.WriteLine($doc.ComputeStatistics(2))
    } finally {
        $doc.Close(0)
    }
} finally {
    $word.Quit()
    [void][System.Runtime.InteropServices.Marshal]::ReleaseComObject($word)
}
"#;

const APPLESCRIPT: &str = r#"
on run argv
    set docFile to POSIX file (item 1 of argv)
    tell application "Microsoft Word"
        set myDoc to open docFile
        set pageCount to compute statistics myDoc statistic statistic pages
        close myDoc saving no
        return pageCount
    end tell
end run
"#;

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by word-automation operations.
#[derive(Error, Debug)]
pub enum AutomationError {
    /// The backend's channel does not exist on the OS this process runs on.
    #[error("{backend} automation requires a {required} host, running on {host}")]
    UnsupportedHost {
        backend: &'static str,
        required: &'static str,
        host: String,
    },

    /// None of the backend's scripting tools is on `PATH`.
    #[error("None of {candidates:?} found on PATH")]
    ToolNotFound { candidates: &'static [&'static str] },

    /// The word processor itself is not installed.
    #[error("Microsoft Word is not installed at '{path}'")]
    ApplicationNotInstalled { path: PathBuf },

    /// The scripting tool could not be started.
    #[error("Failed to start '{tool}': {source}")]
    Spawn {
        tool: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The script did not finish in time and was killed.
    ///
    /// Only the scripting tool is killed. Word itself may still be running
    /// with the document open.
    #[error("Automation timed out after {}s", .timeout.as_secs())]
    TimedOut { timeout: Duration },

    /// The script exited unsuccessfully (Word missing, COM error, dialog …).
    #[error("Automation script failed (exit code {code:?}): {stderr}")]
    ScriptFailed { code: Option<i32>, stderr: String },

    /// The script succeeded but did not print an integer.
    #[error("Unexpected automation output: {output:?}")]
    InvalidOutput { output: String },
}

// ── Backends ─────────────────────────────────────────────────────────────────

/// An automation channel to Microsoft Word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Windows: COM `Word.Application`, scripted through PowerShell.
    WordCom,
    /// macOS: AppleScript, run by `osascript`.
    WordAppleScript,
}

impl Backend {
    /// Short human-readable name used in errors and logs.
    pub fn name(self) -> &'static str {
        match self {
            Backend::WordCom => "Word COM",
            Backend::WordAppleScript => "Word AppleScript",
        }
    }

    /// Value of [`std::env::consts::OS`] on which this backend can run.
    pub fn required_os(self) -> &'static str {
        match self {
            Backend::WordCom => "windows",
            Backend::WordAppleScript => "macos",
        }
    }

    /// Whether the current process runs on this backend's OS.
    pub fn supported_on_host(self) -> bool {
        std::env::consts::OS == self.required_os()
    }

    fn tool_candidates(self) -> &'static [&'static str] {
        match self {
            Backend::WordCom => &["powershell", "pwsh"],
            Backend::WordAppleScript => &["osascript"],
        }
    }

    /// Resolve the scripting tool for this backend on `PATH`.
    pub fn locate_tool(self) -> Result<PathBuf, AutomationError> {
        let candidates = self.tool_candidates();
        candidates
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or(AutomationError::ToolNotFound { candidates })
    }

    fn command(self, tool: &Path, doc_path: &Path) -> Command {
        let mut cmd = Command::new(tool);
        match self {
            Backend::WordCom => {
                cmd.args([
                    "-NoProfile",
                    "-NonInteractive",
                    "-ExecutionPolicy",
                    "Bypass",
                    "-Command",
                    POWERSHELL_SCRIPT,
                ])
                .env(PATH_ENV_VAR, doc_path);
            }
            Backend::WordAppleScript => {
                cmd.arg("-e").arg(APPLESCRIPT).arg(doc_path);
            }
        }
        cmd
    }
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Open `doc_path` in Word through `backend` and return the page count Word
/// computes for it.
///
/// The value is returned as Word printed it; a zero or negative count is the
/// caller's to judge. `doc_path` should be absolute: Word resolves relative
/// paths against its own working directory, not ours.
///
/// # Timeouts
///
/// When `timeout` expires the `powershell`/`osascript` child is killed, but
/// Word runs as its own COM or Apple Events server and is not a child of
/// ours. It can stay alive with `doc_path` open until it finishes or is
/// closed by hand. On Windows the open document is locked, so a caller that
/// wants to delete `doc_path` afterwards may see that fail. A `timeout` too
/// large to form a deadline waits without one.
pub fn count_pages(
    backend: Backend,
    doc_path: &Path,
    timeout: Duration,
) -> Result<i64, AutomationError> {
    if !backend.supported_on_host() {
        return Err(AutomationError::UnsupportedHost {
            backend: backend.name(),
            required: backend.required_os(),
            host: std::env::consts::OS.to_string(),
        });
    }

    if backend == Backend::WordAppleScript {
        let app = Path::new(MAC_WORD_APP);
        if !app.exists() {
            return Err(AutomationError::ApplicationNotInstalled {
                path: app.to_path_buf(),
            });
        }
    }

    let tool = backend.locate_tool()?;
    debug!(
        "{}: asking Word for pages of {} via {}",
        backend.name(),
        doc_path.display(),
        tool.display()
    );

    let output = run_with_timeout(backend.command(&tool, doc_path), &tool, timeout)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!("{} script failed: {}", backend.name(), stderr);
        return Err(AutomationError::ScriptFailed {
            code: output.status.code(),
            stderr,
        });
    }

    parse_page_count(&String::from_utf8_lossy(&output.stdout))
}

/// Parse the integer printed by an automation script.
///
/// Only the last non-empty line counts; PowerShell profiles and AppleScript
/// warnings may print noise before it.
pub fn parse_page_count(stdout: &str) -> Result<i64, AutomationError> {
    let line = stdout
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .unwrap_or("");

    line.parse::<i64>()
        .map_err(|_| AutomationError::InvalidOutput {
            output: stdout.trim().to_string(),
        })
}

// ── Internal helpers ─────────────────────────────────────────────────────────

/// Run `cmd` to completion, killing it once `timeout` elapses. A `timeout`
/// that overflows [`Instant`] means no deadline.
///
/// stdout and stderr are drained on their own threads so a chatty child can
/// never block on a full pipe while we wait for it.
fn run_with_timeout(
    mut cmd: Command,
    tool: &Path,
    timeout: Duration,
) -> Result<Output, AutomationError> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| AutomationError::Spawn {
            tool: tool.to_path_buf(),
            source,
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now().checked_add(timeout);
    let status = match wait_until(&mut child, deadline) {
        Ok(Some(status)) => status,
        Ok(None) => {
            let _ = child.kill();
            let _ = child.wait();
            warn!(
                "{} killed after {}s; Word may still hold the document open",
                tool.display(),
                timeout.as_secs()
            );
            return Err(AutomationError::TimedOut { timeout });
        }
        Err(source) => {
            let _ = child.kill();
            return Err(AutomationError::Spawn {
                tool: tool.to_path_buf(),
                source,
            });
        }
    };

    Ok(Output {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    })
}

/// Poll `child` until it exits or `deadline` passes. `None` waits forever.
fn wait_until(
    child: &mut Child,
    deadline: Option<Instant>,
) -> std::io::Result<Option<std::process::ExitStatus>> {
    let Some(deadline) = deadline else {
        return child.wait().map(Some);
    };
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
