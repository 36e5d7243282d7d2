//! External `gofmt` formatting step

use crudgen::assemble::SourceFormatter;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// Pipes assembled source through a `gofmt` binary
#[derive(Debug, Clone)]
pub struct Gofmt {
    program: PathBuf,
}

impl Default for Gofmt {
    fn default() -> Self {
        Self {
            program: PathBuf::from("gofmt"),
        }
    }
}

impl Gofmt {
    /// Use `program` instead of `gofmt` from `PATH`
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SourceFormatter for Gofmt {
    fn format(&self, source: &str) -> Result<String, String> {
        debug!(program = %self.program.display(), "running gofmt");

        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to run {}: {e}", self.program.display()))?;

        // gofmt reads all of stdin before writing, so the pipe cannot fill up here
        let written = child
            .stdin
            .take()
            .ok_or_else(|| "gofmt stdin unavailable".to_string())
            .and_then(|mut stdin| {
                stdin
                    .write_all(source.as_bytes())
                    .map_err(|e| format!("failed to write to gofmt: {e}"))
            });
        if let Err(message) = written {
            let _ = child.kill();
            let _ = child.wait();
            return Err(message);
        }

        let output = child
            .wait_with_output()
            .map_err(|e| format!("gofmt did not finish: {e}"))?;

        if output.status.success() {
            String::from_utf8(output.stdout).map_err(|e| format!("gofmt output is not UTF-8: {e}"))
        } else {
            Err(String::from_utf8_lossy(&output.stderr).trim().to_string())
        }
    }
}
