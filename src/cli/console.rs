//! Output seams for the dispatcher and handlers.
//!
//! `Console` carries regular output (stdout) and usage text (stderr).
//! `DiagnosticLog` carries classified failure diagnostics. Both are injected
//! so tests can capture them; see `test_utils::MemoryConsole`.

use std::io::Write;

/// Regular output streams.
pub trait Console {
    /// Write one block of text to standard output, newline-terminated.
    fn out(&self, text: &str);
    /// Write one block of text to the error stream, newline-terminated.
    fn err(&self, text: &str);
}

/// Sink for diagnostic lines emitted on classified failures.
pub trait DiagnosticLog {
    /// Emit one diagnostic line.
    fn error(&self, message: &str);
}

/// Console backed by the process's stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl Console for StdConsole {
    fn out(&self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        // A closed pipe on stdout is not worth a panic.
        let _ = writeln!(stdout, "{}", text.trim_end_matches('\n'));
    }

    fn err(&self, text: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}", text.trim_end_matches('\n'));
    }
}

/// Diagnostic log writing bare lines to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrLog;

impl DiagnosticLog for StderrLog {
    fn error(&self, message: &str) {
        tracing::debug!(target: "gcall::diagnostic", %message, "Emitting diagnostic");
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{message}");
    }
}

impl<T: Console + ?Sized> Console for &T {
    fn out(&self, text: &str) {
        (**self).out(text);
    }

    fn err(&self, text: &str) {
        (**self).err(text);
    }
}

impl<T: DiagnosticLog + ?Sized> DiagnosticLog for &T {
    fn error(&self, message: &str) {
        (**self).error(message);
    }
}
