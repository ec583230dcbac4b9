//! Test utilities for gcall.
//!
//! Provides capture consoles, stub handlers, discovery fixtures and temp
//! directories for use across all test modules.
//!
//! # Usage
//!
//! ```rust,ignore
//! use gcall::test_utils::*;
//!
//! let console = MemoryConsole::new();
//! let dispatcher = Dispatcher::new(StubHandlers::ok(), &console, &console);
//! let doc = make_test_rest_document("http://127.0.0.1:8080/");
//! ```

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use crate::cli::args::{ExecuteArgs, ShowArgs};
use crate::cli::console::{Console, DiagnosticLog};
use crate::cli::dispatch::Handlers;
use crate::core::discovery::RestDocument;
use crate::error::{CommandError, Result};

// =============================================================================
// Capture Console
// =============================================================================

/// Console and diagnostic log that keep everything in memory.
#[derive(Debug, Default)]
pub struct MemoryConsole {
    stdout: RefCell<Vec<String>>,
    stderr: RefCell<Vec<String>>,
    diagnostics: RefCell<Vec<String>>,
}

impl MemoryConsole {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks written to stdout, in order.
    #[must_use]
    pub fn stdout(&self) -> Vec<String> {
        self.stdout.borrow().clone()
    }

    /// Blocks written to stderr (usage text), in order.
    #[must_use]
    pub fn stderr(&self) -> Vec<String> {
        self.stderr.borrow().clone()
    }

    /// Diagnostic lines, in order.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<String> {
        self.diagnostics.borrow().clone()
    }
}

impl Console for MemoryConsole {
    fn out(&self, text: &str) {
        self.stdout.borrow_mut().push(text.to_string());
    }

    fn err(&self, text: &str) {
        self.stderr.borrow_mut().push(text.to_string());
    }
}

impl DiagnosticLog for MemoryConsole {
    fn error(&self, message: &str) {
        self.diagnostics.borrow_mut().push(message.to_string());
    }
}

// =============================================================================
// Stub Handlers
// =============================================================================

type ErrorFactory = Box<dyn Fn() -> CommandError>;

/// Handlers that either succeed, printing `<name> ran`, or fail with an
/// error built by a factory.
pub struct StubHandlers {
    error: Option<ErrorFactory>,
    calls: RefCell<Vec<&'static str>>,
}

impl StubHandlers {
    /// Handlers that always succeed.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            error: None,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Handlers that always fail with `make_error()`.
    pub fn failing(make_error: impl Fn() -> CommandError + 'static) -> Self {
        Self {
            error: Some(Box::new(make_error)),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Subcommands invoked so far.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn run(&self, name: &'static str, console: &dyn Console) -> Result<()> {
        self.calls.borrow_mut().push(name);
        match &self.error {
            Some(make_error) => Err(make_error()),
            None => {
                console.out(&format!("{name} ran"));
                Ok(())
            }
        }
    }
}

impl Handlers for StubHandlers {
    async fn show(&self, _args: &ShowArgs, console: &dyn Console) -> Result<()> {
        self.run("show", console)
    }

    async fn execute(&self, _args: &ExecuteArgs, console: &dyn Console) -> Result<()> {
        self.run("execute", console)
    }
}

// =============================================================================
// Discovery Fixtures
// =============================================================================

/// A discovery directory listing with two Drive versions and YouTube.
#[must_use]
pub fn make_test_directory_listing() -> Value {
    json!({
        "kind": "discovery#directoryList",
        "discoveryVersion": "v1",
        "items": [
            {
                "kind": "discovery#directoryItem",
                "id": "drive:v2",
                "name": "drive",
                "version": "v2",
                "title": "Google Drive API",
                "description": "The Google Drive API allows clients to access resources from Google Drive.",
                "preferred": false
            },
            {
                "kind": "discovery#directoryItem",
                "id": "drive:v3",
                "name": "drive",
                "version": "v3",
                "title": "Google Drive API",
                "description": "The Google Drive API allows clients to access resources from Google Drive.",
                "preferred": true
            },
            {
                "kind": "discovery#directoryItem",
                "id": "youtube:v3",
                "name": "youtube",
                "version": "v3",
                "title": "YouTube Data API v3",
                "preferred": true
            }
        ]
    })
}

/// A trimmed Drive v3 REST document whose `rootUrl` is `root_url`.
#[must_use]
pub fn make_test_rest_document_value(root_url: &str) -> Value {
    let file_id = json!({
        "type": "string",
        "description": "The ID of the file.",
        "required": true,
        "location": "path"
    });
    json!({
        "kind": "discovery#restDescription",
        "id": "drive:v3",
        "name": "drive",
        "version": "v3",
        "title": "Google Drive API",
        "rootUrl": root_url,
        "servicePath": "drive/v3/",
        "parameters": {
            "fields": {"type": "string", "location": "query"},
            "key": {"type": "string", "location": "query"}
        },
        "schemas": {
            "About": {
                "id": "About",
                "type": "object",
                "properties": {"user": {"type": "object"}}
            },
            "File": {
                "id": "File",
                "type": "object",
                "properties": {
                    "id": {"type": "string"},
                    "name": {"type": "string"},
                    "mimeType": {"type": "string"}
                }
            },
            "FileList": {
                "id": "FileList",
                "type": "object",
                "properties": {
                    "files": {"type": "array", "items": {"$ref": "File"}},
                    "nextPageToken": {"type": "string"}
                }
            }
        },
        "resources": {
            "about": {
                "methods": {
                    "get": {
                        "id": "drive.about.get",
                        "httpMethod": "GET",
                        "path": "about",
                        "description": "Gets information about the user, the user's Drive, and system capabilities.",
                        "response": {"$ref": "About"}
                    }
                }
            },
            "files": {
                "methods": {
                    "create": {
                        "id": "drive.files.create",
                        "httpMethod": "POST",
                        "path": "files",
                        "description": "Creates a new file.",
                        "request": {"$ref": "File"},
                        "response": {"$ref": "File"}
                    },
                    "get": {
                        "id": "drive.files.get",
                        "httpMethod": "GET",
                        "path": "files/{fileId}",
                        "description": "Gets a file's metadata or content by ID.",
                        "parameters": {"fileId": file_id},
                        "parameterOrder": ["fileId"],
                        "response": {"$ref": "File"}
                    },
                    "list": {
                        "id": "drive.files.list",
                        "httpMethod": "GET",
                        "path": "files",
                        "description": "Lists the user's files.\nThis method accepts the q parameter, which is a search query.",
                        "parameters": {
                            "pageSize": {"type": "integer", "format": "int32", "location": "query"},
                            "spaces": {"type": "string", "location": "query", "repeated": true}
                        },
                        "response": {"$ref": "FileList"}
                    }
                },
                "resources": {
                    "comments": {
                        "methods": {
                            "list": {
                                "id": "drive.comments.list",
                                "httpMethod": "GET",
                                "path": "files/{fileId}/comments",
                                "description": "Lists a file's comments.",
                                "parameters": {
                                    "fileId": file_id,
                                    "fields": {
                                        "type": "string",
                                        "description": "Selector specifying which fields to include.",
                                        "required": true,
                                        "location": "query"
                                    }
                                },
                                "parameterOrder": ["fileId"]
                            }
                        }
                    }
                }
            }
        }
    })
}

/// [`make_test_rest_document_value`] wrapped as a [`RestDocument`].
///
/// # Panics
///
/// Never in practice; the fixture always has a `rootUrl`.
#[must_use]
pub fn make_test_rest_document(root_url: &str) -> RestDocument {
    RestDocument::new(make_test_rest_document_value(root_url)).expect("fixture is a valid document")
}

// =============================================================================
// Temp Directory Utilities
// =============================================================================

/// A temporary directory for tests with automatic cleanup.
///
/// ```rust,ignore
/// let dir = TestDir::new();
/// let creds = dir.create_file("creds.json", r#"{"client_id": "x"}"#);
/// ```
pub struct TestDir {
    inner: tempfile::TempDir,
}

impl TestDir {
    /// Create a new isolated temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Write a file (creating parent directories) and return its path.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.inner.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&path, content).expect("Failed to write test file");
        path
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Assert that a string contains a substring.
#[macro_export]
macro_rules! assert_contains {
    ($haystack:expr, $needle:expr) => {
        let haystack = $haystack;
        let needle = $needle;
        assert!(
            haystack.contains(needle),
            "Expected string to contain {:?}\n\nActual string:\n{:?}",
            needle,
            haystack
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_console_keeps_streams_apart() {
        let console = MemoryConsole::new();
        console.out("a");
        console.err("b");
        console.error("c");
        assert_eq!(console.stdout(), vec!["a"]);
        assert_eq!(console.stderr(), vec!["b"]);
        assert_eq!(console.diagnostics(), vec!["c"]);
    }

    #[test]
    fn stub_handlers_record_calls() {
        let handlers = StubHandlers::ok();
        let console = MemoryConsole::new();
        tokio_test::block_on(handlers.show(&ShowArgs::default(), &console)).unwrap();
        assert_eq!(handlers.calls(), vec!["show"]);
        assert_eq!(console.stdout(), vec!["show ran"]);
    }
}
