//! Error types with rich diagnostics using miette
//!
//! Decode errors carry the line, the version being decoded and the low-level
//! cause, so a caller can report exactly what went wrong in a saved file.

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use crate::Rule;

/// Boxed low-level cause of a decode error
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ============================================================================
// History Errors
// ============================================================================

/// Undo/redo requested with nothing to replay
#[derive(Error, Diagnostic, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    #[error("cannot undo operation: no more operations to undo")]
    #[diagnostic(code(planscape::history::nothing_to_undo))]
    NothingToUndo,

    #[error("cannot redo operation: no more operations to redo")]
    #[diagnostic(code(planscape::history::nothing_to_redo))]
    NothingToRedo,
}

// ============================================================================
// Decode Errors
// ============================================================================

/// Category of a decode failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// The input has no first line
    Empty,
    /// The first line is not `#VERSION=<n>`
    InvalidVersionLine,
    /// The version is negative or not a number
    InvalidVersionNumber,
    /// The version is newer than anything this build can read
    VersionTooHigh,
    InvalidPath,
    InvalidBuilding,
    InvalidTextBox,
    /// The line is not valid UTF-8
    InvalidEncoding,
    /// The class token is neither `TextBox` nor a known path or building
    UnknownClass,
}

impl DecodeErrorKind {
    pub fn message(self) -> &'static str {
        match self {
            DecodeErrorKind::Empty => "empty file",
            DecodeErrorKind::InvalidVersionLine => "invalid first line, expected '#VERSION=x'",
            DecodeErrorKind::InvalidVersionNumber => "invalid version, expected a positive integer",
            DecodeErrorKind::VersionTooHigh => "version is too high",
            DecodeErrorKind::InvalidPath => {
                "invalid path line expected '[class] [startX] [startY] [endX] [endY]'"
            }
            DecodeErrorKind::InvalidBuilding => {
                "invalid building line expected '[class] [posX] [posY] [rotation]'"
            }
            DecodeErrorKind::InvalidTextBox => {
                "invalid textbox line expected '[class] [posX] [posY] [width] [height] [content]'"
            }
            DecodeErrorKind::InvalidEncoding => "line is not valid UTF-8",
            DecodeErrorKind::UnknownClass => "unknown class",
        }
    }

    fn code(self) -> &'static str {
        match self {
            DecodeErrorKind::Empty => "empty",
            DecodeErrorKind::InvalidVersionLine => "invalid_version_line",
            DecodeErrorKind::InvalidVersionNumber => "invalid_version_number",
            DecodeErrorKind::VersionTooHigh => "version_too_high",
            DecodeErrorKind::InvalidPath => "invalid_path",
            DecodeErrorKind::InvalidBuilding => "invalid_building",
            DecodeErrorKind::InvalidTextBox => "invalid_textbox",
            DecodeErrorKind::InvalidEncoding => "invalid_encoding",
            DecodeErrorKind::UnknownClass => "unknown_class",
        }
    }

    fn help(self) -> Option<&'static str> {
        match self {
            DecodeErrorKind::VersionTooHigh => {
                Some("the file was written by a newer version, upgrade to open it")
            }
            DecodeErrorKind::UnknownClass => {
                Some("the class must be 'TextBox' or match a path or building definition exactly")
            }
            DecodeErrorKind::InvalidTextBox => {
                Some("the content must be a double-quoted string with C-style escapes")
            }
            _ => None,
        }
    }
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Failure to decode the scene text format
#[derive(Error, Debug)]
#[error("line {line}: {kind}")]
pub struct DecodeTextError {
    pub kind: DecodeErrorKind,
    /// 1-based line number
    pub line: usize,
    /// Version being decoded, when known
    pub version: Option<u64>,
    /// Low-level cause (number parsing, string unquoting, ...)
    #[source]
    pub source: Option<BoxError>,
}

impl DecodeTextError {
    pub fn new(kind: DecodeErrorKind, line: usize) -> Self {
        Self {
            kind,
            line,
            version: None,
            source: None,
        }
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Diagnostic for DecodeTextError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("planscape::decode::{}", self.kind.code())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.kind
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }
}

/// Failure to unquote text box content
#[derive(Error, Diagnostic, Debug)]
pub enum UnquoteError {
    #[error("invalid quoted string")]
    #[diagnostic(code(planscape::unquote::syntax))]
    Syntax(#[source] Box<pest::error::Error<Rule>>),

    #[error("escape sequence {0} does not encode a valid character")]
    #[diagnostic(
        code(planscape::unquote::invalid_escape),
        help("byte escapes must stay in the ASCII range, unicode escapes must not be surrogates")
    )]
    InvalidEscape(String),
}

// ============================================================================
// Load Errors
// ============================================================================

/// Failure to load a scene from text
#[derive(Error, Diagnostic, Debug)]
pub enum LoadError {
    /// The underlying reader failed
    #[error(transparent)]
    #[diagnostic(code(planscape::io))]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Decode(#[from] DecodeTextError),
}

impl LoadError {
    /// The decode error, if this is one
    pub fn as_decode(&self) -> Option<&DecodeTextError> {
        match self {
            LoadError::Decode(e) => Some(e),
            LoadError::Io(_) => None,
        }
    }
}
