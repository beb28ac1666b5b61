use std::fmt;

use es_ir::Position;

use crate::{ErrorCode, ErrorKind};

/// One call the error unwound through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TracebackFrame {
    pub position: Position,
    /// Reconstructed call expression, e.g. `area(3, 'x')`.
    pub line: String,
}

/// A script-visible error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EsError {
    pub kind: ErrorKind,
    pub details: String,
    pub position: Position,
    /// Innermost call first.
    pub traceback: Vec<TracebackFrame>,
}

impl EsError {
    pub fn new(kind: ErrorKind, details: impl Into<String>) -> Self {
        EsError {
            kind,
            details: details.into(),
            position: Position::UNKNOWN,
            traceback: Vec::new(),
        }
    }

    /// Attach `position` unless the error already carries one.
    #[must_use]
    pub fn with_position(mut self, position: &Position) -> Self {
        if self.position.is_unknown() {
            self.position = position.clone();
        }
        self
    }

    /// Attach `position`, replacing any existing one.
    #[must_use]
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn push_frame(&mut self, position: Position, line: String) {
        self.traceback.push(TracebackFrame { position, line });
    }

    pub fn name(&self) -> &str {
        self.kind.name()
    }

    pub fn code(&self) -> ErrorCode {
        self.kind.code()
    }

    #[cold]
    pub fn illegal_char(ch: char) -> Self {
        EsError::new(ErrorKind::IllegalChar, format!("'{ch}'"))
    }

    #[cold]
    pub fn invalid_syntax(details: impl Into<String>) -> Self {
        EsError::new(ErrorKind::InvalidSyntax, details)
    }

    #[cold]
    pub fn reference(name: &str) -> Self {
        EsError::new(ErrorKind::Reference, format!("{name} is not defined"))
    }

    #[cold]
    pub fn type_error(details: impl Into<String>) -> Self {
        EsError::new(ErrorKind::Type, details)
    }

    /// `Expected type 'number', got type 'String' on value 'abc'`
    #[cold]
    pub fn expected_type(expected: &str, got: &str, value: &str) -> Self {
        EsError::type_error(format!(
            "Expected type '{expected}', got type '{got}' on value '{value}'"
        ))
    }

    #[cold]
    pub fn import(path: &str, details: &str) -> Self {
        EsError::new(ErrorKind::Import, format!("Could not import {path}: {details}"))
    }

    #[cold]
    pub fn invalid_operation(details: impl Into<String>) -> Self {
        EsError::new(ErrorKind::InvalidOperation, details)
    }

    #[cold]
    pub fn user(name: impl Into<String>, details: impl Into<String>) -> Self {
        EsError::new(ErrorKind::User(name.into()), details)
    }

    #[cold]
    pub fn test_failed(details: impl Into<String>) -> Self {
        EsError::new(ErrorKind::TestFailed, details)
    }

    #[cold]
    pub fn limit_exceeded(details: impl Into<String>) -> Self {
        EsError::new(ErrorKind::LimitExceeded, details)
    }

    /// The error line without its traceback: `TypeError: details`.
    pub fn summary(&self) -> String {
        format!("{}: {}", self.name(), self.details)
    }
}

impl fmt::Display for EsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.traceback.is_empty() {
            writeln!(f, "Traceback (most recent call last):")?;
            for frame in self.traceback.iter().rev() {
                writeln!(f, "{}:\n    {}", frame.position, frame.line)?;
            }
        }
        write!(f, "{}: {} \n at {}", self.name(), self.details, self.position)
    }
}

impl std::error::Error for EsError {}
