use std::fmt;

/// Stable code per error kind.
///
/// Format: E#### where the first digit is the phase:
/// - E0xxx: lexer
/// - E1xxx: parser
/// - E2xxx: names and types
/// - E6xxx: runtime
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Illegal character
    E0001,
    /// Malformed syntax
    E1001,
    /// Unknown identifier
    E2001,
    /// Incompatible type
    E2002,
    /// Module or file could not be imported
    E6001,
    /// Operator unsupported by the operand
    E6002,
    /// Raised by script code
    E6003,
    /// Assertion failed
    E6004,
    /// Host limit exceeded
    E6005,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            ErrorCode::E6004 => "E6004",
            ErrorCode::E6005 => "E6005",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    IllegalChar,
    InvalidSyntax,
    Reference,
    Type,
    Import,
    InvalidOperation,
    /// Raised from script code with a script-chosen name.
    User(String),
    TestFailed,
    /// Call depth, step budget or deadline exhausted.
    LimitExceeded,
}

impl ErrorKind {
    /// The name the error renders with, and the `name` property script code sees.
    pub fn name(&self) -> &str {
        match self {
            ErrorKind::IllegalChar => "IllegalCharError",
            ErrorKind::InvalidSyntax => "InvalidSyntaxError",
            ErrorKind::Reference => "ReferenceError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Import => "ImportError",
            ErrorKind::InvalidOperation => "InvalidOperationError",
            ErrorKind::User(name) => name,
            ErrorKind::TestFailed => "TestFailed",
            ErrorKind::LimitExceeded => "LimitExceeded",
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ErrorKind::IllegalChar => ErrorCode::E0001,
            ErrorKind::InvalidSyntax => ErrorCode::E1001,
            ErrorKind::Reference => ErrorCode::E2001,
            ErrorKind::Type => ErrorCode::E2002,
            ErrorKind::Import => ErrorCode::E6001,
            ErrorKind::InvalidOperation => ErrorCode::E6002,
            ErrorKind::User(_) => ErrorCode::E6003,
            ErrorKind::TestFailed => ErrorCode::E6004,
            ErrorKind::LimitExceeded => ErrorCode::E6005,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
