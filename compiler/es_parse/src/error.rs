//! Parse errors.

use es_diagnostic::EsError;
use es_ir::Position;

/// What was being parsed when an error occurred, for "while parsing X" messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorContext {
    Expression,
    Declaration,
    IfStatement,
    WhileLoop,
    ForLoop,
    TryCatch,
    Block,
    FunctionDef,
    Parameters,
    ClassDef,
    NamespaceDef,
    ArrayLiteral,
    ObjectLiteral,
    CallArguments,
}

impl ErrorContext {
    pub fn description(self) -> &'static str {
        match self {
            ErrorContext::Expression => "an expression",
            ErrorContext::Declaration => "a declaration",
            ErrorContext::IfStatement => "an if statement",
            ErrorContext::WhileLoop => "a while loop",
            ErrorContext::ForLoop => "a for loop",
            ErrorContext::TryCatch => "a try/catch statement",
            ErrorContext::Block => "a block",
            ErrorContext::FunctionDef => "a function definition",
            ErrorContext::Parameters => "a parameter list",
            ErrorContext::ClassDef => "a class definition",
            ErrorContext::NamespaceDef => "a namespace definition",
            ErrorContext::ArrayLiteral => "an array literal",
            ErrorContext::ObjectLiteral => "an object literal",
            ErrorContext::CallArguments => "call arguments",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: Position,
    /// Innermost construct being parsed, if known.
    pub context: Option<ErrorContext>,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        ParseError {
            message: message.into(),
            position,
            context: None,
        }
    }

    /// Record `context` unless a more specific one is already present.
    #[must_use]
    pub fn in_context(mut self, context: ErrorContext) -> Self {
        self.context.get_or_insert(context);
        self
    }

    pub fn into_diagnostic(self) -> EsError {
        let details = match self.context {
            Some(ctx) => format!("{} while parsing {}", self.message, ctx.description()),
            None => self.message,
        };
        EsError::invalid_syntax(details).at(self.position)
    }
}

impl From<ParseError> for EsError {
    fn from(err: ParseError) -> Self {
        err.into_diagnostic()
    }
}
