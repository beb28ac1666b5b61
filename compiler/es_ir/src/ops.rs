//! Operator enums shared by tokens and the syntax tree.

/// Binary operators, in no particular precedence order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Modulo,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    /// `&` and `&&`
    And,
    /// `|` and `||`
    Or,
    /// `??`
    Coalesce,
    In,
}

impl BinaryOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Power => "^",
            BinaryOp::Modulo => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
            BinaryOp::Coalesce => "??",
            BinaryOp::In => "in",
        }
    }

    /// Name of the method a class defines to overload this operator.
    pub fn overload_method(self) -> Option<&'static str> {
        match self {
            BinaryOp::Add => Some("__add__"),
            BinaryOp::Subtract => Some("__subtract__"),
            BinaryOp::Multiply => Some("__multiply__"),
            BinaryOp::Divide => Some("__divide__"),
            BinaryOp::Power => Some("__pow__"),
            BinaryOp::Modulo => Some("__mod__"),
            BinaryOp::Eq => Some("__eq__"),
            BinaryOp::Lt => Some("__lt__"),
            BinaryOp::Gt => Some("__gt__"),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-x`
    Negate,
    /// `+x`, absolute value
    Plus,
    /// `!x`
    Not,
}

impl UnaryOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
        }
    }
}

/// `=` and the compound assignments.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Set,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl AssignOp {
    /// The binary operator a compound assignment applies, `None` for plain `=`.
    pub fn binary(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Set => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Subtract => Some(BinaryOp::Subtract),
            AssignOp::Multiply => Some(BinaryOp::Multiply),
            AssignOp::Divide => Some(BinaryOp::Divide),
        }
    }

    pub fn as_symbol(self) -> &'static str {
        match self {
            AssignOp::Set => "=",
            AssignOp::Add => "+=",
            AssignOp::Subtract => "-=",
            AssignOp::Multiply => "*=",
            AssignOp::Divide => "/=",
        }
    }
}
