//! Parse context flags for context-sensitive rules.

/// Which enclosing constructs the parser is inside.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseContext(u8);

impl ParseContext {
    pub const NONE: Self = Self(0);

    /// Inside a loop body: `break` and `continue` are valid.
    pub const IN_LOOP: Self = Self(1 << 0);

    /// Inside a function or method body: `return` and `yield` are valid.
    pub const IN_FUNCTION: Self = Self(1 << 1);

    #[inline]
    pub const fn has(self, flag: Self) -> bool {
        (self.0 & flag.0) != 0
    }

    #[inline]
    #[must_use]
    pub const fn with(self, flag: Self) -> Self {
        Self(self.0 | flag.0)
    }

    #[inline]
    #[must_use]
    pub const fn without(self, flag: Self) -> Self {
        Self(self.0 & !flag.0)
    }

    pub const fn in_loop(self) -> bool {
        self.has(Self::IN_LOOP)
    }

    pub const fn in_function(self) -> bool {
        self.has(Self::IN_FUNCTION)
    }
}
