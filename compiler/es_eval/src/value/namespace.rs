use crate::context::ContextRef;

use super::Info;

/// A named group of symbols: a `namespace` block, an imported file or a
/// host module.
///
/// The members are the bindings of the namespace's own scope, so functions
/// declared inside see writes made through the namespace.
pub struct Namespace {
    pub info: Info,
    pub(crate) mutable: bool,
    pub(crate) context: ContextRef,
}

impl Namespace {
    pub(crate) fn new(info: Info, mutable: bool, context: ContextRef) -> Self {
        Namespace {
            info,
            mutable,
            context,
        }
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }
}
