//! Stack safety for the tree-walking evaluator and the recursive-descent parser.
//!
//! Two separate concerns live here:
//!
//! - [`ensure_sufficient_stack`] grows the *native* stack on demand, so that deeply
//!   nested source (long operator chains, nested arrays) never aborts the host.
//! - [`CallDepth`] counts *script-level* calls, so that runaway recursion in a script
//!   fails with a catchable error instead of allocating stack segments forever.

/// If less than this much stack remains, grow before recursing.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, growing the native stack first when it is close to exhausted.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// WASM manages its own stack; call straight through.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Default ceiling on nested script calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// Returned by [`CallDepth::enter`] once the ceiling is reached.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DepthExceeded {
    pub limit: usize,
}

/// Counter of active script calls with a fixed ceiling.
#[derive(Clone, Debug)]
pub struct CallDepth {
    current: usize,
    limit: usize,
}

impl CallDepth {
    pub fn new(limit: usize) -> Self {
        CallDepth { current: 0, limit }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record entry into a call. Every successful `enter` must be paired with [`CallDepth::exit`].
    pub fn enter(&mut self) -> Result<(), DepthExceeded> {
        if self.current >= self.limit {
            return Err(DepthExceeded { limit: self.limit });
        }
        self.current += 1;
        Ok(())
    }

    pub fn exit(&mut self) {
        self.current = self.current.saturating_sub(1);
    }
}

impl Default for CallDepth {
    fn default() -> Self {
        CallDepth::new(DEFAULT_MAX_CALL_DEPTH)
    }
}

#[cfg(test)]
mod tests;
