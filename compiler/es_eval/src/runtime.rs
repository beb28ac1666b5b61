//! The embedding API: build a [`Runtime`], then [`Runtime::run`] source text.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use es_diagnostic::EsError;
use es_ir::{SharedInterner, StringInterner};
use es_stack::DEFAULT_MAX_CALL_DEPTH;
use rustc_hash::FxHashMap;

use crate::builtins;
use crate::context::{ContextError, ContextRef, ContextStore, Symbol};
use crate::interpreter::{Interpreter, Names};
use crate::io::{InputHandler, SharedInputHandler, SharedPrintHandler};
use crate::modules::{ModuleBuilder, ModuleRegistry};
use crate::value::{BuiltinTypes, Function, Primitive, Value};

/// Resource limits for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Limits {
    pub max_call_depth: usize,
    /// Maximum number of evaluated nodes.
    pub max_steps: Option<u64>,
    /// Wall-clock budget, measured from the start of evaluation.
    pub timeout: Option<Duration>,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_steps: None,
            timeout: None,
        }
    }
}

/// Per-run options.
#[derive(Default)]
pub struct RunOptions {
    /// Context to run in. A fresh module context is used when absent.
    pub context: Option<ContextRef>,
    /// File name recorded in positions.
    pub file_name: Option<String>,
    /// Directory imports resolve against.
    pub current_dir: Option<PathBuf>,
}

/// Time spent in each phase of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimingData {
    pub lex: Duration,
    pub parse: Duration,
    pub interpret: Duration,
    pub nodes_evaluated: u64,
}

impl TimingData {
    pub fn total(&self) -> Duration {
        self.lex + self.parse + self.interpret
    }
}

/// What a run produced.
pub struct RunOutcome {
    /// Array of each top-level statement's value, deep-copied; `undefined`
    /// when the run failed.
    pub value: Value,
    pub error: Option<EsError>,
    pub timing: TimingData,
}

impl RunOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Value of the last top-level statement.
    pub fn last_value(&self) -> Value {
        match &self.value {
            Value::Array(items) => items.borrow().last().cloned().unwrap_or_default(),
            _ => Value::Undefined,
        }
    }

    /// Top-level statement values.
    pub fn values(&self) -> Vec<Value> {
        match &self.value {
            Value::Array(items) => items.borrow().clone(),
            _ => Vec::new(),
        }
    }
}

/// Builder for [`Runtime`].
#[derive(Default)]
pub struct RuntimeBuilder {
    interner: Option<SharedInterner>,
    print: Option<SharedPrintHandler>,
    input: Option<SharedInputHandler>,
    limits: Limits,
    base_dir: Option<PathBuf>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn interner(mut self, interner: SharedInterner) -> Self {
        self.interner = Some(interner);
        self
    }

    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print = Some(handler);
        self
    }

    #[must_use]
    pub fn input_handler(mut self, handler: SharedInputHandler) -> Self {
        self.input = Some(handler);
        self
    }

    #[must_use]
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.limits.max_call_depth = depth;
        self
    }

    #[must_use]
    pub fn max_steps(mut self, steps: u64) -> Self {
        self.limits.max_steps = Some(steps);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.limits.timeout = Some(timeout);
        self
    }

    /// Directory imports resolve against when a run gives none.
    #[must_use]
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Build the runtime and install the builtins into its root context.
    pub fn build(self) -> Runtime {
        let interner = self.interner.unwrap_or_default();
        let contexts = ContextStore::new(interner.clone());
        let root = contexts.create_root(None);
        let runtime = Runtime {
            names: Names::new(&interner),
            types: BuiltinTypes::new(),
            print: self.print.unwrap_or_else(crate::io::stdout_handler),
            input: self.input.unwrap_or_else(|| Arc::new(InputHandler::Stdin)),
            limits: self.limits,
            base_dir: self.base_dir,
            methods: builtins::methods(),
            modules: ModuleRegistry::default(),
            root,
            contexts,
            interner,
        };
        match builtins::install(&runtime) {
            Ok(()) => {
                if let Err(e) = runtime.contexts.mark_initialised(runtime.root.id()) {
                    tracing::error!(error = %e, "failed to mark the root scope initialised");
                }
            }
            Err(e) => tracing::error!(error = %e, "failed to install builtins"),
        }
        runtime
    }
}

/// An interpreter instance: the root scope with the builtins, the handlers,
/// the module registry and the limits every run shares.
pub struct Runtime {
    names: Names,
    types: BuiltinTypes,
    print: SharedPrintHandler,
    input: SharedInputHandler,
    limits: Limits,
    base_dir: Option<PathBuf>,
    methods: FxHashMap<(Primitive, &'static str), Rc<Function>>,
    modules: ModuleRegistry,
    root: ContextRef,
    // Dropped after every handle above.
    contexts: ContextStore,
    interner: SharedInterner,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn new() -> Self {
        RuntimeBuilder::new().build()
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    pub fn shared_interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn contexts(&self) -> &ContextStore {
        &self.contexts
    }

    pub fn types(&self) -> &BuiltinTypes {
        &self.types
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print
    }

    pub fn input_handler(&self) -> &SharedInputHandler {
        &self.input
    }

    /// Everything printed so far, when printing into a buffer.
    pub fn output(&self) -> String {
        self.print.output()
    }

    pub fn root(&self) -> &ContextRef {
        &self.root
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    pub(crate) fn names(&self) -> Names {
        self.names
    }

    pub(crate) fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    pub(crate) fn builtin_method(&self, primitive: Primitive, key: &str) -> Option<Rc<Function>> {
        self.methods.get(&(primitive, key)).cloned()
    }

    /// A module context under the root, for running the host's main file or
    /// a REPL session.
    pub fn new_module_context(&self, dir: Option<&Path>) -> Result<ContextRef, ContextError> {
        self.module_context(dir, true)
    }

    pub(crate) fn module_context(
        &self,
        dir: Option<&Path>,
        main: bool,
    ) -> Result<ContextRef, ContextError> {
        let dir: Option<Rc<Path>> = dir.or(self.base_dir()).map(Rc::from);
        let shown = dir
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default();
        let module = self.contexts.create(Some(self.root.id()), dir)?;
        self.contexts
            .declare(module.id(), self.names.main, Symbol::constant(Value::Boolean(main)))?;
        self.contexts
            .declare(module.id(), self.names.path, Symbol::constant(Value::string(shown)))?;
        Ok(module)
    }

    /// Register a host module that `import(name)` returns before looking for
    /// files.
    pub fn register_module(&self, name: &str, build: impl FnOnce(&mut ModuleBuilder<'_>)) {
        let mut builder = ModuleBuilder::new(self, name);
        build(&mut builder);
        self.modules.register(name, builder.finish());
    }

    /// Lex, parse and evaluate `source`.
    #[tracing::instrument(level = "debug", skip(self, source, options), fields(file = options.file_name.as_deref()))]
    pub fn run(&self, source: &str, options: RunOptions) -> RunOutcome {
        let mut timing = TimingData::default();
        let result = self.run_inner(source, options, &mut timing);
        tracing::debug!(
            lex = ?timing.lex,
            parse = ?timing.parse,
            interpret = ?timing.interpret,
            nodes = timing.nodes_evaluated,
            ok = result.is_ok(),
            "run finished"
        );
        let outcome = match result {
            Ok(values) => RunOutcome {
                value: Value::array(values.iter().map(Value::deep_copy).collect()),
                error: None,
                timing,
            },
            Err(error) => RunOutcome {
                value: Value::Undefined,
                error: Some(error),
                timing,
            },
        };
        self.contexts.collect_cycles();
        outcome
    }

    fn run_inner(
        &self,
        source: &str,
        options: RunOptions,
        timing: &mut TimingData,
    ) -> Result<Vec<Value>, EsError> {
        let context = match options.context {
            Some(context) => context,
            None => self.module_context(options.current_dir.as_deref(), true)?,
        };
        if !self.contexts.is_initialised(context.id())? {
            return Err(EsError::invalid_operation(
                "Cannot run in a context whose root has no builtins installed",
            ));
        }
        let file: Option<Arc<str>> = options.file_name.map(Arc::from);

        let start = Instant::now();
        let tokens = es_lexer::generate(source, file, &self.interner);
        timing.lex = start.elapsed();
        let tokens = tokens?;

        let start = Instant::now();
        let program = es_parse::parse(&tokens, &self.interner);
        timing.parse = start.elapsed();
        let program = program?;

        let start = Instant::now();
        let mut interpreter = Interpreter::new(self);
        let values = interpreter.run_program(&program, context.id());
        timing.interpret = start.elapsed();
        timing.nodes_evaluated = interpreter.steps();
        values
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
