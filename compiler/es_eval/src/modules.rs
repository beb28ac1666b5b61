//! `import`: host-registered modules first, then script files.
//!
//! ```text
//! import("name")
//!   ├── native registry hit       → registered namespace
//!   └── file candidates           → <dir>/name.es, <dir>/name/mod.es
//!         ├── cache hit           → same namespace as the first import
//!         ├── already loading     → ImportError (circular import)
//!         └── lex, parse, run in a fresh module context → Namespace
//! ```
//!
//! `<dir>` is the importing module's directory, falling back to the
//! runtime's base directory and then the process working directory.

use std::cell::RefCell;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use es_diagnostic::{ErrorKind, EsError};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::context::{ContextId, ContextRef, Symbol};
use crate::interpreter::{EvalResult, Interpreter};
use crate::runtime::Runtime;
use crate::value::{Function, Info, Namespace, NativeFn, Value};

/// Extension tried for extensionless imports.
pub const SCRIPT_EXTENSION: &str = "es";

/// Imports resolved so far, plus the files currently being loaded.
#[derive(Default)]
pub(crate) struct ModuleRegistry {
    native: RefCell<FxHashMap<String, Value>>,
    files: RefCell<FxHashMap<PathBuf, Value>>,
    loading: RefCell<LoadingStack>,
}

#[derive(Default)]
struct LoadingStack {
    stack: Vec<PathBuf>,
    set: FxHashSet<PathBuf>,
}

impl ModuleRegistry {
    pub(crate) fn register(&self, name: &str, module: Value) {
        let old = self.native.borrow_mut().insert(name.to_owned(), module);
        drop(old);
    }

    fn native(&self, name: &str) -> Option<Value> {
        self.native.borrow().get(name).cloned()
    }

    fn cached(&self, path: &Path) -> Option<Value> {
        self.files.borrow().get(path).cloned()
    }

    fn cache(&self, path: PathBuf, module: Value) {
        let old = self.files.borrow_mut().insert(path, module);
        drop(old);
    }

    /// Mark `path` as loading, or describe the cycle it would close.
    fn start_loading(&self, path: &Path) -> Result<(), String> {
        let mut loading = self.loading.borrow_mut();
        if loading.set.contains(path) {
            let cycle: Vec<String> = loading
                .stack
                .iter()
                .map(PathBuf::as_path)
                .chain(std::iter::once(path))
                .map(|p| p.display().to_string())
                .collect();
            return Err(format!("circular import: {}", cycle.join(" -> ")));
        }
        loading.set.insert(path.to_path_buf());
        loading.stack.push(path.to_path_buf());
        Ok(())
    }

    fn finish_loading(&self) {
        let mut loading = self.loading.borrow_mut();
        if let Some(popped) = loading.stack.pop() {
            loading.set.remove(&popped);
        }
    }
}

/// Populates a host module passed to [`Runtime::register_module`].
pub struct ModuleBuilder<'rt> {
    runtime: &'rt Runtime,
    name: String,
    scope: ContextRef,
}

impl<'rt> ModuleBuilder<'rt> {
    pub(crate) fn new(runtime: &'rt Runtime, name: &str) -> Self {
        ModuleBuilder {
            runtime,
            name: name.to_owned(),
            scope: runtime.contexts().create_root(None),
        }
    }

    /// Bind a constant member.
    pub fn constant(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        let key = self.runtime.interner().intern(name);
        if let Err(e) = self
            .runtime
            .contexts()
            .declare(self.scope.id(), key, Symbol::constant(value.into()))
        {
            tracing::warn!(module = %self.name, error = %e, "skipped module member");
        }
        self
    }

    /// Bind a host function member.
    pub fn function(&mut self, name: &str, description: &str, f: NativeFn) -> &mut Self {
        self.constant(name, Value::function(Function::native(name, description, f)))
    }

    pub(crate) fn finish(self) -> Value {
        let info = Info::named(self.name.as_str()).with_description("native module");
        Value::Namespace(Rc::new(Namespace::new(info, false, self.scope)))
    }
}

impl Interpreter<'_> {
    /// Resolve and load `spec`, relative to the module `ctx` belongs to.
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    pub fn import(&mut self, spec: &str, ctx: ContextId) -> EvalResult {
        let rt = self.runtime();
        if let Some(module) = rt.modules().native(spec) {
            return Ok(module);
        }

        let dir = match self.contexts().path(ctx)? {
            Some(dir) => dir.to_path_buf(),
            None => rt.base_dir().map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        };
        let candidates = candidates(&dir, spec);
        let Some(found) = candidates.iter().find(|path| path.is_file()) else {
            let searched: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
            return Err(EsError::import(spec, &format!("not found, searched {}", searched.join(", "))).into());
        };
        let path = std::fs::canonicalize(found).unwrap_or_else(|_| normalize_path(found));

        if let Some(module) = rt.modules().cached(&path) {
            tracing::debug!(path = %path.display(), "import cache hit");
            return Ok(module);
        }
        if let Err(cycle) = rt.modules().start_loading(&path) {
            return Err(EsError::import(spec, &cycle).into());
        }
        let loaded = self.load_file(&path);
        rt.modules().finish_loading();

        let module = loaded.map_err(|e| match e.kind {
            ErrorKind::LimitExceeded => e,
            _ => EsError::import(spec, &e.summary()),
        })?;
        rt.modules().cache(path, module.clone());
        Ok(module)
    }

    /// Run the file at `path` in a fresh module context and wrap its scope.
    fn load_file(&mut self, path: &Path) -> Result<Value, EsError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| EsError::invalid_operation(format!("cannot read {}: {e}", path.display())))?;
        let file: Arc<str> = Arc::from(path.display().to_string());
        let tokens = es_lexer::generate(&source, Some(Arc::clone(&file)), self.interner())?;
        let program = es_parse::parse(&tokens, self.interner())?;

        let scope = self.runtime().module_context(path.parent(), false)?;
        self.run_program(&program, scope.id())?;

        let stem = path
            .file_stem()
            .map_or_else(|| file.to_string(), |stem| stem.to_string_lossy().into_owned());
        let info = Info::named(stem).with_file(Some(file));
        Ok(Value::Namespace(Rc::new(Namespace::new(info, false, scope))))
    }
}

/// Paths to try for `spec` from `dir`, in priority order.
fn candidates(dir: &Path, spec: &str) -> Vec<PathBuf> {
    let resolved = dir.join(spec);
    if resolved.extension().is_some() {
        return vec![resolved];
    }
    vec![
        resolved.with_extension(SCRIPT_EXTENSION),
        resolved.join("mod").with_extension(SCRIPT_EXTENSION),
    ]
}

/// Resolve `.` and `..` lexically.
fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::CurDir => {}
            other => result.push(other),
        }
    }
    result
}
