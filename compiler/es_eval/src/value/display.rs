use std::fmt::{self, Write};

use es_stack::ensure_sufficient_stack;

use super::Value;

/// Render a number the way scripts expect: `3` not `3.0`, `Infinity`, `NaN`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned()
    } else if n == 0.0 {
        "0".to_owned()
    } else {
        n.to_string()
    }
}

struct Printer {
    /// Containers currently being printed, for cycle detection.
    open: Vec<usize>,
}

impl Printer {
    fn write(&mut self, out: &mut String, value: &Value, quoted: bool) -> fmt::Result {
        match value {
            Value::Undefined => out.push_str("undefined"),
            Value::Number(n) => out.push_str(&format_number(*n)),
            Value::Boolean(b) => write!(out, "{b}")?,
            Value::String(s) if quoted => write!(out, "'{s}'")?,
            Value::String(s) => out.push_str(s),
            Value::Array(items) => {
                if self.open.contains(&items.addr()) {
                    out.push_str("[...]");
                    return Ok(());
                }
                self.open.push(items.addr());
                out.push('[');
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    ensure_sufficient_stack(|| self.write(out, item, true))?;
                }
                out.push(']');
                self.open.pop();
            }
            Value::Object(obj) => {
                if self.open.contains(&obj.addr()) {
                    out.push_str("{...}");
                    return Ok(());
                }
                self.open.push(obj.addr());
                let obj = obj.borrow();
                if let Some(class) = &obj.class {
                    write!(out, "{} ", class.name())?;
                }
                out.push('{');
                for (i, (key, field)) in obj.fields.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write!(out, "{key}: ")?;
                    ensure_sufficient_stack(|| self.write(out, field, true))?;
                }
                out.push('}');
                self.open.pop();
            }
            Value::Function(f) => write!(out, "<Func {}>", f.name())?,
            Value::Type(t) => write!(out, "<Type {}>", t.name())?,
            Value::Namespace(ns) => write!(out, "<Namespace {}>", ns.name())?,
            Value::Error(e) => out.push_str(&e.summary()),
        }
        Ok(())
    }
}

fn render(value: &Value, quoted: bool) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = Printer { open: Vec::new() }.write(&mut out, value, quoted);
    out
}

impl Value {
    /// Source-like form: strings are quoted.
    pub fn repr(&self) -> String {
        render(self, true)
    }
}

/// The form `print` and string concatenation use.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self, false))
    }
}
