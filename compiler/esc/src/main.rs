//! `es`: run a script, evaluate a string, or start a REPL.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Once;

use es_eval::{RunOptions, RunOutcome, Runtime, TimingData, Value};

static TRACING_INIT: Once = Once::new();

/// Install a hierarchical subscriber on stderr when `ES_LOG` (or `RUST_LOG`)
/// is set, e.g. `ES_LOG=es_eval=debug`.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        let filter = EnvFilter::try_from_env("ES_LOG").or_else(|_| EnvFilter::try_from_default_env());
        if let Ok(filter) = filter {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .init();
        }
    });
}

#[derive(Default)]
struct Options {
    timing: bool,
    max_steps: Option<u64>,
    eval: Option<String>,
    file: Option<PathBuf>,
}

fn print_usage() {
    eprintln!("Usage: es [options] [file.es]");
    eprintln!("       es [options] -e <code>");
    eprintln!();
    eprintln!("With no file or -e, starts an interactive session.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -e <code>          Evaluate code and print the result");
    eprintln!("  --timing           Print lex/parse/interpret times after each run");
    eprintln!("  --max-steps <n>    Stop after evaluating n nodes");
    eprintln!("  -h, --help         Show this message");
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--timing" => options.timing = true,
            "--max-steps" => {
                let Some(raw) = args.get(i + 1) else {
                    return Err("--max-steps needs a value".to_owned());
                };
                let steps = raw
                    .parse()
                    .map_err(|_| format!("invalid step count '{raw}'"))?;
                options.max_steps = Some(steps);
                i += 1;
            }
            "-e" => {
                let Some(code) = args.get(i + 1) else {
                    return Err("-e needs code to evaluate".to_owned());
                };
                options.eval = Some(code.clone());
                i += 1;
            }
            flag if flag.starts_with('-') => return Err(format!("unknown option '{flag}'")),
            path => {
                if options.file.is_some() {
                    return Err(format!("unexpected argument '{path}'"));
                }
                options.file = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }
    if options.eval.is_some() && options.file.is_some() {
        return Err("pass either a file or -e, not both".to_owned());
    }
    Ok(options)
}

fn build_runtime(options: &Options, base_dir: Option<&Path>) -> Runtime {
    let mut builder = Runtime::builder();
    if let Some(steps) = options.max_steps {
        builder = builder.max_steps(steps);
    }
    if let Some(dir) = base_dir {
        builder = builder.base_dir(dir);
    }
    builder.build()
}

fn report_timing(timing: &TimingData) {
    eprintln!(
        "lex: {:?}, parse: {:?}, interpret: {:?}, total: {:?}, nodes: {}",
        timing.lex,
        timing.parse,
        timing.interpret,
        timing.total(),
        timing.nodes_evaluated
    );
}

/// Print the last statement's value unless it is `undefined`.
fn print_result(outcome: &RunOutcome) {
    let value = outcome.last_value();
    if !matches!(value, Value::Undefined) {
        println!("{}", value.repr());
    }
}

fn run_file(path: &Path, options: &Options) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read {}: {e}", path.display());
            return ExitCode::from(2);
        }
    };
    let dir = path.parent().map(Path::to_path_buf);
    let runtime = build_runtime(options, dir.as_deref());
    let outcome = runtime.run(
        &source,
        RunOptions {
            context: None,
            file_name: Some(path.display().to_string()),
            current_dir: dir,
        },
    );
    if options.timing {
        report_timing(&outcome.timing);
    }
    match outcome.error {
        Some(error) => {
            eprintln!("{error}");
            ExitCode::from(1)
        }
        None => ExitCode::SUCCESS,
    }
}

fn run_string(code: &str, options: &Options) -> ExitCode {
    let cwd = std::env::current_dir().ok();
    let runtime = build_runtime(options, cwd.as_deref());
    let outcome = runtime.run(
        code,
        RunOptions {
            file_name: Some("(eval)".to_owned()),
            ..RunOptions::default()
        },
    );
    if options.timing {
        report_timing(&outcome.timing);
    }
    match &outcome.error {
        Some(error) => {
            eprintln!("{error}");
            ExitCode::from(1)
        }
        None => {
            print_result(&outcome);
            ExitCode::SUCCESS
        }
    }
}

fn repl(options: &Options) -> ExitCode {
    let cwd = std::env::current_dir().ok();
    let runtime = build_runtime(options, cwd.as_deref());
    let context = match runtime.new_module_context(cwd.as_deref()) {
        Ok(context) => context,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(1);
        }
    };

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!(">>> ");
        // A closed stdout only loses the prompt.
        let _ = std::io::stdout().flush();
        let Some(Ok(line)) = lines.next() else {
            println!();
            break;
        };
        let line = line.trim();
        if line == "exit" {
            break;
        }
        if line.is_empty() {
            continue;
        }
        let outcome = runtime.run(
            line,
            RunOptions {
                context: Some(context.clone()),
                file_name: Some("(repl)".to_owned()),
                current_dir: None,
            },
        );
        if options.timing {
            report_timing(&outcome.timing);
        }
        match &outcome.error {
            Some(error) => eprintln!("{error}"),
            None => print_result(&outcome),
        }
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        print_usage();
        return ExitCode::SUCCESS;
    }
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {message}");
            print_usage();
            return ExitCode::from(2);
        }
    };

    if let Some(code) = &options.eval {
        return run_string(code, &options);
    }
    match &options.file {
        Some(path) => run_file(path, &options),
        None => repl(&options),
    }
}

#[cfg(test)]
mod tests;
