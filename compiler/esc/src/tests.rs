use pretty_assertions::assert_eq;

use super::*;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_owned()).collect()
}

#[test]
fn parses_file_and_flags() {
    let options = parse_args(&args(&["--timing", "script.es", "--max-steps", "500"]));
    let Ok(options) = options else {
        panic!("valid arguments were rejected");
    };
    assert!(options.timing);
    assert_eq!(options.max_steps, Some(500));
    assert_eq!(options.file, Some(PathBuf::from("script.es")));
    assert_eq!(options.eval, None);
}

#[test]
fn parses_eval() {
    let Ok(options) = parse_args(&args(&["-e", "1 + 2"])) else {
        panic!("valid arguments were rejected");
    };
    assert_eq!(options.eval.as_deref(), Some("1 + 2"));
    assert_eq!(options.file, None);
}

#[test]
fn no_arguments_means_repl() {
    let Ok(options) = parse_args(&[]) else {
        panic!("empty arguments were rejected");
    };
    assert!(options.eval.is_none() && options.file.is_none());
}

#[test]
fn rejects_bad_usage() {
    for bad in [
        &["--max-steps"][..],
        &["--max-steps", "many"],
        &["-e"],
        &["--verbose"],
        &["a.es", "b.es"],
        &["a.es", "-e", "1"],
    ] {
        assert!(parse_args(&args(bad)).is_err(), "accepted {bad:?}");
    }
}
