use pretty_assertions::assert_eq;

use super::*;

#[test]
fn grows_for_deep_native_recursion() {
    fn nest(n: u64) -> u64 {
        ensure_sufficient_stack(|| if n == 0 { 0 } else { nest(n - 1) + 1 })
    }

    assert_eq!(nest(150_000), 150_000);
}

#[test]
fn passes_results_through() {
    let result: Result<u8, &str> = ensure_sufficient_stack(|| Err("boom"));
    assert_eq!(result, Err("boom"));
}

#[test]
fn call_depth_stops_at_limit() {
    let mut depth = CallDepth::new(2);
    assert_eq!(depth.enter(), Ok(()));
    assert_eq!(depth.enter(), Ok(()));
    assert_eq!(depth.enter(), Err(DepthExceeded { limit: 2 }));
    assert_eq!(depth.current(), 2);

    depth.exit();
    assert_eq!(depth.enter(), Ok(()));
}

#[test]
fn call_depth_exit_never_underflows() {
    let mut depth = CallDepth::default();
    depth.exit();
    assert_eq!(depth.current(), 0);
    assert_eq!(depth.limit(), DEFAULT_MAX_CALL_DEPTH);
}
