//! Tests for `resolve!` and `try_resolve!` against the global resolver.

use fibre_resolver::{global, resolve, try_resolve, Global, Qualifier, ResolveError, Scope};
use serial_test::serial;
use std::sync::Arc;

// --- Test Fixtures ---

struct MacroTestService {
  value: i32,
}

trait MacroTestTrait: Send + Sync {
  fn value(&self) -> i32;
}
impl MacroTestTrait for MacroTestService {
  fn value(&self) -> i32 {
    self.value
  }
}

enum Primary {}
impl Qualifier for Primary {}

enum Request {}
impl Scope for Request {}

fn reset() {
  global().clear_all();
}

#[test]
#[serial]
fn test_resolve_concrete_forms() {
  reset();
  global().register::<MacroTestService>().provide(|| MacroTestService { value: 1 });
  global()
    .register::<MacroTestService>()
    .qualified_by::<Primary>()
    .provide(|| MacroTestService { value: 2 });
  global()
    .register::<MacroTestService>()
    .scoped_to::<Request>()
    .provide(|| MacroTestService { value: 3 });
  global()
    .register::<MacroTestService>()
    .scoped_to::<Request>()
    .qualified_by::<Primary>()
    .provide(|| MacroTestService { value: 4 });

  assert_eq!(resolve!(MacroTestService).value, 1);
  assert_eq!(resolve!(MacroTestService, qualifier = Primary).value, 2);
  assert_eq!(resolve!(MacroTestService, scope = Request).value, 3);
  assert_eq!(resolve!(MacroTestService, scope = Request, qualifier = Primary).value, 4);
}

#[test]
#[serial]
fn test_resolve_trait_forms() {
  reset();
  global()
    .register::<dyn MacroTestTrait>()
    .provide_shared(|| Arc::new(MacroTestService { value: 10 }));
  global()
    .register::<dyn MacroTestTrait>()
    .qualified_by::<Primary>()
    .provide_shared(|| Arc::new(MacroTestService { value: 20 }));
  global()
    .register::<dyn MacroTestTrait>()
    .scoped_to::<Global>()
    .provide_shared(|| Arc::new(MacroTestService { value: 30 }));

  assert_eq!(resolve!(trait MacroTestTrait).value(), 10);
  assert_eq!(resolve!(trait MacroTestTrait, qualifier = Primary).value(), 20);

  let a = resolve!(trait MacroTestTrait, scope = Global);
  let b = resolve!(trait MacroTestTrait, scope = Global);
  assert_eq!(a.value(), 30);
  assert!(Arc::ptr_eq(&a, &b));
}

#[test]
#[serial]
fn test_try_resolve_returns_results() {
  reset();
  assert!(matches!(
    try_resolve!(MacroTestService),
    Err(ResolveError::MissingProvider(_))
  ));
  assert!(try_resolve!(trait MacroTestTrait, scope = Request, qualifier = Primary).is_err());

  global().register::<MacroTestService>().provide(|| MacroTestService { value: 5 });
  let service: Arc<MacroTestService> = try_resolve!(MacroTestService).unwrap();
  assert_eq!(service.value, 5);
}

#[test]
#[serial]
#[should_panic(expected = "Failed to resolve required service: Missing provider for")]
fn test_resolve_panics_on_missing_concrete_service() {
  reset();
  resolve!(MacroTestService);
}

#[test]
#[serial]
#[should_panic(expected = "Failed to resolve required service")]
fn test_resolve_panics_on_missing_trait_service() {
  reset();
  resolve!(trait MacroTestTrait, qualifier = Primary);
}
