use fibre_resolver::{KeyFilter, Qualifier, QualifierId, ResolveError, Resolver, Scope, ScopeId};

// --- Test Fixtures ---

struct MockObj;
struct MockObjB;

enum ScopeA {}
impl Scope for ScopeA {}

enum ScopeB {}
impl Scope for ScopeB {}

enum QualifierA {}
impl Qualifier for QualifierA {}

enum QualifierB {}
impl Qualifier for QualifierB {}

fn is_missing<T>(result: fibre_resolver::Result<T>) -> bool {
  matches!(result, Err(ResolveError::MissingProvider(_)))
}

/// One registration for every scope/qualifier shape of `MockObj`, plus an
/// unqualified `MockObjB`.
fn populated() -> Resolver {
  let resolver = Resolver::new();
  resolver.register::<MockObj>().provide(|| MockObj);
  resolver.register::<MockObj>().scoped_to::<ScopeA>().provide(|| MockObj);
  resolver.register::<MockObj>().qualified_by::<QualifierA>().provide(|| MockObj);
  resolver.register::<MockObj>().scoped_to::<ScopeA>().qualified_by::<QualifierA>().provide(|| MockObj);
  resolver.register::<MockObjB>().provide(|| MockObjB);
  resolver
}

#[test]
fn test_clear_all_registrations() {
  let resolver = Resolver::new();
  assert!(is_missing(resolver.get::<MockObj>()));
  resolver.register::<MockObj>().provide(|| MockObj);
  assert!(resolver.get::<MockObj>().is_ok());

  assert_eq!(resolver.clear_all(), 1);
  assert!(is_missing(resolver.get::<MockObj>()));

  let resolver = populated();
  assert_eq!(resolver.clear_all(), 5);
  assert!(resolver.is_empty());
  assert!(is_missing(resolver.resolve_scoped_qualified::<MockObj, ScopeA, QualifierA>()));
  assert!(is_missing(resolver.get::<MockObjB>()));
}

#[test]
fn test_clear_all_for_type() {
  let resolver = populated();
  assert!(resolver.get::<MockObj>().is_ok());
  assert!(resolver.resolve_scoped::<MockObj, ScopeA>().is_ok());
  assert!(resolver.resolve_qualified::<MockObj, QualifierA>().is_ok());
  assert!(resolver.resolve_scoped_qualified::<MockObj, ScopeA, QualifierA>().is_ok());
  assert!(resolver.get::<MockObjB>().is_ok());

  assert_eq!(resolver.clear_all_for::<MockObj>(), 4);

  assert!(is_missing(resolver.get::<MockObj>()));
  assert!(is_missing(resolver.resolve_scoped::<MockObj, ScopeA>()));
  assert!(is_missing(resolver.resolve_qualified::<MockObj, QualifierA>()));
  assert!(is_missing(resolver.resolve_scoped_qualified::<MockObj, ScopeA, QualifierA>()));
  assert!(resolver.get::<MockObjB>().is_ok());

  assert_eq!(resolver.clear_all_for::<MockObjB>(), 1);
  assert!(is_missing(resolver.get::<MockObjB>()));
}

#[test]
fn test_clear_all_scoped_to() {
  let resolver = populated();
  resolver.register::<MockObjB>().scoped_to::<ScopeA>().provide(|| MockObjB);
  resolver.register::<MockObj>().scoped_to::<ScopeB>().provide(|| MockObj);

  assert_eq!(resolver.clear_all_scoped_to::<ScopeA>(), 3);

  assert!(is_missing(resolver.resolve_scoped::<MockObj, ScopeA>()));
  assert!(is_missing(resolver.resolve_scoped_qualified::<MockObj, ScopeA, QualifierA>()));
  assert!(is_missing(resolver.resolve_scoped::<MockObjB, ScopeA>()));
  assert!(resolver.resolve_scoped::<MockObj, ScopeB>().is_ok());
  assert!(resolver.get::<MockObj>().is_ok());
  assert!(resolver.resolve_qualified::<MockObj, QualifierA>().is_ok());
}

#[test]
fn test_clear_all_qualified_by() {
  let resolver = populated();
  resolver.register::<MockObj>().qualified_by::<QualifierB>().provide(|| MockObj);

  assert_eq!(resolver.clear_all_qualified_by::<QualifierA>(), 2);

  assert!(is_missing(resolver.resolve_qualified::<MockObj, QualifierA>()));
  assert!(is_missing(resolver.resolve_scoped_qualified::<MockObj, ScopeA, QualifierA>()));
  assert!(resolver.resolve_qualified::<MockObj, QualifierB>().is_ok());
  assert!(resolver.resolve_scoped::<MockObj, ScopeA>().is_ok());
  assert!(resolver.get::<MockObj>().is_ok());
}

#[test]
fn test_clear_all_scoped_qualified() {
  let resolver = populated();
  resolver.register::<MockObjB>().scoped_to::<ScopeA>().qualified_by::<QualifierA>().provide(|| MockObjB);

  assert_eq!(resolver.clear_all_scoped_qualified::<ScopeA, QualifierA>(), 2);

  assert!(is_missing(resolver.resolve_scoped_qualified::<MockObj, ScopeA, QualifierA>()));
  assert!(is_missing(resolver.resolve_scoped_qualified::<MockObjB, ScopeA, QualifierA>()));
  // Matching only one of the two facets is not enough.
  assert!(resolver.resolve_scoped::<MockObj, ScopeA>().is_ok());
  assert!(resolver.resolve_qualified::<MockObj, QualifierA>().is_ok());
  assert!(resolver.get::<MockObj>().is_ok());
}

#[test]
fn test_partial_clears_without_matches_are_noops() {
  let resolver = populated();
  assert_eq!(resolver.clear_all_scoped_to::<ScopeB>(), 0);
  assert_eq!(resolver.clear_all_qualified_by::<QualifierB>(), 0);
  assert_eq!(resolver.clear_all_scoped_qualified::<ScopeB, QualifierA>(), 0);
  assert_eq!(resolver.len(), 5);

  let empty = Resolver::new();
  assert_eq!(empty.clear_all(), 0);
  assert_eq!(empty.clear_all_for::<MockObj>(), 0);
  assert!(!empty.clear_registration::<MockObj>(None));
}

#[test]
fn test_clear_single_registration() {
  let resolver = populated();

  assert!(resolver.clear_registration::<MockObj>(None));
  assert!(is_missing(resolver.get::<MockObj>()));
  assert!(resolver.resolve_qualified::<MockObj, QualifierA>().is_ok());

  assert!(resolver.clear_registration::<MockObj>(Some(QualifierId::of::<QualifierA>())));
  assert!(is_missing(resolver.resolve_qualified::<MockObj, QualifierA>()));

  // Scoped entries are untouched by the unscoped removals.
  assert!(resolver.resolve_scoped::<MockObj, ScopeA>().is_ok());
  assert!(resolver.clear_scoped_registration::<MockObj>(ScopeId::of::<ScopeA>(), None));
  assert!(is_missing(resolver.resolve_scoped::<MockObj, ScopeA>()));
  assert!(resolver.resolve_scoped_qualified::<MockObj, ScopeA, QualifierA>().is_ok());

  assert!(resolver.clear_scoped_registration::<MockObj>(
    ScopeId::of::<ScopeA>(),
    Some(QualifierId::of::<QualifierA>())
  ));
  assert!(!resolver.clear_scoped_registration::<MockObj>(ScopeId::of::<ScopeA>(), None));
  assert_eq!(resolver.len(), 1);
}

#[test]
fn test_cleared_key_can_be_registered_again() {
  let resolver = Resolver::new();
  resolver.register::<MockObj>().provide(|| MockObj);
  resolver.clear_all();
  resolver.register::<MockObj>().provide(|| MockObj);
  assert!(resolver.get::<MockObj>().is_ok());
}

#[test]
fn test_clear_matching_with_a_custom_filter() {
  let resolver = populated();
  let filter = KeyFilter::new()
    .for_type::<MockObj>()
    .qualified_by(QualifierId::of::<QualifierA>());

  assert_eq!(resolver.clear_matching(filter), 2);
  assert_eq!(resolver.len(), 3);
  assert!(resolver.keys().iter().all(|key| !filter.matches(key)));
}

#[test]
fn test_removed_values_are_dropped_after_the_map_is_unlocked() {
  use std::sync::{mpsc, Arc, Weak};
  use std::thread;
  use std::time::Duration;

  // Reads the resolver from its destructor.
  struct Watcher {
    resolver: Weak<Resolver>,
    seen: mpsc::Sender<usize>,
  }
  impl Drop for Watcher {
    fn drop(&mut self) {
      if let Some(resolver) = self.resolver.upgrade() {
        let _ = self.seen.send(resolver.len());
      }
    }
  }

  let resolver = Arc::new(Resolver::new());
  let (tx, rx) = mpsc::channel();
  resolver.register::<Watcher>().qualified_by::<QualifierA>().instance(Watcher {
    resolver: Arc::downgrade(&resolver),
    seen: tx,
  });
  resolver.register::<MockObj>().provide(|| MockObj);

  let worker = Arc::clone(&resolver);
  thread::spawn(move || worker.clear_all_qualified_by::<QualifierA>());

  let remaining = rx.recv_timeout(Duration::from_secs(3)).expect("destructor did not run");
  assert_eq!(remaining, 1);
}
