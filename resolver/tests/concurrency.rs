use fibre_resolver::{Global, Resolver, Scope, Singleton};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc, Barrier, Mutex,
};
use std::thread;
use std::time::Duration;

enum Request {}
impl Scope for Request {}

#[test]
fn test_singleton_factory_is_called_only_once_under_concurrency() {
  struct ConcurrentService;
  impl Singleton for ConcurrentService {}

  let resolver = Resolver::new();
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&calls);
  resolver.register::<ConcurrentService>().singleton().provide(move || {
    counter.fetch_add(1, Ordering::SeqCst);
    // Widen the window for a racing second initialization.
    thread::sleep(Duration::from_millis(50));
    ConcurrentService
  });

  let resolved = Mutex::new(Vec::new());
  thread::scope(|s| {
    for _ in 0..20 {
      s.spawn(|| {
        let service = resolver.get::<ConcurrentService>().unwrap();
        resolved.lock().unwrap().push(service);
      });
    }
  });

  assert_eq!(calls.load(Ordering::SeqCst), 1);
  let resolved = resolved.into_inner().unwrap();
  assert!(resolved.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[test]
fn test_global_scope_populates_once_under_concurrency() {
  struct Shared;

  let resolver = Resolver::new();
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&calls);
  resolver.register::<Shared>().scoped_to::<Global>().provide(move || {
    counter.fetch_add(1, Ordering::SeqCst);
    thread::sleep(Duration::from_millis(20));
    Shared
  });

  thread::scope(|s| {
    for _ in 0..16 {
      s.spawn(|| resolver.resolve_scoped::<Shared, Global>().unwrap());
    }
  });
  assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_scoped_factory_runs_once_while_a_value_is_held() {
  struct Session;

  let resolver = Resolver::new();
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&calls);
  resolver.register::<Session>().scoped_to::<Request>().provide(move || {
    counter.fetch_add(1, Ordering::SeqCst);
    thread::sleep(Duration::from_millis(20));
    Session
  });

  // Every thread keeps its value until all threads have resolved.
  let barrier = Barrier::new(12);
  let resolved = Mutex::new(Vec::new());
  thread::scope(|s| {
    for _ in 0..12 {
      s.spawn(|| {
        let session = resolver.resolve_scoped::<Session, Request>().unwrap();
        barrier.wait();
        resolved.lock().unwrap().push(session);
      });
    }
  });

  assert_eq!(calls.load(Ordering::SeqCst), 1);
  let resolved = resolved.into_inner().unwrap();
  assert!(resolved.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));

  drop(resolved);
  let _fresh = resolver.resolve_scoped::<Session, Request>().unwrap();
  assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_concurrent_registration_and_resolution() {
  struct Counter(usize);

  let resolver = Resolver::new();
  resolver.register::<Counter>().provide(|| Counter(0));

  thread::scope(|s| {
    for i in 1..=8 {
      let resolver = &resolver;
      s.spawn(move || {
        for _ in 0..100 {
          resolver.register::<Counter>().provide(move || Counter(i));
          // Some registration is always present, whichever thread won.
          assert!(resolver.get::<Counter>().unwrap().0 <= 8);
        }
      });
    }
    s.spawn(|| {
      for _ in 0..100 {
        resolver.clear_all_for::<u64>();
      }
    });
  });

  assert_eq!(resolver.len(), 1);
}

#[test]
fn test_provider_can_register_while_resolving() {
  struct Outer;
  struct Inner;

  let resolver = Arc::new(Resolver::new());
  let inner = Arc::clone(&resolver);
  resolver.register::<Outer>().scoped_to::<Global>().provide(move || {
    inner.register::<Inner>().provide(|| Inner);
    Outer
  });

  assert!(resolver.get::<Inner>().is_err());
  resolver.resolve_scoped::<Outer, Global>().unwrap();
  assert!(resolver.get::<Inner>().is_ok());
}

#[test]
#[should_panic(expected = "Circular dependency detected")]
fn test_circular_dependency_panics() {
  struct ServiceA {
    _b: Arc<ServiceB>,
  }
  struct ServiceB {
    _a: Arc<ServiceA>,
  }

  let resolver = Arc::new(Resolver::new());
  let for_a = Arc::clone(&resolver);
  resolver.register::<ServiceA>().scoped_to::<Global>().provide(move || ServiceA {
    _b: for_a.resolve_scoped::<ServiceB, Global>().unwrap(),
  });
  let for_b = Arc::clone(&resolver);
  resolver.register::<ServiceB>().scoped_to::<Global>().provide(move || ServiceB {
    _a: for_b.resolve_scoped::<ServiceA, Global>().unwrap(),
  });

  let _ = resolver.resolve_scoped::<ServiceA, Global>();
}

#[test]
#[should_panic(expected = "Circular dependency detected")]
fn test_self_dependent_transient_panics() {
  struct Recursive;

  let resolver = Arc::new(Resolver::new());
  let inner = Arc::clone(&resolver);
  resolver.register::<Recursive>().provide(move || {
    let _ = inner.get::<Recursive>();
    Recursive
  });

  let _ = resolver.get::<Recursive>();
}

#[test]
fn test_child_resolver_can_delegate_the_same_key_to_its_parent() {
  let parent = Arc::new(Resolver::new());
  parent.register::<String>().provide(|| "parent".to_string());

  let child = Resolver::new();
  let upstream = Arc::clone(&parent);
  child
    .register::<String>()
    .provide(move || format!("{}-child", upstream.get::<String>().unwrap()));

  assert_eq!(*child.get::<String>().unwrap(), "parent-child");
  assert_eq!(*parent.get::<String>().unwrap(), "parent");
}

#[test]
fn test_scoped_provider_can_query_its_own_cache_state() {
  let resolver = Arc::new(Resolver::new());
  let inner = Arc::clone(&resolver);
  resolver.register::<u8>().scoped_to::<Request>().provide(move || {
    // The entry is being produced, so it is not cached yet.
    assert!(!inner.is_cached::<u8>(Some(fibre_resolver::ScopeId::of::<Request>()), None));
    7
  });

  let (tx, rx) = std::sync::mpsc::channel();
  let worker = Arc::clone(&resolver);
  thread::spawn(move || {
    let value = worker.resolve_scoped::<u8, Request>().map(|value| *value);
    let _ = tx.send(value);
  });

  let value = rx.recv_timeout(Duration::from_secs(3)).expect("resolve did not complete");
  assert_eq!(value.unwrap(), 7);
}
