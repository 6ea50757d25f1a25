//! Core, non-public data structures for the resolver.

use crate::key::{RegistrationKey, ScopeId};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Weak};

thread_local! {
  // Keys currently being produced on this thread, tagged with the address of the
  // resolver that owns the entry. Re-entering one of them means a provider depends
  // on itself, which would otherwise deadlock on the entry's cell or slot lock (or
  // recurse forever for transients). The same key in another resolver is not a cycle.
  static RESOLVING_STACK: RefCell<HashSet<(usize, RegistrationKey)>> = RefCell::new(HashSet::new());
}

/// An RAII guard that detects circular resolution.
///
/// Creating it pushes `(owner, key)` onto the thread-local resolution stack and
/// panics if the pair is already there. Dropping it pops the pair again. `owner`
/// is the address of the resolver being asked, which stays fixed while it is
/// borrowed for the resolve.
pub(crate) struct ResolutionGuard {
  owner: usize,
  key: RegistrationKey,
}

impl ResolutionGuard {
  pub(crate) fn new(owner: usize, key: RegistrationKey) -> Self {
    RESOLVING_STACK.with(|stack| {
      let mut stack = stack.borrow_mut();
      if !stack.insert((owner, key)) {
        panic!("Circular dependency detected while resolving service: {:?}", key);
      }
    });
    Self { owner, key }
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      stack.borrow_mut().remove(&(self.owner, self.key));
    });
  }
}

/// The lifecycle policy an entry was registered with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
  /// A new value on every resolve.
  Transient,
  /// Shared while some external owner keeps the last produced value alive.
  Scoped,
  /// Produced once and retained by the resolver.
  Singleton,
}

impl Lifecycle {
  /// Picks the policy for a new registration.
  ///
  /// Singleton-eligible types and the [`Global`](crate::Global) scope give
  /// `Singleton`; any other scope gives `Scoped`; no scope gives `Transient`.
  pub fn select(singleton_eligible: bool, scope: Option<ScopeId>) -> Self {
    match scope {
      _ if singleton_eligible => Lifecycle::Singleton,
      Some(scope) if scope.is_global() => Lifecycle::Singleton,
      Some(_) => Lifecycle::Scoped,
      None => Lifecycle::Transient,
    }
  }
}

impl fmt::Display for Lifecycle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Lifecycle::Transient => "transient",
      Lifecycle::Scoped => "scoped",
      Lifecycle::Singleton => "singleton",
    };
    f.write_str(name)
  }
}

/// A produced value with its concrete type erased. Always holds an `Arc<T>`.
pub(crate) type Erased = Box<dyn Any + Send + Sync>;

pub(crate) type ErasedFactory = Box<dyn Fn() -> Erased + Send + Sync>;

pub(crate) type ScopedFactory = Box<dyn Fn() -> (Erased, Box<dyn WeakSlot>) + Send + Sync>;

/// A non-owning handle to a produced value whose type has been erased.
pub(crate) trait WeakSlot: Send + Sync {
  /// Returns a fresh erased `Arc<T>` if the value is still owned elsewhere.
  fn upgrade(&self) -> Option<Erased>;
}

impl<T: ?Sized + Any + Send + Sync> WeakSlot for Weak<T> {
  fn upgrade(&self) -> Option<Erased> {
    Weak::upgrade(self).map(|strong| Box::new(strong) as Erased)
  }
}

/// Wraps a typed provider so that it produces erased values.
pub(crate) fn erase<T, F>(factory: F) -> ErasedFactory
where
  T: ?Sized + Any + Send + Sync,
  F: Fn() -> Arc<T> + Send + Sync + 'static,
{
  Box::new(move || Box::new(factory()) as Erased)
}

/// Wraps a typed provider so that it produces an erased value plus a weak handle to it.
pub(crate) fn erase_scoped<T, F>(factory: F) -> ScopedFactory
where
  T: ?Sized + Any + Send + Sync,
  F: Fn() -> Arc<T> + Send + Sync + 'static,
{
  Box::new(move || {
    let strong = factory();
    let weak: Box<dyn WeakSlot> = Box::new(Arc::downgrade(&strong));
    (Box::new(strong) as Erased, weak)
  })
}

pub(crate) enum Entry {
  Transient {
    factory: ErasedFactory,
  },
  Scoped {
    slot: Mutex<Option<Box<dyn WeakSlot>>>,
    factory: ScopedFactory,
  },
  Singleton {
    cell: OnceCell<Erased>,
    factory: ErasedFactory,
  },
}

impl Entry {
  pub(crate) fn new<T, F>(lifecycle: Lifecycle, factory: F) -> Self
  where
    T: ?Sized + Any + Send + Sync,
    F: Fn() -> Arc<T> + Send + Sync + 'static,
  {
    match lifecycle {
      Lifecycle::Transient => Entry::Transient {
        factory: erase(factory),
      },
      Lifecycle::Scoped => Entry::Scoped {
        slot: Mutex::new(None),
        factory: erase_scoped(factory),
      },
      Lifecycle::Singleton => Entry::Singleton {
        cell: OnceCell::new(),
        factory: erase(factory),
      },
    }
  }

  /// A singleton entry whose cache is already populated.
  pub(crate) fn with_instance<T: ?Sized + Any + Send + Sync>(instance: Arc<T>) -> Self {
    Entry::Singleton {
      cell: OnceCell::with_value(Box::new(instance) as Erased),
      factory: Box::new(|| panic!("Pre-initialized singleton factory should not be called")),
    }
  }

  pub(crate) fn lifecycle(&self) -> Lifecycle {
    match self {
      Entry::Transient { .. } => Lifecycle::Transient,
      Entry::Scoped { .. } => Lifecycle::Scoped,
      Entry::Singleton { .. } => Lifecycle::Singleton,
    }
  }

  /// Produces a value according to the entry's lifecycle and narrows it to `T`.
  ///
  /// Returns `None` if the produced value is not an `Arc<T>`. Scoped and singleton
  /// population is atomic with respect to other callers on the same entry: at most
  /// one of them runs the provider.
  pub(crate) fn produce<T: ?Sized + Any + Send + Sync>(&self, key: &RegistrationKey) -> Option<Arc<T>> {
    match self {
      Entry::Transient { factory } => {
        tracing::trace!(key = %key, "invoking transient provider");
        narrow(factory())
      }
      Entry::Scoped { slot, factory } => {
        let mut slot = slot.lock();
        if let Some(alive) = slot.as_ref().and_then(|weak| weak.upgrade()) {
          tracing::trace!(key = %key, "scoped value still alive");
          return narrow(alive);
        }
        tracing::trace!(key = %key, "invoking scoped provider");
        let (strong, weak) = factory();
        *slot = Some(weak);
        narrow(strong)
      }
      Entry::Singleton { cell, factory } => cell
        .get_or_init(|| {
          tracing::trace!(key = %key, "invoking singleton provider");
          factory()
        })
        .downcast_ref::<Arc<T>>()
        .cloned(),
    }
  }

  /// Whether a scoped or singleton entry currently holds a live value.
  ///
  /// Never blocks. A scoped entry whose provider is running reports `false`, as
  /// does a singleton still being initialised.
  pub(crate) fn is_populated(&self) -> bool {
    match self {
      Entry::Transient { .. } => false,
      Entry::Scoped { slot, .. } => slot
        .try_lock()
        .is_some_and(|slot| slot.as_ref().and_then(|weak| weak.upgrade()).is_some()),
      Entry::Singleton { cell, .. } => cell.get().is_some(),
    }
  }
}

fn narrow<T: ?Sized + Any + Send + Sync>(value: Erased) -> Option<Arc<T>> {
  value.downcast::<Arc<T>>().ok().map(|boxed| *boxed)
}
