//! Accessors that hold a resolved value.
//!
//! - [`Inject`] resolves as soon as it is created.
//! - [`LazyInject`] resolves the first time its value is read.
//! - [`WeakInject`] resolves as soon as it is created but keeps only a weak
//!   reference, so it never extends the value's lifetime.
//!
//! The plain constructors resolve from [`global()`] and panic when resolution
//! fails. An accessor built as a struct field has no way to hand an error back to
//! whoever constructs the struct, so a missing registration is treated as a broken
//! precondition. Use the `try_*` constructors (or [`LazyInject::try_get`]) to
//! handle the failure instead.

use crate::error::Result;
use crate::global::global;
use crate::key::{QualifierId, ScopeId};
use crate::markers::{Qualifier, Scope};
use crate::resolver::Resolver;
use once_cell::sync::OnceCell;
use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Weak};

fn expect_resolved<T: ?Sized>(result: Result<Arc<T>>) -> Arc<T> {
  result.unwrap_or_else(|err| panic!("Failed to resolve required service: {}", err))
}

fn scope_of<S: Scope>() -> Option<ScopeId> {
  Some(ScopeId::of::<S>())
}

fn qualifier_of<Q: Qualifier>() -> Option<QualifierId> {
  Some(QualifierId::of::<Q>())
}

// --- Inject ---

/// A value resolved when the accessor is created.
pub struct Inject<T: ?Sized> {
  value: Arc<T>,
}

impl<T: ?Sized + Any + Send + Sync> Inject<T> {
  /// Resolves the unqualified, unscoped registration of `T`.
  ///
  /// # Panics
  ///
  /// Panics if nothing is registered or the registration produced the wrong type.
  pub fn new() -> Self {
    Self::resolve_with(None, None)
  }

  pub fn qualified<Q: Qualifier>() -> Self {
    Self::resolve_with(None, qualifier_of::<Q>())
  }

  pub fn scoped<S: Scope>() -> Self {
    Self::resolve_with(scope_of::<S>(), None)
  }

  pub fn scoped_qualified<S: Scope, Q: Qualifier>() -> Self {
    Self::resolve_with(scope_of::<S>(), qualifier_of::<Q>())
  }

  pub fn resolve_with(scope: Option<ScopeId>, qualifier: Option<QualifierId>) -> Self {
    Self {
      value: expect_resolved(global().resolve::<T>(scope, qualifier)),
    }
  }

  /// Non-panicking counterpart of [`Inject::new`].
  pub fn try_new() -> Result<Self> {
    Self::try_from_resolver(global(), None, None)
  }

  pub fn try_qualified<Q: Qualifier>() -> Result<Self> {
    Self::try_from_resolver(global(), None, qualifier_of::<Q>())
  }

  pub fn try_scoped<S: Scope>() -> Result<Self> {
    Self::try_from_resolver(global(), scope_of::<S>(), None)
  }

  pub fn try_scoped_qualified<S: Scope, Q: Qualifier>() -> Result<Self> {
    Self::try_from_resolver(global(), scope_of::<S>(), qualifier_of::<Q>())
  }

  pub fn try_from_resolver(
    resolver: &Resolver,
    scope: Option<ScopeId>,
    qualifier: Option<QualifierId>,
  ) -> Result<Self> {
    resolver
      .resolve::<T>(scope, qualifier)
      .map(|value| Self { value })
  }

  /// Calls `provider` immediately instead of going through a resolver.
  pub fn from_shared_provider(provider: impl FnOnce() -> Arc<T>) -> Self {
    Self { value: provider() }
  }

  pub fn shared(&self) -> Arc<T> {
    Arc::clone(&self.value)
  }

  pub fn into_inner(self) -> Arc<T> {
    self.value
  }
}

impl<T: Any + Send + Sync> Inject<T> {
  /// Calls `provider` immediately instead of going through a resolver.
  pub fn from_provider(provider: impl FnOnce() -> T) -> Self {
    Self {
      value: Arc::new(provider()),
    }
  }
}

impl<T: ?Sized> Deref for Inject<T> {
  type Target = T;

  fn deref(&self) -> &T {
    &self.value
  }
}

impl<T: ?Sized> Clone for Inject<T> {
  fn clone(&self) -> Self {
    Self {
      value: Arc::clone(&self.value),
    }
  }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Inject<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Inject").field(&&*self.value).finish()
  }
}

// --- LazyInject ---

type LazyProvider<T> = Box<dyn Fn() -> Result<Arc<T>> + Send + Sync>;

/// A value resolved the first time it is read.
///
/// After a successful read the value is cached and the provider is never called
/// again. A failed read caches nothing.
pub struct LazyInject<T: ?Sized> {
  cell: OnceCell<Arc<T>>,
  provider: LazyProvider<T>,
}

impl<T: ?Sized + Any + Send + Sync> LazyInject<T> {
  /// Defers resolving the unqualified, unscoped registration of `T`.
  pub fn new() -> Self {
    Self::resolve_with(None, None)
  }

  pub fn qualified<Q: Qualifier>() -> Self {
    Self::resolve_with(None, qualifier_of::<Q>())
  }

  pub fn scoped<S: Scope>() -> Self {
    Self::resolve_with(scope_of::<S>(), None)
  }

  pub fn scoped_qualified<S: Scope, Q: Qualifier>() -> Self {
    Self::resolve_with(scope_of::<S>(), qualifier_of::<Q>())
  }

  pub fn resolve_with(scope: Option<ScopeId>, qualifier: Option<QualifierId>) -> Self {
    Self {
      cell: OnceCell::new(),
      provider: Box::new(move || global().resolve::<T>(scope, qualifier)),
    }
  }

  /// Defers to `provider`, called at most once on first successful read.
  pub fn from_shared_provider<F>(provider: F) -> Self
  where
    F: Fn() -> Arc<T> + Send + Sync + 'static,
  {
    Self {
      cell: OnceCell::new(),
      provider: Box::new(move || Ok(provider())),
    }
  }

  /// Returns the value, resolving it first if needed.
  ///
  /// # Panics
  ///
  /// Panics if the deferred resolution fails.
  pub fn get(&self) -> &Arc<T> {
    self
      .cell
      .get_or_init(|| expect_resolved((self.provider)()))
  }

  /// Returns the value, resolving it first if needed. Errors are not cached, so a
  /// later call retries.
  pub fn try_get(&self) -> Result<&Arc<T>> {
    self.cell.get_or_try_init(|| (self.provider)())
  }

  pub fn is_resolved(&self) -> bool {
    self.cell.get().is_some()
  }
}

impl<T: Any + Send + Sync> LazyInject<T> {
  /// Defers to `provider`, called at most once on first successful read.
  pub fn from_provider<F>(provider: F) -> Self
  where
    F: Fn() -> T + Send + Sync + 'static,
  {
    Self::from_shared_provider(move || Arc::new(provider()))
  }
}

impl<T: ?Sized + Any + Send + Sync> Deref for LazyInject<T> {
  type Target = T;

  fn deref(&self) -> &T {
    self.get()
  }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for LazyInject<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.cell.get() {
      Some(value) => f.debug_tuple("LazyInject").field(&&**value).finish(),
      None => f.write_str("LazyInject(<unresolved>)"),
    }
  }
}

// --- WeakInject ---

/// A value resolved when the accessor is created, held through a weak reference.
///
/// Reading yields `None` once every other owner has released the value.
pub struct WeakInject<T: ?Sized> {
  value: Weak<T>,
}

impl<T: ?Sized + Any + Send + Sync> WeakInject<T> {
  pub fn new() -> Self {
    Self::resolve_with(None, None)
  }

  pub fn qualified<Q: Qualifier>() -> Self {
    Self::resolve_with(None, qualifier_of::<Q>())
  }

  pub fn scoped<S: Scope>() -> Self {
    Self::resolve_with(scope_of::<S>(), None)
  }

  pub fn scoped_qualified<S: Scope, Q: Qualifier>() -> Self {
    Self::resolve_with(scope_of::<S>(), qualifier_of::<Q>())
  }

  pub fn resolve_with(scope: Option<ScopeId>, qualifier: Option<QualifierId>) -> Self {
    Self::from_shared(&expect_resolved(global().resolve::<T>(scope, qualifier)))
  }

  /// Non-panicking counterpart of [`WeakInject::new`].
  pub fn try_new() -> Result<Self> {
    Self::try_from_resolver(global(), None, None)
  }

  pub fn try_qualified<Q: Qualifier>() -> Result<Self> {
    Self::try_from_resolver(global(), None, qualifier_of::<Q>())
  }

  pub fn try_scoped<S: Scope>() -> Result<Self> {
    Self::try_from_resolver(global(), scope_of::<S>(), None)
  }

  pub fn try_scoped_qualified<S: Scope, Q: Qualifier>() -> Result<Self> {
    Self::try_from_resolver(global(), scope_of::<S>(), qualifier_of::<Q>())
  }

  pub fn try_from_resolver(
    resolver: &Resolver,
    scope: Option<ScopeId>,
    qualifier: Option<QualifierId>,
  ) -> Result<Self> {
    resolver
      .resolve::<T>(scope, qualifier)
      .map(|value| Self::from_shared(&value))
  }

  /// Calls `provider` immediately and keeps a weak reference to its result.
  pub fn from_shared_provider(provider: impl FnOnce() -> Arc<T>) -> Self {
    Self::from_shared(&provider())
  }

  pub fn from_shared(value: &Arc<T>) -> Self {
    Self {
      value: Arc::downgrade(value),
    }
  }

  pub fn get(&self) -> Option<Arc<T>> {
    self.value.upgrade()
  }

  pub fn is_alive(&self) -> bool {
    self.value.strong_count() > 0
  }
}

impl<T: ?Sized> Clone for WeakInject<T> {
  fn clone(&self) -> Self {
    Self {
      value: Weak::clone(&self.value),
    }
  }
}

impl<T: ?Sized> fmt::Debug for WeakInject<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WeakInject")
      .field("alive", &(self.value.strong_count() > 0))
      .finish()
  }
}
