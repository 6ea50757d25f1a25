//! The thread-safe `Resolver` and its registration builder.

use crate::core::{Entry, Lifecycle, ResolutionGuard};
use crate::error::{ResolveError, Result};
use crate::key::{KeyFilter, QualifierId, RegistrationKey, ScopeId};
use crate::markers::{Qualifier, Scope, Singleton};
use dashmap::DashMap;
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A registry of providers keyed by type, scope and qualifier.
///
/// It is thread-safe: any thread may register, resolve or clear at any time.
/// Providers are always invoked outside of the map's locks, so a provider may
/// resolve (or even register) other keys.
#[derive(Default)]
pub struct Resolver {
  entries: DashMap<RegistrationKey, Arc<Entry>>,
}

impl Resolver {
  /// Creates a new, empty `Resolver`.
  pub fn new() -> Self {
    Self::default()
  }

  // --- PRIVATE HELPERS ---

  fn insert(&self, key: RegistrationKey, entry: Entry) {
    let lifecycle = entry.lifecycle();
    let replaced = self.entries.insert(key, Arc::new(entry));
    tracing::debug!(key = %key, %lifecycle, replaced = replaced.is_some(), "registered provider");
    // Dropped here, after the shard lock is released, in case the old value's
    // destructor touches the resolver.
    drop(replaced);
  }

  fn lookup(&self, key: &RegistrationKey) -> Option<Arc<Entry>> {
    self.entries.get(key).map(|entry| Arc::clone(entry.value()))
  }

  // --- Registration ---

  /// Starts a registration for `T`.
  ///
  /// Nothing is stored until one of the provider steps is called. Registering a
  /// key that already has an entry replaces it, discarding any cached value.
  ///
  /// ```
  /// use fibre_resolver::{Qualifier, Resolver};
  ///
  /// enum Backup {}
  /// impl Qualifier for Backup {}
  ///
  /// let resolver = Resolver::new();
  /// resolver.register::<String>().provide(|| "primary".to_string());
  /// resolver.register::<String>().qualified_by::<Backup>().provide(|| "backup".to_string());
  ///
  /// assert_eq!(*resolver.get::<String>().unwrap(), "primary");
  /// assert_eq!(*resolver.resolve_qualified::<String, Backup>().unwrap(), "backup");
  /// ```
  pub fn register<T: ?Sized + Any + Send + Sync>(&self) -> Registration<'_, T> {
    Registration {
      resolver: self,
      scope: None,
      qualifier: None,
      singleton: false,
      _marker: PhantomData,
    }
  }

  // --- Resolution ---

  /// Resolves `T` under the given scope and qualifier.
  ///
  /// # Panics
  ///
  /// Panics if the provider for this key, directly or indirectly, resolves the
  /// same key again on the same thread.
  pub fn resolve<T: ?Sized + Any + Send + Sync>(
    &self,
    scope: Option<ScopeId>,
    qualifier: Option<QualifierId>,
  ) -> Result<Arc<T>> {
    let key = RegistrationKey::new::<T>(scope, qualifier);
    let Some(entry) = self.lookup(&key) else {
      tracing::debug!(key = %key, "no provider registered");
      return Err(ResolveError::MissingProvider(key));
    };

    let _guard = ResolutionGuard::new(self as *const Self as usize, key);
    entry.produce::<T>(&key).ok_or_else(|| {
      tracing::error!(key = %key, "provider produced a value of an incorrect type");
      ResolveError::IncorrectType(key)
    })
  }

  /// Resolves the unscoped, unqualified registration of `T`.
  pub fn get<T: ?Sized + Any + Send + Sync>(&self) -> Result<Arc<T>> {
    self.resolve::<T>(None, None)
  }

  pub fn resolve_qualified<T: ?Sized + Any + Send + Sync, Q: Qualifier>(&self) -> Result<Arc<T>> {
    self.resolve::<T>(None, Some(QualifierId::of::<Q>()))
  }

  pub fn resolve_scoped<T: ?Sized + Any + Send + Sync, S: Scope>(&self) -> Result<Arc<T>> {
    self.resolve::<T>(Some(ScopeId::of::<S>()), None)
  }

  pub fn resolve_scoped_qualified<T: ?Sized + Any + Send + Sync, S: Scope, Q: Qualifier>(
    &self,
  ) -> Result<Arc<T>> {
    self.resolve::<T>(Some(ScopeId::of::<S>()), Some(QualifierId::of::<Q>()))
  }

  // --- Introspection ---

  /// Whether an entry exists at the exact key.
  pub fn contains<T: ?Sized + Any>(&self, scope: Option<ScopeId>, qualifier: Option<QualifierId>) -> bool {
    self.entries.contains_key(&RegistrationKey::new::<T>(scope, qualifier))
  }

  /// The lifecycle the entry at the exact key was registered with.
  pub fn lifecycle_of<T: ?Sized + Any>(
    &self,
    scope: Option<ScopeId>,
    qualifier: Option<QualifierId>,
  ) -> Option<Lifecycle> {
    self
      .lookup(&RegistrationKey::new::<T>(scope, qualifier))
      .map(|entry| entry.lifecycle())
  }

  /// Whether the entry at the exact key currently holds a live cached value.
  pub fn is_cached<T: ?Sized + Any>(&self, scope: Option<ScopeId>, qualifier: Option<QualifierId>) -> bool {
    self
      .lookup(&RegistrationKey::new::<T>(scope, qualifier))
      .is_some_and(|entry| entry.is_populated())
  }

  pub fn keys(&self) -> Vec<RegistrationKey> {
    self.entries.iter().map(|entry| *entry.key()).collect()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  // --- Clearing ---

  /// Removes every entry matching `filter` and returns how many were removed.
  ///
  /// Removal happens shard by shard under each shard's write lock, so a key is
  /// either removed with the entry it holds at that moment or not at all. The
  /// removed entries are dropped after every lock is released.
  pub fn clear_matching(&self, filter: KeyFilter) -> usize {
    let mut removed: Vec<Arc<Entry>> = Vec::new();
    self.entries.retain(|key, entry| {
      if filter.matches(key) {
        removed.push(Arc::clone(entry));
        false
      } else {
        true
      }
    });
    tracing::debug!(?filter, removed = removed.len(), "cleared registrations");
    removed.len()
  }

  /// Removes every registration.
  pub fn clear_all(&self) -> usize {
    self.clear_matching(KeyFilter::new())
  }

  /// Removes every registration of `T`, whatever its scope and qualifier.
  pub fn clear_all_for<T: ?Sized + Any>(&self) -> usize {
    self.clear_matching(KeyFilter::new().for_type::<T>())
  }

  /// Removes every registration scoped to `S`, whatever its type and qualifier.
  pub fn clear_all_scoped_to<S: Scope>(&self) -> usize {
    self.clear_matching(KeyFilter::new().scoped_to(ScopeId::of::<S>()))
  }

  /// Removes every registration qualified by `Q`, whatever its type and scope.
  pub fn clear_all_qualified_by<Q: Qualifier>(&self) -> usize {
    self.clear_matching(KeyFilter::new().qualified_by(QualifierId::of::<Q>()))
  }

  /// Removes every registration scoped to `S` and qualified by `Q`.
  pub fn clear_all_scoped_qualified<S: Scope, Q: Qualifier>(&self) -> usize {
    self.clear_matching(
      KeyFilter::new()
        .scoped_to(ScopeId::of::<S>())
        .qualified_by(QualifierId::of::<Q>()),
    )
  }

  /// Removes the unscoped registration of `T` with exactly this qualifier.
  pub fn clear_registration<T: ?Sized + Any>(&self, qualifier: Option<QualifierId>) -> bool {
    self.remove_exact(RegistrationKey::new::<T>(None, qualifier))
  }

  /// Removes the registration of `T` in `scope` with exactly this qualifier.
  pub fn clear_scoped_registration<T: ?Sized + Any>(
    &self,
    scope: ScopeId,
    qualifier: Option<QualifierId>,
  ) -> bool {
    self.remove_exact(RegistrationKey::new::<T>(Some(scope), qualifier))
  }

  fn remove_exact(&self, key: RegistrationKey) -> bool {
    let removed = self.entries.remove(&key);
    tracing::debug!(key = %key, removed = removed.is_some(), "cleared registration");
    removed.is_some()
  }
}

impl fmt::Debug for Resolver {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Resolver")
      .field("entries", &self.entries.len())
      .finish()
  }
}

/// A pending registration for `T`, created by [`Resolver::register`].
///
/// The lifecycle is decided when the provider is supplied: singleton if
/// [`singleton`](Self::singleton) was requested or the scope is
/// [`Global`](crate::Global), scoped if any other scope was set, transient otherwise.
#[must_use = "nothing is registered until a provider is supplied"]
pub struct Registration<'r, T: ?Sized> {
  resolver: &'r Resolver,
  scope: Option<ScopeId>,
  qualifier: Option<QualifierId>,
  singleton: bool,
  _marker: PhantomData<fn() -> Arc<T>>,
}

impl<'r, T: ?Sized + Any + Send + Sync> Registration<'r, T> {
  pub fn scoped_to<S: Scope>(self) -> Self {
    self.in_scope(ScopeId::of::<S>())
  }

  pub fn qualified_by<Q: Qualifier>(self) -> Self {
    self.with_qualifier(QualifierId::of::<Q>())
  }

  pub fn in_scope(mut self, scope: ScopeId) -> Self {
    self.scope = Some(scope);
    self
  }

  pub fn with_qualifier(mut self, qualifier: QualifierId) -> Self {
    self.qualifier = Some(qualifier);
    self
  }

  /// The key this registration will be stored under.
  pub fn key(&self) -> RegistrationKey {
    RegistrationKey::new::<T>(self.scope, self.qualifier)
  }

  /// The lifecycle this registration will get.
  pub fn lifecycle(&self) -> Lifecycle {
    Lifecycle::select(self.singleton, self.scope)
  }

  /// Registers a provider that hands out shared pointers, which allows `T` to be
  /// a trait object.
  pub fn provide_shared<F>(self, provider: F)
  where
    F: Fn() -> Arc<T> + Send + Sync + 'static,
  {
    let entry = Entry::new(self.lifecycle(), provider);
    self.resolver.insert(self.key(), entry);
  }

  /// Registers an already built value as a pre-populated singleton.
  ///
  /// The resolver always retains the value. This overrides the lifecycle
  /// [`scoped_to`](Self::scoped_to) would otherwise give: the scope only takes
  /// part in the key, and the value is not released with its last external owner.
  pub fn shared_instance(self, instance: Arc<T>) {
    self.resolver.insert(self.key(), Entry::with_instance(instance));
  }
}

impl<'r, T: ?Sized + Singleton> Registration<'r, T> {
  /// Requests singleton lifecycle for a type that declares itself [`Singleton`].
  pub fn singleton(mut self) -> Self {
    self.singleton = true;
    self
  }
}

impl<'r, T: Any + Send + Sync> Registration<'r, T> {
  /// Registers a provider. Every produced value is wrapped in an `Arc`.
  pub fn provide<F>(self, provider: F)
  where
    F: Fn() -> T + Send + Sync + 'static,
  {
    self.provide_shared(move || Arc::new(provider()))
  }

  /// Registers an already built value as a pre-populated singleton.
  ///
  /// See [`shared_instance`](Self::shared_instance) for how this interacts with a scope.
  pub fn instance(self, instance: T) {
    self.shared_instance(Arc::new(instance));
  }
}
