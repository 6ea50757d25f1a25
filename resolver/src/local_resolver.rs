//! A single-threaded, non-thread-safe resolver.

use crate::core::{Lifecycle, ResolutionGuard};
use crate::error::{ResolveError, Result};
use crate::key::{KeyFilter, QualifierId, RegistrationKey, ScopeId};
use crate::markers::{Qualifier, Scope, Singleton};
use once_cell::unsync::OnceCell;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

type LocalErased = Box<dyn Any>;

trait LocalWeakSlot {
  fn upgrade(&self) -> Option<LocalErased>;
}

impl<T: ?Sized + Any> LocalWeakSlot for Weak<T> {
  fn upgrade(&self) -> Option<LocalErased> {
    Weak::upgrade(self).map(|strong| Box::new(strong) as LocalErased)
  }
}

// A local version of `core::Entry`, built on `Rc`, `rc::Weak` and `unsync::OnceCell`.
enum LocalEntry {
  Transient {
    factory: Box<dyn Fn() -> LocalErased>,
  },
  Scoped {
    slot: RefCell<Option<Box<dyn LocalWeakSlot>>>,
    factory: Box<dyn Fn() -> (LocalErased, Box<dyn LocalWeakSlot>)>,
  },
  Singleton {
    cell: OnceCell<LocalErased>,
    factory: Box<dyn Fn() -> LocalErased>,
  },
}

impl LocalEntry {
  fn new<T: ?Sized + Any>(lifecycle: Lifecycle, factory: impl Fn() -> Rc<T> + 'static) -> Self {
    match lifecycle {
      Lifecycle::Transient => LocalEntry::Transient {
        factory: Box::new(move || Box::new(factory()) as LocalErased),
      },
      Lifecycle::Scoped => LocalEntry::Scoped {
        slot: RefCell::new(None),
        factory: Box::new(move || {
          let strong = factory();
          let weak: Box<dyn LocalWeakSlot> = Box::new(Rc::downgrade(&strong));
          (Box::new(strong) as LocalErased, weak)
        }),
      },
      Lifecycle::Singleton => LocalEntry::Singleton {
        cell: OnceCell::new(),
        factory: Box::new(move || Box::new(factory()) as LocalErased),
      },
    }
  }

  fn lifecycle(&self) -> Lifecycle {
    match self {
      LocalEntry::Transient { .. } => Lifecycle::Transient,
      LocalEntry::Scoped { .. } => Lifecycle::Scoped,
      LocalEntry::Singleton { .. } => Lifecycle::Singleton,
    }
  }

  fn with_instance<T: ?Sized + Any>(instance: Rc<T>) -> Self {
    LocalEntry::Singleton {
      cell: OnceCell::with_value(Box::new(instance) as LocalErased),
      factory: Box::new(|| panic!("Pre-initialized singleton factory should not be called")),
    }
  }

  fn is_populated(&self) -> bool {
    match self {
      LocalEntry::Transient { .. } => false,
      LocalEntry::Scoped { slot, .. } => slot.borrow().as_ref().and_then(|weak| weak.upgrade()).is_some(),
      LocalEntry::Singleton { cell, .. } => cell.get().is_some(),
    }
  }

  fn produce<T: ?Sized + Any>(&self) -> Option<Rc<T>> {
    match self {
      LocalEntry::Transient { factory } => narrow(factory()),
      LocalEntry::Scoped { slot, factory } => {
        let alive = slot.borrow().as_ref().and_then(|weak| weak.upgrade());
        if let Some(alive) = alive {
          return narrow(alive);
        }
        let (strong, weak) = factory();
        *slot.borrow_mut() = Some(weak);
        narrow(strong)
      }
      LocalEntry::Singleton { cell, factory } => {
        cell.get_or_init(factory).downcast_ref::<Rc<T>>().cloned()
      }
    }
  }
}

fn narrow<T: ?Sized + Any>(value: LocalErased) -> Option<Rc<T>> {
  value.downcast::<Rc<T>>().ok().map(|boxed| *boxed)
}

/// A single-threaded resolver.
///
/// Behaves like [`Resolver`](crate::Resolver) (same keys, lifecycles, errors and
/// clearing rules) but hands out `Rc<T>` and can therefore hold types that are
/// neither `Send` nor `Sync`.
///
/// # Note on API
///
/// Registration and clearing take `&mut self`, since the entries live in a plain
/// `HashMap`. Providers that need to resolve from the same resolver must share it
/// through `Rc<RefCell<LocalResolver>>`.
#[derive(Default)]
pub struct LocalResolver {
  entries: HashMap<RegistrationKey, LocalEntry>,
}

impl LocalResolver {
  /// Creates a new, empty `LocalResolver`.
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register<T: ?Sized + Any>(&mut self) -> LocalRegistration<'_, T> {
    LocalRegistration {
      resolver: self,
      scope: None,
      qualifier: None,
      singleton: false,
      _marker: PhantomData,
    }
  }

  /// Resolves `T` under the given scope and qualifier.
  ///
  /// # Panics
  ///
  /// Panics on circular resolution, like [`Resolver::resolve`](crate::Resolver::resolve).
  pub fn resolve<T: ?Sized + Any>(
    &self,
    scope: Option<ScopeId>,
    qualifier: Option<QualifierId>,
  ) -> Result<Rc<T>> {
    let key = RegistrationKey::new::<T>(scope, qualifier);
    let entry = self
      .entries
      .get(&key)
      .ok_or(ResolveError::MissingProvider(key))?;

    let _guard = ResolutionGuard::new(self as *const Self as usize, key);
    entry.produce::<T>().ok_or(ResolveError::IncorrectType(key))
  }

  pub fn get<T: ?Sized + Any>(&self) -> Result<Rc<T>> {
    self.resolve::<T>(None, None)
  }

  pub fn resolve_qualified<T: ?Sized + Any, Q: Qualifier>(&self) -> Result<Rc<T>> {
    self.resolve::<T>(None, Some(QualifierId::of::<Q>()))
  }

  pub fn resolve_scoped<T: ?Sized + Any, S: Scope>(&self) -> Result<Rc<T>> {
    self.resolve::<T>(Some(ScopeId::of::<S>()), None)
  }

  pub fn resolve_scoped_qualified<T: ?Sized + Any, S: Scope, Q: Qualifier>(&self) -> Result<Rc<T>> {
    self.resolve::<T>(Some(ScopeId::of::<S>()), Some(QualifierId::of::<Q>()))
  }

  pub fn contains<T: ?Sized + Any>(&self, scope: Option<ScopeId>, qualifier: Option<QualifierId>) -> bool {
    self.entries.contains_key(&RegistrationKey::new::<T>(scope, qualifier))
  }

  pub fn lifecycle_of<T: ?Sized + Any>(
    &self,
    scope: Option<ScopeId>,
    qualifier: Option<QualifierId>,
  ) -> Option<Lifecycle> {
    self
      .entries
      .get(&RegistrationKey::new::<T>(scope, qualifier))
      .map(LocalEntry::lifecycle)
  }

  pub fn is_cached<T: ?Sized + Any>(&self, scope: Option<ScopeId>, qualifier: Option<QualifierId>) -> bool {
    self
      .entries
      .get(&RegistrationKey::new::<T>(scope, qualifier))
      .is_some_and(LocalEntry::is_populated)
  }

  pub fn keys(&self) -> Vec<RegistrationKey> {
    self.entries.keys().copied().collect()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn clear_matching(&mut self, filter: KeyFilter) -> usize {
    let before = self.entries.len();
    self.entries.retain(|key, _| !filter.matches(key));
    before - self.entries.len()
  }

  pub fn clear_all(&mut self) -> usize {
    self.clear_matching(KeyFilter::new())
  }

  pub fn clear_all_for<T: ?Sized + Any>(&mut self) -> usize {
    self.clear_matching(KeyFilter::new().for_type::<T>())
  }

  pub fn clear_all_scoped_to<S: Scope>(&mut self) -> usize {
    self.clear_matching(KeyFilter::new().scoped_to(ScopeId::of::<S>()))
  }

  pub fn clear_all_qualified_by<Q: Qualifier>(&mut self) -> usize {
    self.clear_matching(KeyFilter::new().qualified_by(QualifierId::of::<Q>()))
  }

  pub fn clear_all_scoped_qualified<S: Scope, Q: Qualifier>(&mut self) -> usize {
    self.clear_matching(
      KeyFilter::new()
        .scoped_to(ScopeId::of::<S>())
        .qualified_by(QualifierId::of::<Q>()),
    )
  }

  pub fn clear_registration<T: ?Sized + Any>(&mut self, qualifier: Option<QualifierId>) -> bool {
    self
      .entries
      .remove(&RegistrationKey::new::<T>(None, qualifier))
      .is_some()
  }

  pub fn clear_scoped_registration<T: ?Sized + Any>(
    &mut self,
    scope: ScopeId,
    qualifier: Option<QualifierId>,
  ) -> bool {
    self
      .entries
      .remove(&RegistrationKey::new::<T>(Some(scope), qualifier))
      .is_some()
  }
}

/// A pending registration on a [`LocalResolver`].
#[must_use = "nothing is registered until a provider is supplied"]
pub struct LocalRegistration<'r, T: ?Sized> {
  resolver: &'r mut LocalResolver,
  scope: Option<ScopeId>,
  qualifier: Option<QualifierId>,
  singleton: bool,
  _marker: PhantomData<fn() -> Rc<T>>,
}

impl<'r, T: ?Sized + Any> LocalRegistration<'r, T> {
  pub fn scoped_to<S: Scope>(mut self) -> Self {
    self.scope = Some(ScopeId::of::<S>());
    self
  }

  pub fn qualified_by<Q: Qualifier>(mut self) -> Self {
    self.qualifier = Some(QualifierId::of::<Q>());
    self
  }

  pub fn provide_shared(self, provider: impl Fn() -> Rc<T> + 'static) {
    let key = RegistrationKey::new::<T>(self.scope, self.qualifier);
    let entry = LocalEntry::new(Lifecycle::select(self.singleton, self.scope), provider);
    self.resolver.entries.insert(key, entry);
  }

  /// Registers an already-built value as a pre-populated singleton, whatever
  /// scope was set. The scope only takes part in the key.
  pub fn shared_instance(self, instance: Rc<T>) {
    let key = RegistrationKey::new::<T>(self.scope, self.qualifier);
    self.resolver.entries.insert(key, LocalEntry::with_instance(instance));
  }
}

impl<'r, T: ?Sized + Singleton> LocalRegistration<'r, T> {
  pub fn singleton(mut self) -> Self {
    self.singleton = true;
    self
  }
}

impl<'r, T: Any> LocalRegistration<'r, T> {
  pub fn provide(self, provider: impl Fn() -> T + 'static) {
    self.provide_shared(move || Rc::new(provider()))
  }

  pub fn instance(self, instance: T) {
    self.shared_instance(Rc::new(instance));
  }
}
