//! Registration identity: which type, under which scope and qualifier.

use crate::markers::{Global, Qualifier, Scope};
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A stable identifier for a Rust type.
///
/// Equality and hashing only look at the [`TypeId`]. The type name is carried
/// along for diagnostics, since two distinct types may format to the same name.
#[derive(Clone, Copy)]
pub struct TypeTag {
  id: TypeId,
  name: &'static str,
}

impl TypeTag {
  pub fn of<T: ?Sized + Any>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: type_name::<T>(),
    }
  }

  pub fn type_id(&self) -> TypeId {
    self.id
  }

  pub fn name(&self) -> &'static str {
    self.name
  }
}

impl PartialEq for TypeTag {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl fmt::Debug for TypeTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name)
  }
}

impl fmt::Display for TypeTag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name)
  }
}

/// Identity of a [`Scope`] marker.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(TypeTag);

impl ScopeId {
  pub fn of<S: Scope>() -> Self {
    Self(TypeTag::of::<S>())
  }

  /// The built-in [`Global`] scope.
  pub fn global() -> Self {
    Self::of::<Global>()
  }

  pub fn is_global(&self) -> bool {
    self.0.type_id() == TypeId::of::<Global>()
  }

  pub fn name(&self) -> &'static str {
    self.0.name()
  }
}

impl fmt::Debug for ScopeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "ScopeId({})", self.0)
  }
}

/// Identity of a [`Qualifier`] marker.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct QualifierId(TypeTag);

impl QualifierId {
  pub fn of<Q: Qualifier>() -> Self {
    Self(TypeTag::of::<Q>())
  }

  pub fn name(&self) -> &'static str {
    self.0.name()
  }
}

impl fmt::Debug for QualifierId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "QualifierId({})", self.0)
  }
}

/// The map key of a registration.
///
/// Two keys are equal iff the type, the scope and the qualifier are all equal. An
/// absent scope or qualifier is only equal to another absent one.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationKey {
  ty: TypeTag,
  scope: Option<ScopeId>,
  qualifier: Option<QualifierId>,
}

impl RegistrationKey {
  pub fn new<T: ?Sized + Any>(scope: Option<ScopeId>, qualifier: Option<QualifierId>) -> Self {
    Self {
      ty: TypeTag::of::<T>(),
      scope,
      qualifier,
    }
  }

  pub fn ty(&self) -> TypeTag {
    self.ty
  }

  pub fn scope(&self) -> Option<ScopeId> {
    self.scope
  }

  pub fn qualifier(&self) -> Option<QualifierId> {
    self.qualifier
  }
}

impl fmt::Debug for RegistrationKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Key({}", self.ty)?;
    if let Some(scope) = &self.scope {
      write!(f, ", Scope({})", scope.name())?;
    }
    if let Some(qualifier) = &self.qualifier {
      write!(f, ", Qualifier({})", qualifier.name())?;
    }
    f.write_str(")")
  }
}

impl fmt::Display for RegistrationKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.ty.name())?;
    match (&self.scope, &self.qualifier) {
      (Some(s), Some(q)) => write!(f, " (scoped to {}, qualified by {})", s.name(), q.name()),
      (Some(s), None) => write!(f, " (scoped to {})", s.name()),
      (None, Some(q)) => write!(f, " (qualified by {})", q.name()),
      (None, None) => Ok(()),
    }
  }
}

/// A partial predicate over registration keys.
///
/// Every facet that is set must be equal on a matching key. Facets left unset
/// match anything, so the default filter matches every key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyFilter {
  ty: Option<TypeTag>,
  scope: Option<ScopeId>,
  qualifier: Option<QualifierId>,
}

impl KeyFilter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn for_type<T: ?Sized + Any>(mut self) -> Self {
    self.ty = Some(TypeTag::of::<T>());
    self
  }

  pub fn scoped_to(mut self, scope: ScopeId) -> Self {
    self.scope = Some(scope);
    self
  }

  pub fn qualified_by(mut self, qualifier: QualifierId) -> Self {
    self.qualifier = Some(qualifier);
    self
  }

  pub fn matches(&self, key: &RegistrationKey) -> bool {
    self.ty.map_or(true, |ty| ty == key.ty)
      && self.scope.map_or(true, |scope| key.scope == Some(scope))
      && self.qualifier.map_or(true, |q| key.qualifier == Some(q))
  }
}
