//! Marker traits used purely for their type identity.
//!
//! Qualifiers and scopes are never instantiated. The usual way to declare one is
//! an uninhabited enum:
//!
//! ```
//! use fibre_resolver::{Qualifier, Scope};
//!
//! pub enum Primary {}
//! impl Qualifier for Primary {}
//!
//! pub enum Session {}
//! impl Scope for Session {}
//! ```

/// Identifies a named variant of a registration for a given type.
///
/// Registrations for the same type under different qualifiers are fully
/// independent of each other and of the unqualified registration.
pub trait Qualifier: 'static {}

/// Identifies a sharing group for resolved values.
///
/// A value resolved through a scope is shared between every resolver of the same
/// key for as long as something outside the resolver keeps it alive. Once the last
/// external owner drops it, the next resolve calls the provider again.
pub trait Scope: 'static {}

/// The built-in scope that forces singleton lifecycle for any type.
pub enum Global {}

impl Scope for Global {}

/// Declares that a type may be registered with singleton lifecycle without a scope.
///
/// Implementing this unlocks [`Registration::singleton`](crate::Registration::singleton).
/// It can be implemented for trait objects as well (`impl Singleton for dyn MyTrait {}`)
/// as long as the trait lives in your crate.
pub trait Singleton: Send + Sync + 'static {}
