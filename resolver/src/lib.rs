//! # Fibre Resolver
//!
//! A process-wide, thread-safe dependency resolver for Rust.
//!
//! Providers (zero-argument factory closures) are registered against a type, an
//! optional [`Scope`] and an optional [`Qualifier`], and values are later resolved
//! through the same key. The resolver never inspects or builds dependencies
//! itself: whatever wiring a value needs happens inside its provider.
//!
//! ## Core Concepts
//!
//! - **Resolver**: the map from [`RegistrationKey`] to provider. [`global()`] is
//!   the process-wide instance; independent instances can be created with
//!   [`Resolver::new`].
//! - **Lifecycles**: a registration without a scope is *transient* (the provider
//!   runs on every resolve). A scoped registration is *scoped*: the last value is
//!   shared for as long as something outside the resolver keeps it alive. Types
//!   implementing [`Singleton`] (via [`Registration::singleton`]) and anything in
//!   the [`Global`] scope are *singletons*: produced once, then retained.
//! - **Qualifiers and scopes** are marker types, compared by [`TypeId`](std::any::TypeId).
//! - **Accessors**: [`Inject`], [`LazyInject`] and [`WeakInject`] hold resolved
//!   values for struct fields.
//! - **Errors**: resolution fails with [`ResolveError::MissingProvider`] or
//!   [`ResolveError::IncorrectType`]. Registration and clearing never fail.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_resolver::{global, resolve, Global, Qualifier, ResolveError};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct EnglishGreeter {
//!     message: String,
//! }
//!
//! impl Greeter for EnglishGreeter {
//!     fn greet(&self) -> String {
//!         self.message.clone()
//!     }
//! }
//!
//! enum Welcome {}
//! impl Qualifier for Welcome {}
//!
//! fn main() {
//!     global().register::<String>().qualified_by::<Welcome>().provide(|| String::from("Hello, World!"));
//!
//!     // A provider can resolve its own dependencies.
//!     global().register::<dyn Greeter>().scoped_to::<Global>().provide_shared(|| {
//!         let message = resolve!(String, qualifier = Welcome);
//!         Arc::new(EnglishGreeter { message: (*message).clone() })
//!     });
//!
//!     let greeter = resolve!(trait Greeter, scope = Global);
//!     assert_eq!(greeter.greet(), "Hello, World!");
//!
//!     assert!(matches!(global().get::<u64>(), Err(ResolveError::MissingProvider(_))));
//! }
//! ```

mod core;
mod error;
mod global;
mod inject;
mod key;
#[cfg(feature = "local")]
mod local_resolver;
mod macros;
mod markers;
mod resolver;

pub use crate::core::Lifecycle;
pub use error::{ResolveError, Result};
pub use global::global;
pub use inject::{Inject, LazyInject, WeakInject};
pub use key::{KeyFilter, QualifierId, RegistrationKey, ScopeId, TypeTag};
#[cfg(feature = "local")]
pub use local_resolver::{LocalRegistration, LocalResolver};
pub use markers::{Global, Qualifier, Scope, Singleton};
pub use resolver::{Registration, Resolver};
