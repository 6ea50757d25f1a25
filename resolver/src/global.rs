//! The process-wide resolver instance.

use crate::resolver::Resolver;
use once_cell::sync::Lazy;

// Created empty on first access. Never dropped; `clear_all` is the reset path.
static GLOBAL_RESOLVER: Lazy<Resolver> = Lazy::new(Resolver::default);

/// Provides a reference to the process-wide resolver.
///
/// The accessors ([`Inject`](crate::Inject) and friends) and the
/// [`resolve!`](crate::resolve) macro all go through this instance.
///
/// # Examples
///
/// ```
/// use fibre_resolver::global;
///
/// fn register_services() {
///   global().register::<String>().instance(String::from("Hello from global!"));
/// }
///
/// register_services();
/// assert_eq!(*global().get::<String>().unwrap(), "Hello from global!");
/// ```
pub fn global() -> &'static Resolver {
  &GLOBAL_RESOLVER
}
