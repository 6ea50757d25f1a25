//! Public macros for ergonomic resolution from the global resolver.

/// Resolves a value from the global resolver, panicking on failure.
///
/// The scope and qualifier are given as marker types. Trait objects are resolved
/// with the `trait` form.
///
/// # Panics
///
/// Panics with the [`ResolveError`](crate::ResolveError) message if the value
/// cannot be resolved. Use [`try_resolve!`](crate::try_resolve) to get the
/// `Result` instead.
///
/// # Examples
///
/// ```
/// use fibre_resolver::{global, resolve, Qualifier};
///
/// enum Greeting {}
/// impl Qualifier for Greeting {}
///
/// global().register::<String>().qualified_by::<Greeting>().provide(|| String::from("hello"));
///
/// let message = resolve!(String, qualifier = Greeting);
/// assert_eq!(*message, "hello");
/// ```
///
/// ```
/// use fibre_resolver::{global, resolve};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync { fn greet(&self) -> String; }
/// struct EnglishGreeter;
/// impl Greeter for EnglishGreeter { fn greet(&self) -> String { "Hello!".to_string() } }
///
/// global().register::<dyn Greeter>().provide_shared(|| Arc::new(EnglishGreeter));
///
/// let greeter = resolve!(trait Greeter);
/// assert_eq!(greeter.greet(), "Hello!");
/// ```
#[macro_export]
macro_rules! resolve {
  // Trait arms come first: `trait` can never start a type, so they never shadow
  // the concrete arms below.
  (trait $trait_ident:ident $(, $($rest:tt)*)?) => {
    $crate::resolve!(@expect $crate::try_resolve!(trait $trait_ident $(, $($rest)*)?))
  };

  (@expect $result:expr) => {
    match $result {
      ::std::result::Result::Ok(value) => value,
      ::std::result::Result::Err(err) => {
        panic!("Failed to resolve required service: {}", err)
      }
    }
  };

  ($type:ty $(, $($rest:tt)*)?) => {
    $crate::resolve!(@expect $crate::try_resolve!($type $(, $($rest)*)?))
  };
}

/// Resolves a value from the global resolver, returning the `Result`.
///
/// Accepts the same forms as [`resolve!`](crate::resolve).
///
/// ```
/// use fibre_resolver::{try_resolve, ResolveError, Scope};
///
/// enum Request {}
/// impl Scope for Request {}
///
/// struct Unregistered;
/// let result = try_resolve!(Unregistered, scope = Request);
/// assert!(matches!(result, Err(ResolveError::MissingProvider(_))));
/// ```
#[macro_export]
macro_rules! try_resolve {
  (trait $trait_ident:ident $(, $($rest:tt)*)?) => {
    $crate::try_resolve!(@key (dyn $trait_ident) $(, $($rest)*)?)
  };

  (@key ($target:ty)) => {
    $crate::global().resolve::<$target>(None, None)
  };
  (@key ($target:ty), qualifier = $qualifier:ty) => {
    $crate::global().resolve::<$target>(None, Some($crate::QualifierId::of::<$qualifier>()))
  };
  (@key ($target:ty), scope = $scope:ty) => {
    $crate::global().resolve::<$target>(Some($crate::ScopeId::of::<$scope>()), None)
  };
  (@key ($target:ty), scope = $scope:ty, qualifier = $qualifier:ty) => {
    $crate::global().resolve::<$target>(
      Some($crate::ScopeId::of::<$scope>()),
      Some($crate::QualifierId::of::<$qualifier>()),
    )
  };

  ($type:ty $(, $($rest:tt)*)?) => {
    $crate::try_resolve!(@key ($type) $(, $($rest)*)?)
  };
}
