use fibre_resolver::{global, resolve, Inject, ResolveError};
use std::panic;

struct UnregisteredService;

fn main() {
  // --- Using the panicking `resolve!` macro ---
  println!("Attempting to resolve a service that was never registered...");

  let result = panic::catch_unwind(|| {
    // This line will panic!
    let _service = resolve!(UnregisteredService);
  });

  assert!(result.is_err(), "resolve! should have panicked.");
  println!("Successfully caught the expected panic from resolve!.");

  // --- Eager accessors panic too: they have no error channel ---
  let result = panic::catch_unwind(|| Inject::<UnregisteredService>::new());
  assert!(result.is_err(), "Inject::new should have panicked.");

  // --- Using the fallible API ---
  println!("\nNow, attempting to resolve using the fallible `get()` method...");

  match global().get::<UnregisteredService>() {
    Ok(_) => panic!("Should not have found the service!"),
    Err(ResolveError::MissingProvider(key)) => {
      println!("Correctly received MissingProvider for {}.", key)
    }
    Err(other) => panic!("Unexpected error: {}", other),
  }

  assert!(Inject::<UnregisteredService>::try_new().is_err());
}
