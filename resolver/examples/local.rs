use fibre_resolver::{Global, LocalResolver};
use std::cell::RefCell;
use std::rc::Rc;

// Holds an `Rc`, so it could never live in the thread-safe resolver.
struct History {
  entries: Rc<RefCell<Vec<String>>>,
}

fn main() {
  let shared = Rc::new(RefCell::new(Vec::new()));

  let mut resolver = LocalResolver::new();
  let entries = Rc::clone(&shared);
  resolver
    .register::<History>()
    .scoped_to::<Global>()
    .provide(move || History {
      entries: Rc::clone(&entries),
    });

  let history = resolver.resolve_scoped::<History, Global>().unwrap();
  history.entries.borrow_mut().push("opened".to_string());

  let again = resolver.resolve_scoped::<History, Global>().unwrap();
  again.entries.borrow_mut().push("closed".to_string());

  println!("History: {:?}", shared.borrow());
  assert_eq!(shared.borrow().len(), 2);
  assert!(Rc::ptr_eq(&history, &again));
}
