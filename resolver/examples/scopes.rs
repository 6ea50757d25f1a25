use fibre_resolver::{global, resolve, Scope, WeakInject};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// A scope groups resolvers that should share one value for as long as it lives.
enum Checkout {}
impl Scope for Checkout {}

struct Cart {
  id: usize,
}

static CARTS_CREATED: AtomicUsize = AtomicUsize::new(0);

fn main() {
  global().register::<Cart>().scoped_to::<Checkout>().provide(|| Cart {
    id: CARTS_CREATED.fetch_add(1, Ordering::SeqCst),
  });

  // The first resolve creates the cart; the page below keeps it alive.
  let page = resolve!(Cart, scope = Checkout);
  let widget = resolve!(Cart, scope = Checkout);
  assert!(Arc::ptr_eq(&page, &widget));
  println!("Page and widget share cart #{}", page.id);

  // A weak accessor observes the cart without keeping it alive.
  let observer = WeakInject::<Cart>::scoped::<Checkout>();
  assert!(observer.is_alive());

  drop(page);
  drop(widget);
  assert!(observer.get().is_none());
  println!("All owners released the cart; the observer sees nothing.");

  // With no owner left, the next resolve starts a new cart.
  let next = resolve!(Cart, scope = Checkout);
  println!("A new checkout gets cart #{}", next.id);
  assert_eq!(next.id, 1);
}
