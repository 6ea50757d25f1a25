use fibre_resolver::{global, resolve, Global, Qualifier};
use std::sync::Arc;

// --- Abstraction and Implementations ---
trait MessageSender: Send + Sync {
  fn send(&self, to: &str, message: &str) -> String;
}

struct EmailSender;
impl MessageSender for EmailSender {
  fn send(&self, to: &str, message: &str) -> String {
    format!("Sending email to {}: '{}'", to, message)
  }
}

struct SmsSender;
impl MessageSender for SmsSender {
  fn send(&self, to: &str, message: &str) -> String {
    format!("Sending SMS to {}: '{}'", to, message)
  }
}

// --- Qualifiers ---
// Never instantiated; only their type identity matters.
enum Email {}
impl Qualifier for Email {}

enum Sms {}
impl Qualifier for Sms {}

fn main() {
  // --- Registration ---
  // Both implementations live in the Global scope, so each is created once.
  global()
    .register::<dyn MessageSender>()
    .scoped_to::<Global>()
    .qualified_by::<Email>()
    .provide_shared(|| Arc::new(EmailSender));
  global()
    .register::<dyn MessageSender>()
    .scoped_to::<Global>()
    .qualified_by::<Sms>()
    .provide_shared(|| Arc::new(SmsSender));

  // --- Resolution ---
  // The qualifier picks the implementation at the point of resolution.
  let email_notifier = resolve!(trait MessageSender, scope = Global, qualifier = Email);
  let sms_notifier = resolve!(trait MessageSender, scope = Global, qualifier = Sms);

  let result1 = email_notifier.send("test@example.com", "Hello from Fibre!");
  let result2 = sms_notifier.send("+123456789", "Hello from Fibre!");

  println!("{}", result1);
  println!("{}", result2);

  assert!(result1.contains("email"));
  assert!(result2.contains("SMS"));

  // Clearing one qualifier leaves the other in place.
  global().clear_all_qualified_by::<Email>();
  assert!(global()
    .resolve_scoped_qualified::<dyn MessageSender, Global, Email>()
    .is_err());
  assert!(global()
    .resolve_scoped_qualified::<dyn MessageSender, Global, Sms>()
    .is_ok());
}
