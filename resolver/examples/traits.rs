use fibre_resolver::{global, resolve, LazyInject, Singleton};
use std::sync::Arc;

// 1. Define the abstraction (the trait)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// Every `dyn Logger` registration may be a singleton.
impl Singleton for dyn Logger {}

// 2. Define a concrete implementation
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

// 3. Define a service that depends on the abstraction
struct ReportService {
  logger: LazyInject<dyn Logger>,
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log("Starting report generation.");
    // ... logic to generate report ...
    self.logger.log("Finished report generation.");
  }
}

fn main() {
  // --- Registration ---

  // The resolver serves the Arc<ConsoleLogger> as Arc<dyn Logger>.
  global()
    .register::<dyn Logger>()
    .singleton()
    .provide_shared(|| Arc::new(ConsoleLogger));

  // The ReportService defers resolving its logger until first use.
  global().register::<ReportService>().provide(|| ReportService {
    logger: LazyInject::new(),
  });

  // --- Resolution and Usage ---
  println!("Resolving the high-level service...");
  let report_service = resolve!(ReportService);

  println!("Using the service...");
  report_service.generate_report();

  // The logger is the same singleton whichever way it is reached.
  assert!(Arc::ptr_eq(report_service.logger.get(), &resolve!(trait Logger)));
}
