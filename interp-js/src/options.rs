use crate::builtins::HostBindings;
use std::cell::RefCell;
use std::rc::Rc;

/// Where script `console` output goes.
#[derive(Clone, Debug, Default)]
pub enum ConsoleSink {
  /// `log`, `info` and `debug` to stdout; `warn` and `error` to stderr.
  #[default]
  Stdout,
  /// Emitted as `tracing` events with the `interp_js::console` target.
  Tracing,
  /// Appended to a shared buffer, one entry per call.
  Capture(Rc<RefCell<Vec<String>>>),
  Silent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleLevel {
  Log,
  Info,
  Debug,
  Warn,
  Error,
}

impl ConsoleSink {
  /// Creates a capturing sink and returns it with its buffer.
  pub fn capture() -> (ConsoleSink, Rc<RefCell<Vec<String>>>) {
    let buf = Rc::new(RefCell::new(Vec::new()));
    (ConsoleSink::Capture(buf.clone()), buf)
  }

  pub fn write(&self, level: ConsoleLevel, line: &str) {
    match self {
      ConsoleSink::Stdout => match level {
        ConsoleLevel::Warn | ConsoleLevel::Error => eprintln!("{line}"),
        _ => println!("{line}"),
      },
      ConsoleSink::Tracing => match level {
        ConsoleLevel::Log | ConsoleLevel::Info => {
          tracing::info!(target: "interp_js::console", "{line}")
        }
        ConsoleLevel::Debug => tracing::debug!(target: "interp_js::console", "{line}"),
        ConsoleLevel::Warn => tracing::warn!(target: "interp_js::console", "{line}"),
        ConsoleLevel::Error => tracing::error!(target: "interp_js::console", "{line}"),
      },
      ConsoleSink::Capture(buf) => buf.borrow_mut().push(line.to_string()),
      ConsoleSink::Silent => {}
    };
  }
}

pub const DEFAULT_MAX_CALL_DEPTH: usize = 2000;

#[derive(Clone, Debug)]
pub struct RuntimeOptions {
  pub console: ConsoleSink,
  /// Nested calls beyond this depth terminate the run.
  pub max_call_depth: usize,
  /// Seed for `Math.random`. Unset means a fresh random seed per run.
  pub random_seed: Option<u64>,
  /// The bindings seeded into every run. Unset means [`HostBindings::standard`].
  pub host_bindings: Option<HostBindings>,
}

impl Default for RuntimeOptions {
  fn default() -> Self {
    Self {
      console: ConsoleSink::default(),
      max_call_depth: DEFAULT_MAX_CALL_DEPTH,
      random_seed: None,
      host_bindings: None,
    }
  }
}

impl RuntimeOptions {
  pub fn with_console(mut self, console: ConsoleSink) -> Self {
    self.console = console;
    self
  }

  pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
    self.max_call_depth = max_call_depth;
    self
  }

  pub fn with_random_seed(mut self, seed: u64) -> Self {
    self.random_seed = Some(seed);
    self
  }

  pub fn with_host_bindings(mut self, bindings: HostBindings) -> Self {
    self.host_bindings = Some(bindings);
    self
  }

  pub fn host_bindings(&self) -> &HostBindings {
    match &self.host_bindings {
      Some(bindings) => bindings,
      None => HostBindings::standard(),
    }
  }
}
