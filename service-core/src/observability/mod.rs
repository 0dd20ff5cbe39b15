pub mod logging;

pub use logging::{LoggingSettings, init_tracing};
