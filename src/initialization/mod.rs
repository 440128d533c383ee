//! Initialization of shared resources (logging).

mod logger;

pub use logger::init_logger_with;
