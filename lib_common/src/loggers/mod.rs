/// Console + truncate-on-start file logging through `log` and `fern`.
pub mod loggerlocal;

pub use loggerlocal::setup_logging;
