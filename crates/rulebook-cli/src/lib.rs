//! Library side of the `rulebook` command-line tool.

pub mod loader;
pub mod logging;
pub mod pipeline;
