//! Library components of the `coltype` command line tool.

pub mod input;
pub mod logging;
