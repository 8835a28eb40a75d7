//! Result output: console lines and the results file

pub mod console;
pub mod writer;

pub use console::{display_url, show_error, Console};
pub use writer::ResultWriter;
