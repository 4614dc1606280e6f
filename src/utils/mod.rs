pub mod atomic_file;
pub mod clipboard;
pub mod logging;
pub mod scroll;
pub mod syntax;
pub mod url;
