//! Small helpers: formatting, filenames, URLs, paths

pub mod filename;
pub mod format;
pub mod paths;
pub mod url;
