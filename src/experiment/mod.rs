pub mod analyzer;
pub mod config;
pub mod dataset;
pub mod designer;
pub mod io;
