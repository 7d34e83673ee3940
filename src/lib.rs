pub mod commands;
pub mod config;
pub mod injector;
pub mod source;
