mod application;
mod console;
pub mod data;
mod runtime_config;

pub use application::{Application, ApplicationError};
pub use console::Console;
pub use runtime_config::RuntimeConfig;
