pub mod args;
pub mod context;
pub mod runner;

pub use args::Cli;
pub use runner::run;
