pub mod bootstrap;
pub mod cli;
pub mod console;

pub use bootstrap::run;
pub use cli::Cli;
