// recompress-cli/src/commands/mod.rs
//
// Command implementations for the recompress binary.

pub mod encode;
pub mod manpage;

pub use encode::run_encode;
pub use manpage::install_manpage;
