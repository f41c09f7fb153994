//! Text command front-end used by the driver binary.

pub mod command;

pub use command::{execute, Command, Reply};
