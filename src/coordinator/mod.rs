pub mod coordinator;

pub use coordinator::{ElevatorSystem, HallCall};
