//! Elevator dispatch and car-motion engine.
//!
//! An [`ElevatorSystem`] owns the cars of one building. Hall calls are routed
//! to a car by a pluggable [`DispatchStrategy`], each car runs the LOOK
//! algorithm over its own stop-sets, and the whole building advances one
//! floor per [`ElevatorSystem::step`].

/***************************************/
/*              Modules                */
/***************************************/
pub mod config;
pub mod control;
pub mod coordinator;
pub mod dispatch;
pub mod elevator;
pub mod errors;
pub mod shared;

pub use config::{load_config, Config};
pub use coordinator::ElevatorSystem;
pub use dispatch::{DispatchStrategy, StrategyKind};
pub use elevator::{Car, CarSpec, Request};
pub use errors::{ConfigError, Error, Result};
pub use shared::{Building, CarId, CarStatus, Direction, Floor};
