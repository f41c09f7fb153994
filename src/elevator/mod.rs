pub mod car;
pub mod door;
pub mod request;

pub use car::{Car, CarSpec, StepOutcome};
pub use door::Door;
pub use request::Request;
