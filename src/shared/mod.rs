pub mod macros;
pub mod structs;

pub use structs::Alarm;
pub use structs::Building;
pub use structs::CarId;
pub use structs::CarState;
pub use structs::CarStatus;
pub use structs::Direction;
pub use structs::DoorState;
pub use structs::Floor;
