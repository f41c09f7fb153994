use crate::errors::{Error, Result};
use crate::shared::{Direction, Floor};
use std::time::{Duration, Instant};

/**
 * A button press, either on a floor (hall call) or inside a car (car call).
 *
 * Hall calls always carry `Up` or `Down`. Car calls never carry a direction,
 * the car infers one from its own position and motion when the stop is queued.
 *
 * # Fields
 * - `floor`:       Floor the rider wants the car at.
 * - `direction`:   Desired travel direction, `None` for car calls.
 * - `is_external`: True for hall calls.
 * - `created_at`:  When the button was pressed.
 */
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Request {
    pub floor: Floor,
    pub direction: Option<Direction>,
    pub is_external: bool,
    pub created_at: Instant,
}

impl Request {
    /// Hall call. `Idle` is not a travel direction and is rejected.
    pub fn hall(floor: Floor, direction: Direction) -> Result<Request> {
        if direction == Direction::Idle {
            return Err(Error::InvalidDirection);
        }
        Ok(Request {
            floor,
            direction: Some(direction),
            is_external: true,
            created_at: Instant::now(),
        })
    }

    pub fn car(floor: Floor) -> Request {
        Request {
            floor,
            direction: None,
            is_external: false,
            created_at: Instant::now(),
        }
    }

    /// Keeps the original press time when a waiting call is dispatched again.
    pub fn with_created_at(self, created_at: Instant) -> Request {
        Request { created_at, ..self }
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}
