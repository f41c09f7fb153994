use crate::errors::{Error, Result};
use crate::shared::DoorState;

/**
 * Car door state machine: `Closed --open()--> Open --close()--> Closed`.
 *
 * Any other transition is a no-op. Closing is guarded by the obstruction
 * sensor; an obstructed close is an error and is counted so the owning car can
 * raise an alarm after repeated failures.
 *
 * # Fields
 * - `state`:           Current door state.
 * - `obstructed`:      Last obstruction sensor reading.
 * - `failed_closes`:   Consecutive close attempts refused by the obstruction guard.
 * - `times_opened`:    Number of `Closed -> Open` transitions.
 */
#[derive(Debug, Clone)]
pub struct Door {
    state: DoorState,
    obstructed: bool,
    failed_closes: u32,
    times_opened: u64,
}

impl Door {
    pub(crate) fn new() -> Door {
        Door {
            state: DoorState::Closed,
            obstructed: false,
            failed_closes: 0,
            times_opened: 0,
        }
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DoorState::Open
    }

    pub fn is_obstructed(&self) -> bool {
        self.obstructed
    }

    pub fn failed_closes(&self) -> u32 {
        self.failed_closes
    }

    pub fn times_opened(&self) -> u64 {
        self.times_opened
    }

    pub(crate) fn open(&mut self) -> bool {
        match self.state {
            DoorState::Closed => {
                self.state = DoorState::Open;
                self.times_opened += 1;
                true
            }
            DoorState::Open => false,
        }
    }

    /// `Ok(false)` when already closed, `Err(DoorObstructed)` when the sensor blocks it.
    pub(crate) fn close(&mut self) -> Result<bool> {
        match self.state {
            DoorState::Closed => Ok(false),
            DoorState::Open if self.obstructed => {
                self.failed_closes += 1;
                Err(Error::DoorObstructed)
            }
            DoorState::Open => {
                self.state = DoorState::Closed;
                self.failed_closes = 0;
                Ok(true)
            }
        }
    }

    pub(crate) fn set_obstruction(&mut self, active: bool) {
        self.obstructed = active;
    }
}
