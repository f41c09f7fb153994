use crate::elevator::door::Door;
use crate::elevator::request::Request;
use crate::errors::{Error, Result};
use crate::shared::{Alarm, Building, CarId, CarState, CarStatus, Direction, Floor};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::ops::Bound::{Excluded, Unbounded};

/**
 * Per-car limits and door policy.
 *
 * # Fields
 * - `max_capacity`:            Maximum number of passengers.
 * - `max_weight_kg`:           Maximum load in kilograms.
 * - `door_close_retry_ticks`:  Ticks to wait before retrying an obstructed door close.
 * - `door_max_close_attempts`: Consecutive failed closes before the obstruction alarm is raised.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarSpec {
    pub max_capacity: u32,
    pub max_weight_kg: u32,
    pub door_close_retry_ticks: u32,
    pub door_max_close_attempts: u32,
}

impl Default for CarSpec {
    fn default() -> Self {
        CarSpec {
            max_capacity: 10,
            max_weight_kg: 800,
            door_close_retry_ticks: 1,
            door_max_close_attempts: 3,
        }
    }
}

/// What a single `advance()` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Emergency or maintenance, nothing happens.
    Halted,
    /// No pending stops.
    Idle,
    /// Door could not be closed yet, the car stays put.
    DoorHeld,
    /// Passed a floor without stopping.
    Moved(Floor),
    /// Stopped at a floor, removed its stop and cycled the door.
    Served(Floor),
}

/**
 * One elevator car running the LOOK algorithm.
 *
 * The car keeps two ordered stop-sets. It sweeps in its current direction,
 * serving every stop ahead of it, and only reverses once nothing is left
 * ahead. A stop behind the car waits for the return sweep.
 *
 * # Fields
 * - `id`:              Car id, also its index in the system.
 * - `building`:        Floor range the car may travel.
 * - `spec`:            Load limits and door policy.
 * - `current_floor`:   Floor the car is at.
 * - `direction`:       Direction of the current sweep, `Idle` between sweeps.
 * - `state`:           Operational state.
 * - `door`:            The car's own door.
 * - `up_stops`:        Stops served on the upward sweep.
 * - `down_stops`:      Stops served on the downward sweep.
 * - `passengers`:      Current passenger count.
 * - `load_kg`:         Current load.
 * - `alarms`:          Active operational alarms.
 * - `door_retry_in`:   Ticks left before the next door close attempt.
 */
#[derive(Debug, Clone)]
pub struct Car {
    id: CarId,
    building: Building,
    spec: CarSpec,
    current_floor: Floor,
    direction: Direction,
    state: CarState,
    door: Door,
    up_stops: BTreeSet<Floor>,
    down_stops: BTreeSet<Floor>,
    passengers: u32,
    load_kg: u32,
    alarms: Vec<Alarm>,
    door_retry_in: u32,
}

impl Car {
    /// New car parked at the lowest floor with its door closed.
    pub fn new(id: CarId, building: Building, spec: CarSpec) -> Car {
        Car {
            id,
            building,
            spec,
            current_floor: building.min_floor,
            direction: Direction::Idle,
            state: CarState::Stopped,
            door: Door::new(),
            up_stops: BTreeSet::new(),
            down_stops: BTreeSet::new(),
            passengers: 0,
            load_kg: 0,
            alarms: Vec::new(),
            door_retry_in: 0,
        }
    }

    pub fn starting_at(mut self, floor: Floor) -> Result<Car> {
        self.building.check(floor)?;
        self.current_floor = floor;
        Ok(self)
    }

    /***************************************/
    /*              Accessors              */
    /***************************************/
    pub fn id(&self) -> CarId {
        self.id
    }

    pub fn current_floor(&self) -> Floor {
        self.current_floor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> CarState {
        self.state
    }

    pub fn door(&self) -> &Door {
        &self.door
    }

    pub fn up_stops(&self) -> &BTreeSet<Floor> {
        &self.up_stops
    }

    pub fn down_stops(&self) -> &BTreeSet<Floor> {
        &self.down_stops
    }

    pub fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    pub fn spec(&self) -> &CarSpec {
        &self.spec
    }

    pub fn has_stops(&self) -> bool {
        !self.up_stops.is_empty() || !self.down_stops.is_empty()
    }

    pub fn is_idle(&self) -> bool {
        self.state == CarState::Stopped && !self.has_stops()
    }

    /// Cars in emergency or maintenance never receive hall calls.
    pub fn is_available(&self) -> bool {
        !matches!(self.state, CarState::Emergency | CarState::Maintenance)
    }

    pub fn status(&self) -> CarStatus {
        CarStatus {
            car_id: self.id,
            current_floor: self.current_floor,
            direction: self.direction,
            state: self.state,
            door: self.door.state(),
            up_stops: self.up_stops.iter().copied().collect(),
            down_stops: self.down_stops.iter().copied().collect(),
            passengers: self.passengers,
            load_kg: self.load_kg,
            alarms: self.alarms.clone(),
        }
    }

    /***************************************/
    /*             Public API              */
    /***************************************/

    /// Queues a stop. Hall calls go to the set matching their direction; car
    /// calls (`None`) are placed relative to the car's position and motion.
    pub fn add_stop(&mut self, floor: Floor, direction: Option<Direction>) -> Result<()> {
        self.building.check(floor)?;

        let sweep = match direction {
            Some(Direction::Up) => Direction::Up,
            Some(Direction::Down) => Direction::Down,
            _ => self.infer_sweep(floor),
        };

        let inserted = match sweep {
            Direction::Up => self.up_stops.insert(floor),
            _ => self.down_stops.insert(floor),
        };

        if inserted {
            debug!("Car {}: queued floor {} for the {:?} sweep", self.id, floor, sweep);
        }
        Ok(())
    }

    /// True if `floor` is queued for the given sweep, or for either sweep when `Idle`.
    pub fn has_stop(&self, floor: Floor, sweep: Direction) -> bool {
        match sweep {
            Direction::Up => self.up_stops.contains(&floor),
            Direction::Down => self.down_stops.contains(&floor),
            Direction::Idle => self.up_stops.contains(&floor) || self.down_stops.contains(&floor),
        }
    }

    /// Drops a queued hall stop so another car can take it over.
    pub(crate) fn remove_stop(&mut self, floor: Floor, sweep: Direction) -> bool {
        let removed = match sweep {
            Direction::Up => self.up_stops.remove(&floor),
            Direction::Down => self.down_stops.remove(&floor),
            Direction::Idle => false,
        };
        if removed && self.direction != Direction::Idle {
            self.direction = self.next_direction();
            if self.direction == Direction::Idle && self.state == CarState::Moving {
                self.state = CarState::Stopped;
            }
        }
        removed
    }

    /// One simulation tick. Moves at most one floor.
    pub fn advance(&mut self) -> Result<StepOutcome> {
        if !self.is_available() {
            return Ok(StepOutcome::Halted);
        }

        // Overload keeps the car parked with the door open until it clears
        if let Err(e) = self.check_load() {
            self.door.open();
            self.state = CarState::Stopped;
            self.raise_alarm(Alarm::Overweight);
            return Err(e);
        }
        self.clear_alarm(Alarm::Overweight);

        if self.door.is_open() {
            if self.door_retry_in > 0 {
                self.door_retry_in -= 1;
                self.state = CarState::Stopped;
                return Ok(StepOutcome::DoorHeld);
            }
            if !self.try_close_door() {
                self.state = CarState::Stopped;
                return Ok(StepOutcome::DoorHeld);
            }
        }

        if self.direction == Direction::Idle {
            self.direction = self.initial_direction();
            if self.direction == Direction::Idle {
                self.state = CarState::Stopped;
                return Ok(StepOutcome::Idle);
            }
        }

        if self.stop_due_here() {
            return Ok(self.serve_current_floor());
        }

        let next_floor = match self.direction {
            Direction::Up => self.current_floor.checked_add(1),
            Direction::Down => self.current_floor.checked_sub(1),
            Direction::Idle => None,
        };
        let next_floor = match next_floor {
            Some(floor) if self.building.contains(floor) => floor,
            _ => {
                warn!(
                    "Car {}: refusing to move {:?} past floor {}",
                    self.id, self.direction, self.current_floor
                );
                self.direction = Direction::Idle;
                self.state = CarState::Stopped;
                return Ok(StepOutcome::Idle);
            }
        };

        self.current_floor = next_floor;
        self.state = CarState::Moving;
        debug!("Car {}: moving {:?}, at floor {}", self.id, self.direction, next_floor);

        if self.stop_due_here() {
            return Ok(self.serve_current_floor());
        }

        self.direction = self.next_direction();
        if self.direction == Direction::Idle {
            self.state = CarState::Stopped;
        }
        Ok(StepOutcome::Moved(next_floor))
    }

    /// Floors-equivalent distance until this car could serve `request`.
    ///
    /// Idle cars cost the straight distance. A car already heading toward the
    /// floor in the requested direction costs the forward distance. Anything
    /// else has to finish the current sweep first, then travel back.
    pub fn estimated_cost(&self, request: &Request) -> u32 {
        let from = self.current_floor;
        let target = request.floor;

        match self.direction {
            Direction::Idle => from.abs_diff(target),
            sweep => {
                let ahead = match sweep {
                    Direction::Up => target >= from,
                    _ => target <= from,
                };
                let same_way = request.direction.map_or(true, |dirn| dirn == sweep);

                if ahead && same_way {
                    from.abs_diff(target)
                } else {
                    let extreme = self.sweep_extreme(sweep);
                    from.abs_diff(extreme).saturating_add(extreme.abs_diff(target))
                }
            }
        }
    }

    /// Immediate override. Pending stops are kept for after `resume()`.
    pub fn emergency_stop(&mut self) {
        if self.state == CarState::Emergency {
            return;
        }
        warn!("Car {}: emergency stop at floor {}", self.id, self.current_floor);
        self.state = CarState::Emergency;
        self.direction = Direction::Idle;
        self.door.open();
        self.door_retry_in = 0;
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.state != CarState::Emergency {
            return Err(self.invalid_transition("resume"));
        }
        info!("Car {}: resuming after emergency", self.id);
        self.state = CarState::Stopped;
        Ok(())
    }

    pub fn enter_maintenance(&mut self) -> Result<()> {
        if self.state == CarState::Emergency {
            return Err(self.invalid_transition("enter maintenance"));
        }
        info!("Car {}: entering maintenance at floor {}", self.id, self.current_floor);
        self.state = CarState::Maintenance;
        self.direction = Direction::Idle;
        Ok(())
    }

    pub fn exit_maintenance(&mut self) -> Result<()> {
        if self.state != CarState::Maintenance {
            return Err(self.invalid_transition("exit maintenance"));
        }
        info!("Car {}: back in service", self.id);
        self.state = CarState::Stopped;
        Ok(())
    }

    /// Obstruction sensor reading for the door.
    pub fn set_obstruction(&mut self, active: bool) {
        self.door.set_obstruction(active);
    }

    pub fn set_load(&mut self, passengers: u32, load_kg: u32) {
        self.passengers = passengers;
        self.load_kg = load_kg;
    }

    /***************************************/
    /*           Private helpers           */
    /***************************************/
    fn check_load(&self) -> Result<()> {
        if self.load_kg > self.spec.max_weight_kg || self.passengers > self.spec.max_capacity {
            return Err(Error::Overweight {
                car_id: self.id,
                passengers: self.passengers,
                load_kg: self.load_kg,
                max_capacity: self.spec.max_capacity,
                max_weight_kg: self.spec.max_weight_kg,
            });
        }
        Ok(())
    }

    fn infer_sweep(&self, floor: Floor) -> Direction {
        match self.direction {
            Direction::Down if floor <= self.current_floor => Direction::Down,
            Direction::Down => Direction::Up,
            _ if floor >= self.current_floor => Direction::Up,
            _ => Direction::Down,
        }
    }

    fn has_stops_beyond(&self, direction: Direction) -> bool {
        let floor = self.current_floor;
        match direction {
            Direction::Up => {
                let above = (Excluded(floor), Unbounded);
                self.up_stops.range(above).next().is_some()
                    || self.down_stops.range(above).next().is_some()
            }
            Direction::Down => {
                self.up_stops.range(..floor).next().is_some()
                    || self.down_stops.range(..floor).next().is_some()
            }
            Direction::Idle => false,
        }
    }

    // Farthest pending stop in the sweep direction, or the current floor
    fn sweep_extreme(&self, direction: Direction) -> Floor {
        let ends = [
            self.up_stops.first(),
            self.up_stops.last(),
            self.down_stops.first(),
            self.down_stops.last(),
        ];
        let ends = ends.into_iter().flatten().copied();
        match direction {
            Direction::Up => ends.fold(self.current_floor, Floor::max),
            Direction::Down => ends.fold(self.current_floor, Floor::min),
            Direction::Idle => self.current_floor,
        }
    }

    // Direction to start a sweep in when the car has none
    fn initial_direction(&self) -> Direction {
        let floor = self.current_floor;
        if !self.up_stops.is_empty() {
            if self.up_stops.range(floor..).next().is_some() {
                return Direction::Up;
            }
            return Direction::Down;
        }
        if !self.down_stops.is_empty() {
            if self.down_stops.range(..=floor).next().is_some() {
                return Direction::Down;
            }
            return Direction::Up;
        }
        Direction::Idle
    }

    // LOOK reversal: keep going while anything is ahead, else turn, else idle
    fn next_direction(&self) -> Direction {
        match self.direction {
            Direction::Idle => self.initial_direction(),
            sweep if self.has_stops_beyond(sweep) => sweep,
            sweep if self.has_stops_beyond(sweep.opposite()) => sweep.opposite(),
            _ => self.initial_direction(),
        }
    }

    // A stop for the other sweep is only served here if this is the turning point
    fn stop_due_here(&self) -> bool {
        let floor = self.current_floor;
        match self.direction {
            Direction::Up => {
                self.up_stops.contains(&floor)
                    || (self.down_stops.contains(&floor) && !self.has_stops_beyond(Direction::Up))
            }
            Direction::Down => {
                self.down_stops.contains(&floor)
                    || (self.up_stops.contains(&floor) && !self.has_stops_beyond(Direction::Down))
            }
            Direction::Idle => {
                self.up_stops.contains(&floor) || self.down_stops.contains(&floor)
            }
        }
    }

    fn serve_current_floor(&mut self) -> StepOutcome {
        let floor = self.current_floor;
        match self.direction {
            Direction::Up => {
                self.up_stops.remove(&floor);
            }
            Direction::Down => {
                self.down_stops.remove(&floor);
            }
            Direction::Idle => {}
        }
        if !self.has_stops_beyond(self.direction) {
            self.up_stops.remove(&floor);
            self.down_stops.remove(&floor);
        }

        self.door.open();
        info!("Car {}: serving floor {}", self.id, floor);

        self.direction = self.next_direction();
        self.state = CarState::Stopped;
        if self.try_close_door() && self.direction != Direction::Idle {
            self.state = CarState::Moving;
        }
        StepOutcome::Served(floor)
    }

    fn try_close_door(&mut self) -> bool {
        match self.door.close() {
            Ok(_) => {
                self.door_retry_in = 0;
                self.clear_alarm(Alarm::Obstruction);
                true
            }
            Err(e) => {
                self.door_retry_in = self.spec.door_close_retry_ticks;
                if self.door.failed_closes() >= self.spec.door_max_close_attempts {
                    self.raise_alarm(Alarm::Obstruction);
                } else {
                    debug!("Car {}: {}, retrying", self.id, e);
                }
                false
            }
        }
    }

    fn raise_alarm(&mut self, alarm: Alarm) {
        if !self.alarms.contains(&alarm) {
            warn!("Car {}: {:?} alarm raised at floor {}", self.id, alarm, self.current_floor);
            self.alarms.push(alarm);
        }
    }

    fn clear_alarm(&mut self, alarm: Alarm) {
        if let Some(index) = self.alarms.iter().position(|a| *a == alarm) {
            info!("Car {}: {:?} alarm cleared", self.id, alarm);
            self.alarms.remove(index);
        }
    }

    fn invalid_transition(&self, action: &'static str) -> Error {
        Error::InvalidTransition {
            car_id: self.id,
            state: self.state,
            action,
        }
    }
}
