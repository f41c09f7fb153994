/***************************************/
/*        3rd party libraries          */
/***************************************/
use arc_swap::ArcSwap;
use log::{debug, info, warn};
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::Config;
use crate::dispatch::{build_strategy, DispatchStrategy};
use crate::elevator::{Car, CarSpec, Request, StepOutcome};
use crate::errors::{ConfigError, Error, Result};
use crate::shared::{Building, CarId, CarStatus, Direction, Floor};

/***************************************/
/*       Public data structures        */
/***************************************/

/**
 * A hall call that has been given to a car and not yet served.
 *
 * # Fields
 * - `request`:     The call as pressed, `created_at` included.
 * - `car_id`:      Car currently holding the stop.
 * - `assigned_at`: When the call was given to that car.
 */
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HallCall {
    pub request: Request,
    pub car_id: CarId,
    pub assigned_at: Instant,
}

impl HallCall {
    fn same_stop(&self, other: &HallCall) -> bool {
        self.car_id == other.car_id
            && self.request.floor == other.request.floor
            && self.request.direction == other.request.direction
    }
}

/***************************************/
/*             Public API              */
/***************************************/

/**
 * Aggregate root for one building: owns every car and the active dispatch strategy.
 *
 * Hall calls are routed through the strategy, car calls go straight to the
 * named car. `step()` is the simulation clock and advances every car once,
 * in id order.
 *
 * Every entry point takes `&self`, so the system can be shared between a
 * button-handling thread and the clock. Each car sits behind its own lock.
 * A hall-call dispatch locks all cars in id order while it ranks them and
 * inserts the stop, so the clock never advances a car on a half-made
 * decision. The strategy is swapped atomically, an in-flight dispatch keeps
 * the one it loaded.
 *
 * Assigned hall calls are tracked until served. When the active strategy has
 * a starvation threshold, every dispatch first hands calls that have waited
 * longer than that on their car back to the strategy. Locks are always taken
 * cars first, in id order, then `pending`.
 *
 * # Fields
 * - `building`:    Floor range served by the cars.
 * - `cars`:        Cars indexed by id.
 * - `strategy`:    Active dispatch strategy.
 * - `pending`:     Assigned hall calls not yet served.
 * - `ticks`:       Number of completed `step()` calls.
 */
pub struct ElevatorSystem {
    building: Building,
    cars: Vec<Mutex<Car>>,
    strategy: ArcSwap<Box<dyn DispatchStrategy>>,
    pending: Mutex<Vec<HallCall>>,
    ticks: AtomicU64,
}

impl ElevatorSystem {
    /// Building with floors `0..n_floors` and `n_cars` identical cars parked at floor 0.
    pub fn new(
        n_cars: usize,
        n_floors: u32,
        max_capacity: u32,
        max_weight_kg: u32,
        strategy: Box<dyn DispatchStrategy>,
    ) -> Result<ElevatorSystem> {
        if !(2..=Building::MAX_FLOORS).contains(&n_floors) {
            return Err(ConfigError::Invalid(format!(
                "a building needs 2 to {} floors, got {}",
                Building::MAX_FLOORS,
                n_floors
            ))
            .into());
        }
        let building = Building::with_floors(n_floors);
        let spec = CarSpec {
            max_capacity,
            max_weight_kg,
            ..CarSpec::default()
        };
        let cars = (0..n_cars).map(|id| Car::new(id, building, spec)).collect();
        ElevatorSystem::with_cars(building, cars, strategy)
    }

    pub fn from_config(config: &Config) -> Result<ElevatorSystem> {
        config.validate()?;
        let building = config.building();
        let spec = config.car_spec();
        let n_cars = config.building.n_cars;
        let cars = (0..n_cars).map(|id| Car::new(id, building, spec)).collect();
        let strategy = build_strategy(config.dispatch.strategy, &config.dispatch, building, n_cars);
        ElevatorSystem::with_cars(building, cars, strategy)
    }

    /// Cars must be numbered `0..cars.len()` in order and lie inside `building`.
    pub fn with_cars(
        building: Building,
        cars: Vec<Car>,
        strategy: Box<dyn DispatchStrategy>,
    ) -> Result<ElevatorSystem> {
        building.validate()?;
        if cars.is_empty() {
            return Err(ConfigError::Invalid("a building needs at least one car".into()).into());
        }
        for (index, car) in cars.iter().enumerate() {
            if car.id() != index {
                return Err(ConfigError::Invalid(format!(
                    "car at position {} has id {}",
                    index,
                    car.id()
                ))
                .into());
            }
            building.check(car.current_floor())?;
        }

        info!(
            "Elevator system ready: {} cars, floors {}..={}, strategy {}",
            cars.len(),
            building.min_floor,
            building.max_floor,
            strategy.name()
        );

        Ok(ElevatorSystem {
            building,
            cars: cars.into_iter().map(Mutex::new).collect(),
            strategy: ArcSwap::from_pointee(strategy),
            pending: Mutex::new(Vec::new()),
            ticks: AtomicU64::new(0),
        })
    }

    pub fn building(&self) -> Building {
        self.building
    }

    pub fn n_cars(&self) -> usize {
        self.cars.len()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.load().name()
    }

    /// Hall call: the active strategy picks the car, which queues the stop.
    pub fn request_elevator(&self, floor: Floor, direction: Direction) -> Result<CarId> {
        self.dispatch(Request::hall(floor, direction)?)
    }

    /// Dispatches an already built hall call, keeping its original press time.
    pub fn dispatch(&self, request: Request) -> Result<CarId> {
        if request.direction.is_none() {
            return Err(Error::InvalidDirection);
        }
        self.building.check(request.floor)?;

        let mut guards: Vec<MutexGuard<'_, Car>> = self.cars.iter().map(|car| car.lock()).collect();
        let strategy = self.strategy.load_full();
        let mut pending = self.pending.lock();

        if let Some(threshold) = strategy.starvation_threshold() {
            ElevatorSystem::reassign_starved(&mut guards, &mut pending, &**strategy, threshold);
        }

        let views: Vec<&Car> = guards.iter().map(|guard| &**guard).collect();
        let car_id = match strategy.select_car(&request, &views) {
            Ok(car_id) => car_id,
            Err(e) => {
                warn!("Hall call at floor {} not dispatched: {}", request.floor, e);
                return Err(e);
            }
        };
        drop(views);

        let car = guards.get_mut(car_id).ok_or(Error::InvalidCarId(car_id))?;
        car.add_stop(request.floor, request.direction)?;
        pending.push(HallCall {
            request,
            car_id,
            assigned_at: Instant::now(),
        });

        info!(
            "Hall call at floor {} ({:?}) assigned to car {} by {}",
            request.floor,
            request.direction,
            car_id,
            strategy.name()
        );
        Ok(car_id)
    }

    /// Car call from inside `car_id`. Never consults the strategy.
    pub fn select_floor(&self, car_id: CarId, floor: Floor) -> Result<()> {
        let mut car = self.car(car_id)?.lock();
        car.add_stop(floor, None)?;
        info!("Car call to floor {} in car {}", floor, car_id);
        Ok(())
    }

    /// One clock tick. Operational alarms are logged and left in the car status.
    pub fn step(&self) {
        let tick = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;

        for car in &self.cars {
            let mut car = car.lock();
            match car.advance() {
                Ok(StepOutcome::Idle) | Ok(StepOutcome::Halted) => {}
                Ok(StepOutcome::Served(floor)) => {
                    debug!("Tick {}: car {} served floor {}", tick, car.id(), floor);
                    let car_id = car.id();
                    self.pending.lock().retain(|call| {
                        call.car_id != car_id
                            || call
                                .request
                                .direction
                                .map_or(false, |sweep| car.has_stop(call.request.floor, sweep))
                    });
                }
                Ok(outcome) => debug!("Tick {}: car {} {:?}", tick, car.id(), outcome),
                Err(e) => warn!("Tick {}: car {} stalled: {}", tick, car.id(), e),
            }
        }
    }

    /// Hot-swaps the strategy. Cars already sweeping are unaffected.
    pub fn set_strategy(&self, strategy: Box<dyn DispatchStrategy>) {
        info!(
            "Dispatch strategy changed from {} to {}",
            self.strategy_name(),
            strategy.name()
        );
        self.strategy.store(Arc::new(strategy));
    }

    pub fn status(&self) -> Vec<CarStatus> {
        self.cars.iter().map(|car| car.lock().status()).collect()
    }

    /// Hall calls assigned to a car and not yet served, oldest first.
    pub fn pending_calls(&self) -> Vec<HallCall> {
        self.pending.lock().clone()
    }

    pub fn car_status(&self, car_id: CarId) -> Result<CarStatus> {
        Ok(self.car(car_id)?.lock().status())
    }

    pub fn emergency_stop(&self, car_id: CarId) -> Result<()> {
        self.car(car_id)?.lock().emergency_stop();
        Ok(())
    }

    pub fn resume(&self, car_id: CarId) -> Result<()> {
        self.car(car_id)?.lock().resume()
    }

    pub fn set_maintenance(&self, car_id: CarId, on: bool) -> Result<()> {
        let mut car = self.car(car_id)?.lock();
        if on {
            car.enter_maintenance()
        } else {
            car.exit_maintenance()
        }
    }

    pub fn set_obstruction(&self, car_id: CarId, active: bool) -> Result<()> {
        self.car(car_id)?.lock().set_obstruction(active);
        Ok(())
    }

    pub fn set_load(&self, car_id: CarId, passengers: u32, load_kg: u32) -> Result<()> {
        self.car(car_id)?.lock().set_load(passengers, load_kg);
        Ok(())
    }

    fn car(&self, car_id: CarId) -> Result<&Mutex<Car>> {
        self.cars.get(car_id).ok_or(Error::InvalidCarId(car_id))
    }

    // Moves calls stuck on their car for longer than `threshold` to the car the strategy picks now
    fn reassign_starved(
        cars: &mut [MutexGuard<'_, Car>],
        pending: &mut [HallCall],
        strategy: &dyn DispatchStrategy,
        threshold: Duration,
    ) {
        for index in 0..pending.len() {
            let call = pending[index];
            let sweep = match call.request.direction {
                Some(sweep) if call.assigned_at.elapsed() > threshold => sweep,
                _ => continue,
            };

            let views: Vec<&Car> = cars.iter().map(|guard| &**guard).collect();
            let target = match strategy.select_car(&call.request, &views) {
                Ok(target) if target != call.car_id => target,
                _ => continue,
            };

            let floor = call.request.floor;
            let queued = match cars.get_mut(target) {
                Some(car) => car.add_stop(floor, Some(sweep)),
                None => Err(Error::InvalidCarId(target)),
            };
            if let Err(e) = queued {
                warn!("Hall call at floor {} could not move to car {}: {}", floor, target, e);
                continue;
            }
            if let Some(old) = cars.get_mut(call.car_id) {
                old.remove_stop(floor, sweep);
            }

            warn!(
                "Hall call at floor {} ({:?}) waited {:?} on car {}, moved to car {}",
                floor,
                sweep,
                call.request.age(),
                call.car_id,
                target
            );
            let now = Instant::now();
            for other in pending.iter_mut().filter(|other| other.same_stop(&call)) {
                other.car_id = target;
                other.assigned_at = now;
            }
        }
    }
}
