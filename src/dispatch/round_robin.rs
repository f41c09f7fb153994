use std::sync::atomic::{AtomicUsize, Ordering};

use super::DispatchStrategy;
use crate::elevator::{Car, Request};
use crate::errors::{Error, Result};
use crate::shared::CarId;

/**
 * Hands hall calls to available cars in turn, ignoring cost.
 *
 * # Fields
 * - `cursor`:  Lowest car id eligible for the next call.
 */
#[derive(Debug, Default)]
pub struct RoundRobinStrategy {
    cursor: AtomicUsize,
}

impl RoundRobinStrategy {
    pub fn new() -> RoundRobinStrategy {
        RoundRobinStrategy::default()
    }
}

impl DispatchStrategy for RoundRobinStrategy {
    fn name(&self) -> &'static str {
        "round_robin"
    }

    fn select_car(&self, _request: &Request, cars: &[&Car]) -> Result<CarId> {
        let available: Vec<CarId> = cars
            .iter()
            .filter(|car| car.is_available())
            .map(|car| car.id())
            .collect();

        // First available id at or after the cursor, wrapping to the lowest
        let pick = |start: usize| {
            available
                .iter()
                .copied()
                .find(|id| *id >= start)
                .or_else(|| available.first().copied())
        };

        // Pick and advance in one atomic step
        let previous = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |start| {
                pick(start).map(|id| id + 1)
            })
            .map_err(|_| Error::NoAvailableCar)?;

        pick(previous).ok_or(Error::NoAvailableCar)
    }
}
