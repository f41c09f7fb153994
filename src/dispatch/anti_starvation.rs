use log::warn;
use std::time::Duration;

use super::{DispatchStrategy, NearestCarStrategy};
use crate::elevator::{Car, Request};
use crate::errors::Result;
use crate::shared::CarId;

/**
 * Bounds waiting time on top of another strategy.
 *
 * A request older than `threshold` goes to the nearest idle car, whatever its
 * estimated cost ranking. Younger requests, or old ones when no car is idle,
 * are left to the wrapped strategy.
 *
 * # Fields
 * - `inner`:       Strategy used for normal ranking.
 * - `threshold`:   Request age that triggers the override.
 */
pub struct AntiStarvationStrategy {
    inner: Box<dyn DispatchStrategy>,
    threshold: Duration,
}

impl AntiStarvationStrategy {
    pub fn new(threshold: Duration) -> AntiStarvationStrategy {
        AntiStarvationStrategy::wrapping(Box::new(NearestCarStrategy), threshold)
    }

    pub fn wrapping(inner: Box<dyn DispatchStrategy>, threshold: Duration) -> AntiStarvationStrategy {
        AntiStarvationStrategy { inner, threshold }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    fn nearest_idle(request: &Request, cars: &[&Car]) -> Option<CarId> {
        cars.iter()
            .filter(|car| car.is_available() && car.is_idle())
            .map(|car| (car.current_floor().abs_diff(request.floor), car.id()))
            .min()
            .map(|(_, id)| id)
    }
}

impl DispatchStrategy for AntiStarvationStrategy {
    fn name(&self) -> &'static str {
        "anti_starvation"
    }

    fn select_car(&self, request: &Request, cars: &[&Car]) -> Result<CarId> {
        let age = request.age();
        if age > self.threshold {
            if let Some(car_id) = AntiStarvationStrategy::nearest_idle(request, cars) {
                warn!(
                    "Hall call at floor {} waited {:?}, forcing it onto idle car {}",
                    request.floor, age, car_id
                );
                return Ok(car_id);
            }
        }
        self.inner.select_car(request, cars)
    }

    fn starvation_threshold(&self) -> Option<Duration> {
        Some(self.threshold)
    }
}
