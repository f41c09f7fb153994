use super::{cheapest, DispatchStrategy};
use crate::elevator::{Car, Request};
use crate::errors::{Error, Result};
use crate::shared::CarId;

/// LOOK-aware nearest car: minimum `estimated_cost` among available cars.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestCarStrategy;

impl DispatchStrategy for NearestCarStrategy {
    fn name(&self) -> &'static str {
        "nearest"
    }

    fn select_car(&self, request: &Request, cars: &[&Car]) -> Result<CarId> {
        let available = cars.iter().copied().filter(|car| car.is_available());
        cheapest(request, available).ok_or(Error::NoAvailableCar)
    }
}
