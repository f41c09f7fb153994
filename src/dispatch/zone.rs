use std::ops::RangeInclusive;

use super::{cheapest, DispatchStrategy, NearestCarStrategy};
use crate::elevator::{Car, Request};
use crate::errors::Result;
use crate::shared::{Building, CarId, Floor};

/**
 * Splits the building into contiguous floor bands, one per car.
 *
 * The cheapest available car whose band contains the hall call wins. When
 * no such car is available the call goes to the nearest car overall.
 *
 * # Fields
 * - `zones`:       Floor band of each car, indexed by car id.
 * - `fallback`:    Strategy used outside the zoned cars.
 */
#[derive(Debug, Clone)]
pub struct ZoneStrategy {
    zones: Vec<RangeInclusive<Floor>>,
    fallback: NearestCarStrategy,
}

impl ZoneStrategy {
    pub fn new(building: Building, n_cars: usize) -> ZoneStrategy {
        let n_cars = n_cars.max(1) as i64;
        let min = i64::from(building.min_floor);
        let max = i64::from(building.max_floor);
        let band = (i64::from(building.n_floors()) + n_cars - 1) / n_cars;

        let zones = (0..n_cars)
            .map(|i| {
                let low = min + i * band;
                let high = (low + band - 1).min(max);
                if low > max {
                    // More cars than bands, this car owns no floors
                    return RangeInclusive::new(1, 0);
                }
                (low as Floor)..=(high as Floor)
            })
            .collect();

        ZoneStrategy {
            zones,
            fallback: NearestCarStrategy,
        }
    }

    pub fn zone_of(&self, car_id: CarId) -> Option<&RangeInclusive<Floor>> {
        self.zones.get(car_id)
    }
}

impl DispatchStrategy for ZoneStrategy {
    fn name(&self) -> &'static str {
        "zone"
    }

    fn select_car(&self, request: &Request, cars: &[&Car]) -> Result<CarId> {
        let in_zone = cars.iter().copied().filter(|car| {
            car.is_available()
                && self
                    .zone_of(car.id())
                    .map_or(false, |zone| zone.contains(&request.floor))
        });

        match cheapest(request, in_zone) {
            Some(car_id) => Ok(car_id),
            None => self.fallback.select_car(request, cars),
        }
    }
}
