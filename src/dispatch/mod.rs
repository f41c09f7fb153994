//! Hall-call dispatch policies.
//!
//! Every policy implements [`DispatchStrategy`]. The set of policies a
//! configuration can name is closed: [`StrategyKind`] lists them and
//! [`build_strategy`] maps each kind to its implementation.

pub mod anti_starvation;
pub mod nearest;
pub mod round_robin;
pub mod zone;
mod dispatch_tests;

pub use anti_starvation::AntiStarvationStrategy;
pub use nearest::NearestCarStrategy;
pub use round_robin::RoundRobinStrategy;
pub use zone::ZoneStrategy;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::config::DispatchConfig;
use crate::elevator::{Car, Request};
use crate::errors::{Error, Result};
use crate::shared::{Building, CarId};

/// Chooses which car serves a hall call.
///
/// `cars` is every car in the building, in id order, including ones that are
/// out of service. Implementations must skip unavailable cars and return
/// [`Error::NoAvailableCar`] when none is left.
pub trait DispatchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn select_car(&self, request: &Request, cars: &[&Car]) -> Result<CarId>;

    /// Age after which an assigned but unserved hall call is dispatched again.
    /// `None` leaves hall calls on the car they were first given to.
    fn starvation_threshold(&self) -> Option<Duration> {
        None
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Nearest,
    RoundRobin,
    AntiStarvation,
    Zone,
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "nearest" => Ok(StrategyKind::Nearest),
            "round_robin" => Ok(StrategyKind::RoundRobin),
            "anti_starvation" => Ok(StrategyKind::AntiStarvation),
            "zone" => Ok(StrategyKind::Zone),
            other => Err(Error::InvalidCommand(format!("unknown strategy '{}'", other))),
        }
    }
}

pub fn build_strategy(
    kind: StrategyKind,
    settings: &DispatchConfig,
    building: Building,
    n_cars: usize,
) -> Box<dyn DispatchStrategy> {
    match kind {
        StrategyKind::Nearest => Box::new(NearestCarStrategy),
        StrategyKind::RoundRobin => Box::new(RoundRobinStrategy::new()),
        StrategyKind::AntiStarvation => {
            Box::new(AntiStarvationStrategy::new(settings.starvation_threshold()))
        }
        StrategyKind::Zone => Box::new(ZoneStrategy::new(building, n_cars)),
    }
}

/// Lowest estimated cost wins, ties go to the lowest car id.
pub(crate) fn cheapest<'a>(
    request: &Request,
    cars: impl Iterator<Item = &'a Car>,
) -> Option<CarId> {
    cars.map(|car| (car.estimated_cost(request), car.id()))
        .min()
        .map(|(_, id)| id)
}
