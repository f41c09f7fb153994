/*
 * Unit tests for the dispatch strategies
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 *
 * Tests:
 * - test_nearest_picks_closest_car
 * - test_nearest_breaks_ties_by_lowest_id
 * - test_nearest_prefers_car_heading_toward_call
 * - test_nearest_skips_unavailable_cars
 * - test_nearest_no_available_car
 * - test_round_robin_cycles
 * - test_round_robin_skips_unavailable_cars
 * - test_round_robin_no_available_car
 * - test_round_robin_concurrent_callers_take_turns
 * - test_anti_starvation_fresh_request_uses_cost
 * - test_anti_starvation_old_request_goes_to_idle_car
 * - test_anti_starvation_falls_back_without_idle_car
 * - test_zone_bands
 * - test_zone_bands_huge_building
 * - test_zone_prefers_car_owning_the_floor
 * - test_zone_falls_back_to_nearest
 * - test_build_strategy_by_kind
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod dispatch_tests {
    use crate::config::DispatchConfig;
    use crate::dispatch::{
        build_strategy, AntiStarvationStrategy, DispatchStrategy, NearestCarStrategy,
        RoundRobinStrategy, StrategyKind, ZoneStrategy,
    };
    use crate::elevator::{Car, CarSpec, Request};
    use crate::errors::Error;
    use crate::shared::{Building, CarId, Direction, Floor};
    use std::time::{Duration, Instant};

    fn setup_car(id: CarId, floor: Floor) -> Car {
        Car::new(id, Building::new(0, 20), CarSpec::default())
            .starting_at(floor)
            .unwrap()
    }

    // Car that has left `from` and is one floor into an upward sweep toward `to`
    fn setup_moving_up(id: CarId, from: Floor, to: Floor) -> Car {
        let mut car = setup_car(id, from);
        car.add_stop(to, None).unwrap();
        car.advance().unwrap();
        car
    }

    fn old_request(floor: Floor, direction: Direction) -> Request {
        let pressed = Instant::now()
            .checked_sub(Duration::from_millis(50))
            .unwrap_or_else(Instant::now);
        Request::hall(floor, direction).unwrap().with_created_at(pressed)
    }

    #[test]
    fn test_nearest_picks_closest_car() {
        // Purpose: Cars at 2 and 18, hall call at 3 going up, the car at 2 is chosen

        // Arrange
        let cars = [setup_car(0, 18), setup_car(1, 2)];
        let views: Vec<&Car> = cars.iter().collect();

        // Act
        let chosen = NearestCarStrategy.select_car(&Request::hall(3, Direction::Up).unwrap(), &views);

        // Assert
        assert_eq!(chosen.unwrap(), 1);
    }

    #[test]
    fn test_nearest_breaks_ties_by_lowest_id() {
        // Purpose: Equal cost goes to the lowest car id

        // Arrange
        let cars = [setup_car(0, 4), setup_car(1, 2)];
        let views: Vec<&Car> = cars.iter().collect();

        // Act
        let chosen = NearestCarStrategy.select_car(&Request::hall(3, Direction::Down).unwrap(), &views);

        // Assert
        assert_eq!(chosen.unwrap(), 0);
    }

    #[test]
    fn test_nearest_prefers_car_heading_toward_call() {
        // Purpose: A car sweeping toward the call beats an idle car, but not one it must turn around for

        // Arrange
        let cars = [setup_moving_up(0, 5, 15), setup_car(1, 3)];
        let views: Vec<&Car> = cars.iter().collect();

        // Act
        let ahead = NearestCarStrategy.select_car(&Request::hall(9, Direction::Up).unwrap(), &views);
        let behind = NearestCarStrategy.select_car(&Request::hall(4, Direction::Up).unwrap(), &views);

        // Assert
        assert_eq!(ahead.unwrap(), 0);
        assert_eq!(behind.unwrap(), 1);
    }

    #[test]
    fn test_nearest_skips_unavailable_cars() {
        // Purpose: Cars in maintenance or emergency never receive hall calls

        // Arrange
        let mut in_maintenance = setup_car(0, 3);
        in_maintenance.enter_maintenance().unwrap();
        let mut in_emergency = setup_car(1, 4);
        in_emergency.emergency_stop();
        let cars = [in_maintenance, in_emergency, setup_car(2, 15)];
        let views: Vec<&Car> = cars.iter().collect();

        // Act
        let chosen = NearestCarStrategy.select_car(&Request::hall(3, Direction::Up).unwrap(), &views);

        // Assert
        assert_eq!(chosen.unwrap(), 2);
    }

    #[test]
    fn test_nearest_no_available_car() {
        // Purpose: With every car out of service the strategy reports NoAvailableCar

        // Arrange
        let mut car = setup_car(0, 3);
        car.enter_maintenance().unwrap();
        let views = vec![&car];

        // Act
        let chosen = NearestCarStrategy.select_car(&Request::hall(3, Direction::Up).unwrap(), &views);

        // Assert
        assert!(matches!(chosen, Err(Error::NoAvailableCar)));
    }

    #[test]
    fn test_round_robin_cycles() {
        // Purpose: Calls are handed out in car id order and wrap around

        // Arrange
        let strategy = RoundRobinStrategy::new();
        let cars = [setup_car(0, 0), setup_car(1, 10), setup_car(2, 20)];
        let views: Vec<&Car> = cars.iter().collect();
        let request = Request::hall(10, Direction::Up).unwrap();

        // Act
        let picks: Vec<CarId> = (0..4)
            .map(|_| strategy.select_car(&request, &views).unwrap())
            .collect();

        // Assert
        assert_eq!(picks, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_round_robin_skips_unavailable_cars() {
        // Purpose: The cursor steps over cars that are out of service

        // Arrange
        let strategy = RoundRobinStrategy::new();
        let mut in_maintenance = setup_car(1, 10);
        in_maintenance.enter_maintenance().unwrap();
        let cars = [setup_car(0, 0), in_maintenance, setup_car(2, 20)];
        let views: Vec<&Car> = cars.iter().collect();
        let request = Request::hall(10, Direction::Up).unwrap();

        // Act
        let picks: Vec<CarId> = (0..3)
            .map(|_| strategy.select_car(&request, &views).unwrap())
            .collect();

        // Assert
        assert_eq!(picks, vec![0, 2, 0]);
    }

    #[test]
    fn test_round_robin_no_available_car() {
        // Purpose: Round robin fails the same way as nearest when nothing is available

        // Arrange
        let strategy = RoundRobinStrategy::new();
        let mut car = setup_car(0, 3);
        car.emergency_stop();
        let views = vec![&car];

        // Act
        let chosen = strategy.select_car(&Request::hall(3, Direction::Up).unwrap(), &views);

        // Assert
        assert!(matches!(chosen, Err(Error::NoAvailableCar)));
    }

    #[test]
    fn test_round_robin_concurrent_callers_take_turns() {
        // Purpose: Callers on several threads never get the same turn twice

        // Arrange
        let strategy = RoundRobinStrategy::new();
        let cars = [setup_car(0, 0), setup_car(1, 10), setup_car(2, 20)];
        let request = Request::hall(10, Direction::Up).unwrap();

        // Act
        let picks: Vec<CarId> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        let views: Vec<&Car> = cars.iter().collect();
                        (0..30)
                            .map(|_| strategy.select_car(&request, &views).unwrap())
                            .collect::<Vec<CarId>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| handle.join().unwrap())
                .collect()
        });

        // Assert
        assert_eq!(picks.len(), 120);
        for car_id in 0..3 {
            assert_eq!(picks.iter().filter(|id| **id == car_id).count(), 40, "car {}", car_id);
        }
    }

    #[test]
    fn test_anti_starvation_fresh_request_uses_cost() {
        // Purpose: Below the age threshold the normal nearest-car ranking applies

        // Arrange
        let strategy = AntiStarvationStrategy::new(Duration::from_secs(60));
        let cars = [setup_moving_up(0, 5, 15), setup_car(1, 0)];
        let views: Vec<&Car> = cars.iter().collect();

        // Act
        let chosen = strategy.select_car(&Request::hall(8, Direction::Up).unwrap(), &views);

        // Assert
        assert_eq!(chosen.unwrap(), 0);
    }

    #[test]
    fn test_anti_starvation_old_request_goes_to_idle_car() {
        // Purpose: An old request is forced onto the nearest idle car even though it costs more

        // Arrange
        let strategy = AntiStarvationStrategy::new(Duration::from_millis(5));
        let cars = [setup_moving_up(0, 5, 15), setup_car(1, 0), setup_car(2, 20)];
        let views: Vec<&Car> = cars.iter().collect();

        // Act
        let chosen = strategy.select_car(&old_request(8, Direction::Up), &views);

        // Assert
        assert_eq!(chosen.unwrap(), 1);
    }

    #[test]
    fn test_anti_starvation_falls_back_without_idle_car() {
        // Purpose: With no idle car available an old request is ranked normally

        // Arrange
        let strategy = AntiStarvationStrategy::new(Duration::from_millis(5));
        let mut idle_but_broken = setup_car(2, 8);
        idle_but_broken.enter_maintenance().unwrap();
        let cars = [
            setup_moving_up(0, 5, 15),
            setup_moving_up(1, 0, 20),
            idle_but_broken,
        ];
        let views: Vec<&Car> = cars.iter().collect();

        // Act
        let chosen = strategy.select_car(&old_request(8, Direction::Up), &views);

        // Assert
        assert_eq!(chosen.unwrap(), 0);
    }

    #[test]
    fn test_zone_bands() {
        // Purpose: Floors are split into contiguous bands covering the building

        // Arrange + Act
        let strategy = ZoneStrategy::new(Building::new(0, 9), 3);

        // Assert
        assert_eq!(strategy.zone_of(0), Some(&(0..=3)));
        assert_eq!(strategy.zone_of(1), Some(&(4..=7)));
        assert_eq!(strategy.zone_of(2), Some(&(8..=9)));
        assert_eq!(strategy.zone_of(3), None);
    }

    #[test]
    fn test_zone_bands_huge_building() {
        // Purpose: Band limits are computed without overflowing on a very tall building

        // Arrange + Act
        let strategy = ZoneStrategy::new(Building::new(-2_000_000_000, 2_000_000_000), 2);

        // Assert
        assert_eq!(strategy.zone_of(0), Some(&(-2_000_000_000..=0)));
        assert_eq!(strategy.zone_of(1), Some(&(1..=2_000_000_000)));
    }

    #[test]
    fn test_zone_prefers_car_owning_the_floor() {
        // Purpose: The car whose band holds the floor wins over a closer car from another band

        // Arrange
        let strategy = ZoneStrategy::new(Building::new(0, 9), 2);
        let cars = [setup_car(0, 4), setup_car(1, 9)];
        let views: Vec<&Car> = cars.iter().collect();

        // Act
        let chosen = strategy.select_car(&Request::hall(5, Direction::Up).unwrap(), &views);

        // Assert
        assert_eq!(chosen.unwrap(), 1);
    }

    #[test]
    fn test_zone_falls_back_to_nearest() {
        // Purpose: When the owning car is out of service the nearest available car takes the call

        // Arrange
        let strategy = ZoneStrategy::new(Building::new(0, 9), 2);
        let mut owner = setup_car(1, 9);
        owner.enter_maintenance().unwrap();
        let cars = [setup_car(0, 4), owner];
        let views: Vec<&Car> = cars.iter().collect();

        // Act
        let chosen = strategy.select_car(&Request::hall(5, Direction::Up).unwrap(), &views);

        // Assert
        assert_eq!(chosen.unwrap(), 0);
    }

    #[test]
    fn test_build_strategy_by_kind() {
        // Purpose: Every strategy kind parses from its name and builds the matching strategy

        // Arrange
        let settings = DispatchConfig::default();
        let building = Building::new(0, 9);

        for name in ["nearest", "round_robin", "anti_starvation", "zone"] {
            // Act
            let kind: StrategyKind = name.parse().unwrap();
            let strategy = build_strategy(kind, &settings, building, 3);

            // Assert
            assert_eq!(strategy.name(), name);
        }
        assert!(matches!("scan".parse::<StrategyKind>(), Err(Error::InvalidCommand(_))));
    }
}
