/***************************************/
/*        3rd party libraries          */
/***************************************/
use log::info;
use std::str::FromStr;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::DispatchConfig;
use crate::coordinator::ElevatorSystem;
use crate::dispatch::{build_strategy, StrategyKind};
use crate::errors::{Error, Result};
use crate::shared::{CarId, CarStatus, Direction, Floor};

/***************************************/
/*       Public data structures        */
/***************************************/

/// One line of operator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Hall(Floor, Direction),
    Car(CarId, Floor),
    Emergency(CarId),
    Resume(CarId),
    Maintenance(CarId, bool),
    Obstruct(CarId, bool),
    Load(CarId, u32, u32),
    Strategy(StrategyKind),
    Status,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Dispatched(CarId),
    Done,
    Status(Vec<CarStatus>),
    Quit,
}

/***************************************/
/*              Parsing                */
/***************************************/
impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();

        let command = match words.as_slice() {
            ["hall", floor, dirn] => Command::Hall(number(floor)?, direction(dirn)?),
            ["car", id, floor] => Command::Car(number(id)?, number(floor)?),
            ["emergency", id] => Command::Emergency(number(id)?),
            ["resume", id] => Command::Resume(number(id)?),
            ["maintenance", id, flag] => Command::Maintenance(number(id)?, switch(flag)?),
            ["obstruct", id, flag] => Command::Obstruct(number(id)?, switch(flag)?),
            ["load", id, passengers, kg] => {
                Command::Load(number(id)?, number(passengers)?, number(kg)?)
            }
            ["strategy", kind] => Command::Strategy(kind.parse()?),
            ["status"] => Command::Status,
            ["quit"] | ["exit"] => Command::Quit,
            _ => return Err(Error::InvalidCommand(line.trim().to_string())),
        };
        Ok(command)
    }
}

fn number<T: FromStr>(word: &str) -> Result<T> {
    word.parse()
        .map_err(|_| Error::InvalidCommand(format!("'{}' is not a number", word)))
}

fn direction(word: &str) -> Result<Direction> {
    match word {
        "up" => Ok(Direction::Up),
        "down" => Ok(Direction::Down),
        other => Err(Error::InvalidCommand(format!("'{}' is not up or down", other))),
    }
}

fn switch(word: &str) -> Result<bool> {
    match word {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(Error::InvalidCommand(format!("'{}' is not on or off", other))),
    }
}

/***************************************/
/*             Public API              */
/***************************************/

/// Applies `command` to `system`. `settings` is used when a new strategy is built.
pub fn execute(system: &ElevatorSystem, command: &Command, settings: &DispatchConfig) -> Result<Reply> {
    match *command {
        Command::Hall(floor, dirn) => system.request_elevator(floor, dirn).map(Reply::Dispatched),
        Command::Car(car_id, floor) => system.select_floor(car_id, floor).map(|_| Reply::Done),
        Command::Emergency(car_id) => system.emergency_stop(car_id).map(|_| Reply::Done),
        Command::Resume(car_id) => system.resume(car_id).map(|_| Reply::Done),
        Command::Maintenance(car_id, on) => system.set_maintenance(car_id, on).map(|_| Reply::Done),
        Command::Obstruct(car_id, active) => {
            system.set_obstruction(car_id, active).map(|_| Reply::Done)
        }
        Command::Load(car_id, passengers, kg) => {
            system.set_load(car_id, passengers, kg).map(|_| Reply::Done)
        }
        Command::Strategy(kind) => {
            let strategy = build_strategy(kind, settings, system.building(), system.n_cars());
            system.set_strategy(strategy);
            Ok(Reply::Done)
        }
        Command::Status => Ok(Reply::Status(system.status())),
        Command::Quit => {
            info!("Quit requested after {} ticks", system.ticks());
            Ok(Reply::Quit)
        }
    }
}
