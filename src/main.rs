/***************************************/
/*        3rd party libraries          */
/***************************************/
use clap::{Arg, Command as ClapCommand};
use crossbeam_channel as cbc;
use log::{error, info, warn};
use std::io::BufRead;
use std::thread::Builder;

/***************************************/
/*           Local modules             */
/***************************************/
use elevator_dispatch::config::load_config;
use elevator_dispatch::control::{execute, Command, Reply};
use elevator_dispatch::coordinator::ElevatorSystem;
use elevator_dispatch::unwrap_or_exit;

/***************************************/
/*                Main                 */
/***************************************/
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = ClapCommand::new("elevator-dispatch")
        .about("Simulates a bank of elevator cars driven by text commands on stdin")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .takes_value(true)
                .default_value("config.toml")
                .help("Path to the TOML configuration file"),
        )
        .arg(
            Arg::new("ticks")
                .long("ticks")
                .short('t')
                .takes_value(true)
                .default_value("0")
                .help("Stop after this many ticks, 0 runs until quit"),
        )
        .get_matches();

    let config_path = args.value_of("config").unwrap_or("config.toml");
    let max_ticks: u64 = unwrap_or_exit!(
        args.value_of("ticks").unwrap_or("0").parse::<u64>(),
        "Invalid --ticks value"
    );

    // Load the configuration and build the system
    let config = unwrap_or_exit!(load_config(config_path), "Failed to load configuration");
    let system = unwrap_or_exit!(ElevatorSystem::from_config(&config), "Failed to build elevator system");

    // Operator input
    let (command_tx, command_rx) = cbc::unbounded::<Command>();
    let input_thread = Builder::new().name("input".into());
    let _input_handle = unwrap_or_exit!(
        input_thread.spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        error!("Failed to read from stdin: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(command) => {
                        if command_tx.send(command).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("{}", e),
                }
            }
        }),
        "Failed to start input thread"
    );

    let ticker = cbc::tick(config.tick_period());
    info!(
        "Running with a {:?} tick, type 'quit' to stop",
        config.tick_period()
    );

    // Main loop
    let no_input = cbc::never::<Command>();
    let mut input_open = true;
    loop {
        cbc::select! {
            recv(if input_open { &command_rx } else { &no_input }) -> command => {
                match command {
                    Ok(command) => match execute(&system, &command, &config.dispatch) {
                        Ok(Reply::Dispatched(car_id)) => info!("Hall call assigned to car {}", car_id),
                        Ok(Reply::Done) => (),
                        Ok(Reply::Status(status)) => print_status(&status),
                        Ok(Reply::Quit) => break,
                        Err(e) => warn!("{:?} failed: {}", command, e),
                    },
                    // Stdin closed: run out the remaining ticks, if any
                    Err(_) => {
                        if max_ticks == 0 {
                            break;
                        }
                        input_open = false;
                    }
                }
            }
            recv(ticker) -> _ => {
                system.step();
                print_status(&system.status());
                if max_ticks != 0 && system.ticks() >= max_ticks {
                    break;
                }
            }
        }
    }

    info!("Stopped after {} ticks", system.ticks());
}

fn print_status(status: &[elevator_dispatch::CarStatus]) {
    match serde_json::to_string(status) {
        Ok(json) => println!("{}", json),
        Err(e) => error!("Failed to serialize status: {}", e),
    }
}
