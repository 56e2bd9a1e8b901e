use std::process::ExitCode;

use gravsaver::{Config, Simulation, SimulationError, WindowFrontend};

fn run() -> Result<(), SimulationError> {
    let config = Config::load_default();
    let frontend = WindowFrontend::open(config.particles)?;

    let mut simulation = Simulation::new(config, frontend);
    simulation.run()
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
