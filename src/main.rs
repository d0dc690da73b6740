use std::env;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info};

use arcade_physics_server::net::start_websocket_server;
use arcade_physics_server::physics::PhysicsWorld;
use arcade_physics_server::state::SharedGameState;
use arcade_physics_server::{CarController, CarTuning, ConfigError};

const DEFAULT_ADDR: &str = "0.0.0.0:9001";
const TICK_DT: f32 = 1.0 / 60.0;

fn load_tuning() -> Result<CarTuning, ConfigError> {
    match env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading car tuning");
            CarTuning::load(path)
        }
        None => {
            let tuning = CarTuning::default();
            tuning.validate()?;
            Ok(tuning)
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arcade_physics_server=info".into()),
        )
        .init();

    info!("starting arcade physics server");

    let mut car = match load_tuning().and_then(CarController::new) {
        Ok(car) => car,
        Err(err) => {
            error!(%err, "invalid car tuning");
            std::process::exit(1);
        }
    };

    let addr = env::var("ARCADE_SERVER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let state = Arc::new(Mutex::new(SharedGameState::new()));
    let physics = Arc::new(Mutex::new(PhysicsWorld::new(true)));

    // Start WebSocket server
    let server_state = Arc::clone(&state);
    tokio::spawn(async move {
        if let Err(err) = start_websocket_server(addr, server_state).await {
            error!(%err, "websocket server stopped");
        }
    });

    // Fixed timestep: ~60 Hz
    let mut ticker = interval(Duration::from_secs_f32(TICK_DT));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let mut phys = physics.lock().await;
        let mut game = state.lock().await;

        phys.begin_tick();

        // 1) inputs, 2) car forces, 3) integrate
        {
            let events = game.drain_input();
            let mut port = phys.car();
            for event in events {
                car.handle_input(event, &mut port, &mut game.effects);
            }
            let report = car.tick(TICK_DT, &mut port, &mut game.effects);
            if report.entered_air || report.landed {
                info!(tick = game.tick, airborne = car.is_airborne(), "air state changed");
            }
        }
        phys.step(TICK_DT);

        // Advance tick + broadcast snapshot
        game.tick += 1;
        game.broadcast_snapshot(&car, &phys);
    }
}
