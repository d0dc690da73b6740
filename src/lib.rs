//! Headless arcade car server: the `arcade_car` vehicle model plus a rapier
//! world and a websocket front end that host one car.

pub mod arcade_car;
pub mod car;
pub mod config;
pub mod debug_builders;
pub mod error;
pub mod net;
pub mod physics;
pub mod state;

pub use car::CarController;
pub use config::CarTuning;
pub use error::ConfigError;
