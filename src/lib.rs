// Library exports for the seeker/pursuer game
// The binary and the integration tests drive the game through these modules

pub mod board;
pub mod config;
pub mod game;
pub mod layout;
pub mod policy;
pub mod search;
pub mod turn_logger;
pub mod types;
