pub mod engine;
pub mod game;
pub mod lobby;
pub mod network;
