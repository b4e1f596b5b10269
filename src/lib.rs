// Library surface for headless/integration tests and reuse.
// The binary in main.rs is a thin terminal shell over these modules.
pub mod config;
pub mod game;
pub mod inventory;
pub mod matcher;
pub mod penalty;
pub mod runtime;
pub mod sequence;
pub mod snapshot;
pub mod ui;
