mod database;
mod engine;

pub use database::connect_and_migrate;
pub use engine::{ProtectionEngine, start_protection_engine};
