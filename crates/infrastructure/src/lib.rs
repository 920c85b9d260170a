//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod gateway_bridge_session;
mod in_memory_protection_repository;
mod postgres_grant_repository;
mod postgres_role_repository;
mod tracing_failure_sink;

pub use gateway_bridge_session::{GatewayBridgeConfig, GatewayBridgeSession};
pub use in_memory_protection_repository::InMemoryProtectionRepository;
pub use postgres_grant_repository::PostgresGrantRepository;
pub use postgres_role_repository::PostgresRoleRepository;
pub use tracing_failure_sink::TracingFailureSink;
