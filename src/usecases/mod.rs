//! Application use cases. Stores and services orchestrating domain logic via ports.

pub mod app_context;
pub mod chart_builder;
pub mod entity_store;
pub mod tenant_store;
pub mod token_store;
pub mod view;

pub use app_context::{AppContext, Backends};
pub use chart_builder::{ChartBuilder, ChartCell, ChartData, ChartFamily, ChartParams, ChartSubtype};
pub use entity_store::{CategoryStore, EntityStore, EventStore, ParticipantStore, RemovePolicy};
pub use tenant_store::TenantStore;
pub use token_store::TokenStore;
pub use view::{Pending, View};
