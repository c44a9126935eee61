//! REST adapters for the remote event-board API.

pub mod category;
pub mod client;
pub mod dto;
pub mod event;
pub mod participant;
pub mod tenant;

pub use category::HttpCategoryApi;
pub use client::ApiClient;
pub use event::HttpEventApi;
pub use participant::HttpParticipantApi;
pub use tenant::HttpTenantApi;
