//! Core domain layer. No external I/O dependencies.
//!
//! Entities, the status envelope and period arithmetic live here. Dependencies flow inward.

pub mod data_status;
pub mod entities;
pub mod errors;
pub mod period;

pub use data_status::{DataStatus, Status};
pub use entities::{
    CategoryModel, Entity, EventModel, NewCategory, NewParticipant, ParticipantModel, Role,
    SavedWorkspace, TenantModel,
};
pub use errors::DomainError;
pub use period::{Period, PeriodDuration, duration_minutes, minutes_after};
