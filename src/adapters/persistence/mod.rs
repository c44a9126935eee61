//! Local persistence adapters.

pub mod workspace_json;

pub use workspace_json::WorkspaceJson;
