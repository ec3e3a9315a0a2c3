// drp-domain library entry point
pub mod data_id;
pub mod dimension;
pub mod error;
pub mod ids;
pub mod repo_handle;
pub use data_id::DataId;
pub use dimension::Dimension;
pub use error::DomainError;
pub use ids::{FilterId, PatchId, RaftId, TractId, VisitId};
pub use repo_handle::{RepoHandle, DEFAULT_MAPPER};
