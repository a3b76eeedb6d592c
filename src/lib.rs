pub mod api;
pub mod config;
pub mod debounce;
pub mod error;
pub mod filters;
pub mod models;
pub mod store;
pub mod validate;

pub use api::{HttpJobRepository, JobRepository};
pub use error::RepositoryError;
pub use filters::{FilterCriteria, FilterUpdate, JobCounts, SortKey};
pub use models::{JobApplication, JobStatus, JobUpdate, NewJobApplication};
pub use store::JobStore;
