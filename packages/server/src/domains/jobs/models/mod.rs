pub mod company;
pub mod job;
pub mod job_metadata;
pub mod job_source;
pub mod tag;

pub use company::Company;
pub use job::{Job, JobUpsert};
pub use job_metadata::JobMetadata;
pub use job_source::JobSource;
pub use tag::Tag;
