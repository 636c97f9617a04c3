//! Typed ID aliases for all domain entities.

pub use super::id::Id;

/// Marker type for Job entities (job postings).
pub struct Job;

/// Marker type for Company entities.
pub struct Company;

/// Marker type for Tag entities.
pub struct Tag;

/// Marker type for JobMetadata entries.
pub struct JobMetadata;

/// Marker type for JobSource provenance records.
pub struct JobSource;

/// Marker type for push notification Subscriptions.
pub struct Subscription;

/// Typed ID for Job entities.
pub type JobId = Id<Job>;

/// Typed ID for Company entities.
pub type CompanyId = Id<Company>;

/// Typed ID for Tag entities.
pub type TagId = Id<Tag>;

/// Typed ID for JobMetadata entries.
pub type JobMetadataId = Id<JobMetadata>;

/// Typed ID for JobSource records.
pub type JobSourceId = Id<JobSource>;

/// Typed ID for Subscriptions.
pub type SubscriptionId = Id<Subscription>;
