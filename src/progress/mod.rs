// Pure progress logic: ordering, aggregation, cross-user comparison,
// editing and reminders. Nothing in here touches the filesystem.
pub mod edit;
pub mod notifications;
pub mod shared;
pub mod sorting;
pub mod stats;
