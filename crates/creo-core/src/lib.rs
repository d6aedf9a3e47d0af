mod error;
mod payload;
mod record;
mod store;

pub use error::RecordError;
pub use payload::PayloadKind;
pub use record::{BaseDirectory, PackageRecord};
pub use store::{MergeOutcome, VersionStore};

#[cfg(test)]
mod tests;
