//! Conversion job submission.
//!
//! `ConversionJobSubmitter` drives one job end to end: it makes sure the
//! conversion app bundle and activity are registered with Design Automation,
//! builds the download/upload/callback URL descriptors and submits the work
//! item. All remote collaborators are reached through trait seams so the
//! whole flow is testable offline.

mod error;
mod job;

pub use error::{SubmitError, SubmitErrorKind};
pub use job::{
    qualified_name, ConversionJobSubmitter, ACTIVITY_NAME, ALIAS, APP_NAME, BUNDLE_ARCHIVE_NAME,
    ENGINE, OUTPUT_FILENAME,
};
