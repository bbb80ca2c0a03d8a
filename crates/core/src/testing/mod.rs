//! Mock implementations of the external-service seams, for tests.
//!
//! Each mock records the calls it receives and supports one-shot error
//! injection, so submission flows can be exercised without any network.

mod mock_auth;
mod mock_automation;
mod mock_docs;
mod mock_storage;

pub use mock_auth::{MockServiceAuth, MockUserTokenStore};
pub use mock_automation::{MockAutomationService, RecordedUpload};
pub use mock_docs::MockDocumentService;
pub use mock_storage::MockResultStore;
