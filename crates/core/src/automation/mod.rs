//! Design Automation service abstraction.
//!
//! This module provides an `AutomationService` trait covering the remote
//! registry (app bundles, activities, aliases) and the execution engine
//! (work items), plus the Forge v3 implementation.

mod forge;
mod types;

pub use forge::ForgeAutomationClient;
pub use types::*;
