//! Domain models for SpecTree.
//!
//! # Core Concepts
//!
//! ## Work hierarchy
//!
//! - [`Epic`]: Top-level container of work, resolved by id or unique name.
//! - [`Feature`]: A work item inside an epic. Features own tasks.
//! - [`Task`]: The smallest work item, nested under a feature.
//! - [`WorkItem`]: The scheduling view shared by features and tasks.
//!
//! ## Execution
//!
//! - [`Phase`]: A batch of work items that are ready to run together.
//! - [`Session`]: One bounded period of agent work against an epic. At most one
//!   session per epic is active at a time.
//! - [`EpicProgress`]: Completion counts derived from item status categories.

mod epic;
mod plan;
mod progress;
mod session;
mod work_item;

pub use epic::*;
pub use plan::*;
pub use progress::*;
pub use session::*;
pub use work_item::*;
