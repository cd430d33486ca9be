#![forbid(unsafe_code)]
//! Core of an off-main-thread DOM emulation: a synthetic node tree whose
//! structural edits are captured as immutable mutation records and delivered
//! to registered observers in batches at an explicit microtask checkpoint.
//! Rendering, attribute and text observation, and the channel relaying records
//! to a privileged host context are external collaborators that consume the
//! types defined here.

pub mod error;
pub mod ids;
pub mod observer;
pub mod record;
pub mod scheduler;
pub mod tree;

pub use error::{Error, Result};
pub use ids::{NodeId, ObserverId};
pub use observer::{MutationCallback, ObserverHandle};
pub use record::{MutationRecord, MutationRecordType};
pub use scheduler::{Microtask, MicrotaskQueue};
pub use tree::Document;
