//! Command argument structures, grouped by concern

pub mod core;
pub mod meta;

pub use self::core::{AutoPromoteArgs, ProcessInboxArgs, ProcessNoteArgs, PromoteArgs, RepairArgs};
pub use self::meta::StatusArgs;
