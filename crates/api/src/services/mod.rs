//! Helpers shared by several handler modules.
//!
//! - [`keys`] -- bring-your-own-key resolution and LLM provider selection.
//! - [`usage`] -- usage-event recording.
//! - [`audit`] -- admin audit-log writes.
//! - [`plan`] -- plan lookup for quota checks.

pub mod audit;
pub mod keys;
pub mod plan;
pub mod usage;
