//! # Referral Types Crate
//!
//! Cross-crate type definitions for the referral engine: member and edge
//! identifiers, timestamps, and the ordered role ladder.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All types shared between the engine and the
//!   event bus are defined here.
//! - **Opaque Identifiers**: Member and edge ids are UUID newtypes; nothing
//!   in the engine derives meaning from their bytes.

pub mod ids;
pub mod roles;

pub use ids::{EdgeId, MemberId, Timestamp};
pub use roles::{PromotionTable, Role, RoleThreshold};
