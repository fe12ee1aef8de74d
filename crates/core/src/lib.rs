//! `fitclub-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod account;
pub mod entity;
pub mod error;
pub mod id;
pub mod validation;

pub use account::AccountProfile;
pub use entity::{Entity, sort_newest_first};
pub use error::DomainError;
pub use id::{MemberId, MembershipId, TrainerId, UserId};
pub use validation::FieldErrors;
