//! Club domain module (trainers, members and membership subscriptions).
//!
//! This crate holds the records, their tag enums and the rules for applying
//! write payloads, implemented purely as deterministic domain logic (no IO,
//! no HTTP, no storage).

pub mod input;
pub mod member;
pub mod membership;
pub mod trainer;

pub use input::WriteMode;
pub use member::{Member, MemberFields, MemberInput};
pub use membership::{
    Membership, MembershipFields, MembershipFilter, MembershipInput, MembershipStatus,
    MembershipType, validate_price,
};
pub use trainer::{Trainer, TrainerFields, TrainerFilter, TrainerInput};
