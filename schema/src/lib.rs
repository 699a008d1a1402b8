// Battle Tower Schema - Shared type definitions
// Plain data shared by the progression engine and its front ends: roster
// entities as they appear in team definition sources, and player identities.

pub use identity::*;
pub use roster::*;

pub mod identity;
pub mod roster;
