//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod event;
mod grant;
mod identifiers;
mod membership;
mod role;

pub use event::PlatformEvent;
pub use grant::AuthorizationGrant;
pub use identifiers::{CommunityId, IDENTIFIER_MAX_LENGTH, RoleId, UserId};
pub use membership::{CommunitySnapshot, MemberSnapshot, MembersChunk};
pub use role::{ProtectedRole, RoleObservation};
