//! Featured Image Guard - Publication Gate
//!
//! Posts of configured content types cannot be published without a
//! featured image that meets the type's policy.
//!
//! # Rules
//! 1. Forced types are exactly the keys of the policy table
//! 2. No image means `no-image`
//! 3. An image that neither matches the policy fields nor clears the
//!    minimum width and height means `wrong-size`
//! 4. Rejection is an outcome, not an error
//! 5. The rejection reason travels with the request, never in globals

pub mod guard;
pub mod lifecycle;
pub mod metadata;
pub mod notice;
pub mod policy;

pub use guard::{image_satisfies_policy, EvaluationResult, PublicationGuard, RejectionReason};
pub use lifecycle::{Decision, Post, PostStatus, PublishGate};
pub use metadata::ImageMetadata;
pub use notice::{reason_from_query, redirect_location, AdminNotice, NOTICE_QUERY_VAR};
pub use policy::{PolicyError, PolicyTable, PostType, SizePolicy};

pub const GUARD_VERSION: &str = env!("CARGO_PKG_VERSION");
