//! Publish Gate - Host Lifecycle Adapter
//!
//! The host calls in at three points: bootstrap, before a save that
//! would publish, and when rendering the editor screen. Every answer is
//! an instruction for the host to apply; this module performs no I/O.

use serde::{Deserialize, Serialize};

use crate::guard::{PublicationGuard, RejectionReason};
use crate::metadata::ImageMetadata;
use crate::notice::{redirect_location, AdminNotice};
use crate::policy::{PolicyError, PolicyTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostStatus {
    #[serde(rename = "draft")]
    Draft,
    #[serde(rename = "pending")]
    PendingPublish,
    #[serde(rename = "publish")]
    Published,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::PendingPublish => "pending",
            PostStatus::Published => "publish",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub post_type: String,
    pub status: PostStatus,
}

/// Outcome of a save: the status the host must store, and the reason
/// to carry to the next editor screen when publishing was denied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub status: PostStatus,
    pub rejection: Option<RejectionReason>,
}

impl Decision {
    fn pass_through(status: PostStatus) -> Self {
        Self { status, rejection: None }
    }

    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }

    /// Redirect target after the save, with the reason attached if any
    pub fn redirect(&self, location: &str) -> String {
        match self.rejection {
            Some(reason) => redirect_location(location, reason),
            None => location.to_string(),
        }
    }
}

pub struct PublishGate {
    guard: PublicationGuard,
}

impl PublishGate {
    /// Build the policy table through the host's configuration callback.
    /// A table left empty yields an inert gate.
    pub fn on_bootstrap<F>(configure: F) -> Result<Self, PolicyError>
    where
        F: FnOnce(&mut PolicyTable) -> Result<(), PolicyError>,
    {
        let mut table = PolicyTable::new();
        configure(&mut table)?;

        if table.is_empty() {
            tracing::debug!("no forced post types configured, publish gate inert");
        }
        Ok(Self::new(PublicationGuard::new(table)))
    }

    pub fn new(guard: PublicationGuard) -> Self {
        Self { guard }
    }

    pub fn guard(&self) -> &PublicationGuard {
        &self.guard
    }

    pub fn is_inert(&self) -> bool {
        !self.guard.is_active()
    }

    /// Gate a save. Only a transition to `Published` is evaluated; a
    /// denied publish is stored as `Draft`.
    pub fn on_before_publish(
        &self,
        post: &Post,
        requested: PostStatus,
        image: Option<&ImageMetadata>,
    ) -> Decision {
        if self.is_inert() || requested != PostStatus::Published {
            return Decision::pass_through(requested);
        }

        match self.guard.evaluate(&post.post_type, image).rejection_reason() {
            Some(reason) => {
                tracing::info!(
                    post_id = post.id,
                    post_type = %post.post_type,
                    %reason,
                    "publish denied, reverting to draft"
                );
                Decision {
                    status: PostStatus::Draft,
                    rejection: Some(reason),
                }
            }
            None => Decision::pass_through(requested),
        }
    }

    /// The featured image was removed or replaced from the editor.
    /// Returns the status to force when the post no longer qualifies.
    pub fn on_featured_image_changed(
        &self,
        post: &Post,
        image: Option<&ImageMetadata>,
    ) -> Option<PostStatus> {
        if self.is_inert() || post.status == PostStatus::Draft {
            return None;
        }

        let reason = self.guard.evaluate(&post.post_type, image).rejection_reason()?;
        tracing::info!(post_id = post.id, %reason, "featured image no longer qualifies, forcing draft");
        Some(PostStatus::Draft)
    }

    /// Notice for the editor screen. A reason carried by the redirect
    /// wins; otherwise, on the post editor, the post is evaluated as-is.
    pub fn on_render_admin_notice(
        &self,
        post: &Post,
        carried: Option<RejectionReason>,
        on_editor_screen: bool,
        image: Option<&ImageMetadata>,
    ) -> Option<AdminNotice> {
        if self.is_inert() {
            return None;
        }

        let reason = match carried {
            Some(reason) => reason,
            None if on_editor_screen => self.guard.evaluate(&post.post_type, image).rejection_reason()?,
            None => return None,
        };

        Some(AdminNotice::new(reason, self.guard.policies().get(&post.post_type)))
    }
}
