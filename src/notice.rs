//! Admin Notices - Surfacing Rejections to the Editor
//!
//! The rejection reason travels from the save request to the next
//! editor screen through the redirect query string, never through
//! shared state.

use serde::Serialize;
use url::form_urlencoded;

use crate::guard::RejectionReason;
use crate::policy::SizePolicy;

/// Query parameter carrying the rejection reason code
pub const NOTICE_QUERY_VAR: &str = "force-featured-image";

/// Host message id for "post saved as draft"
pub const DRAFT_SAVED_MESSAGE: &str = "10";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminNotice {
    pub reason: RejectionReason,
    /// Short form, e.g. "doesn't have a featured image"
    pub summary: String,
    /// Full editor sentence, inline markup included
    pub message: String,
}

impl AdminNotice {
    /// `policy` supplies the dimensions quoted by a wrong-size notice
    pub fn new(reason: RejectionReason, policy: Option<&SizePolicy>) -> Self {
        let (width, height) = policy
            .map(|p| (p.min_width(), p.min_height()))
            .unwrap_or((0, 0));

        let (summary, message) = match reason {
            RejectionReason::NoImage => (
                "doesn't have a featured image".to_string(),
                "This post <strong>doesn't have a featured image</strong>. \
                 Please add an image before publishing."
                    .to_string(),
            ),
            RejectionReason::WrongSize => (
                format!("doesn't respect the image dimension: {width}px × {height}px"),
                format!(
                    "This post <strong>featured image doesn't respect the image dimension</strong>. \
                     Please add an image with the following dimension : \
                     <strong>{width}px × {height}px</strong>"
                ),
            ),
        };

        Self { reason, summary, message }
    }

    pub fn to_html(&self) -> String {
        format!("<div class=\"error\">\n\t<p>{}</p>\n</div>\n", self.message)
    }
}

/// Set the reason code on the host's post-save redirect target,
/// replacing any code or message id already in the query
pub fn redirect_location(location: &str, reason: RejectionReason) -> String {
    let (base, fragment) = match location.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (location, None),
    };
    let (path, existing) = base.split_once('?').unwrap_or((base, ""));

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(
            form_urlencoded::parse(existing.as_bytes())
                .filter(|(key, _)| key != NOTICE_QUERY_VAR && key != "message"),
        )
        .append_pair(NOTICE_QUERY_VAR, reason.as_code())
        .append_pair("message", DRAFT_SAVED_MESSAGE)
        .finish();

    let mut out = format!("{path}?{query}");
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}

/// Read a carried reason back out of a query string (leading `?` optional).
/// The last occurrence wins.
pub fn reason_from_query(query: &str) -> Option<RejectionReason> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let code = form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == NOTICE_QUERY_VAR)
        .last()
        .map(|(_, value)| value.into_owned())?;

    let reason = RejectionReason::from_code(&code);
    if reason.is_none() {
        tracing::warn!(%code, "ignoring unknown featured image notice code");
    }
    reason
}
