//! Bug report snapshot and the mutation surface of the issue tracker.
//!
//! The tracker itself (REST client, persistence) lives outside this crate.
//! A `BugReport` is a read-only snapshot handed to one analysis run and a
//! `ReportMutator` is the set of side-effect callbacks the run may invoke.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::io::Cursor;
use std::path::Path;

/// Status value of a report that has not been reopened.
pub const STATUS_OPEN: &str = "Open";

/// Confirmation status value equivalent to "not set".
pub const CONFIRMATION_UNCONFIRMED: &str = "Unconfirmed";

/// A file attached to a report.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    pub content: Bytes,
}

impl Attachment {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        created_at: DateTime<Utc>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            created_at,
            content: content.into(),
        }
    }

    /// Opens the attachment content for reading.
    pub fn open(&self) -> Cursor<Bytes> {
        Cursor::new(self.content.clone())
    }

    /// The literal suffix after the last `.` in the name, if any.
    pub fn extension(&self) -> Option<&str> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }
}

/// A link from a report to another ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueLink {
    pub link_type: String,
    pub outward: bool,
    pub target_key: String,
}

/// Snapshot of the report fields the crash engine reads.
#[derive(Debug, Clone, PartialEq)]
pub struct BugReport {
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub description: Option<String>,
    pub attachments: Vec<Attachment>,
    pub status: String,
    pub confirmation_status: Option<String>,
    pub priority: Option<String>,
    pub resolution: Option<String>,
    pub links: Vec<IssueLink>,
}

impl BugReport {
    /// Creates an open, unconfirmed report without content.
    pub fn new(key: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            created_at,
            description: None,
            attachments: Vec::new(),
            status: STATUS_OPEN.to_string(),
            confirmation_status: None,
            priority: None,
            resolution: None,
            links: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_confirmation_status(mut self, status: impl Into<String>) -> Self {
        self.confirmation_status = Some(status.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_resolution(mut self, resolution: impl Into<String>) -> Self {
        self.resolution = Some(resolution.into());
        self
    }

    pub fn with_link(mut self, link: IssueLink) -> Self {
        self.links.push(link);
        self
    }

    /// True when no confirmation status is set or it is "Unconfirmed".
    pub fn is_unconfirmed(&self) -> bool {
        self.confirmation_status
            .as_deref()
            .map_or(true, |status| status == CONFIRMATION_UNCONFIRMED)
    }

    pub fn has_attachment_named(&self, name: &str) -> bool {
        self.attachments.iter().any(|a| a.name == name)
    }

    pub fn has_outward_link(&self, link_type: &str, target_key: &str) -> bool {
        self.links
            .iter()
            .any(|l| l.outward && l.link_type == link_type && l.target_key == target_key)
    }
}

/// A comment rendered from a named template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentOptions {
    pub template: String,
    pub params: Vec<String>,
}

impl CommentOptions {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.params.push(param.into());
        self
    }
}

/// Called by the tracker once an attachment upload has completed.
pub type UploadCallback = Box<dyn FnOnce() + Send>;

/// Side effects on a report. Each call either succeeds or returns the
/// underlying cause of the failure.
pub trait ReportMutator {
    fn add_comment(&mut self, comment: &CommentOptions) -> anyhow::Result<()>;
    fn create_link(&mut self, link_type: &str, target_key: &str) -> anyhow::Result<()>;
    fn resolve_as_duplicate(&mut self) -> anyhow::Result<()>;
    fn resolve_as_invalid(&mut self) -> anyhow::Result<()>;
    fn resolve_as_awaiting_response(&mut self) -> anyhow::Result<()>;
    fn update_description(&mut self, description: &str) -> anyhow::Result<()>;
    /// Uploads the file at `path`. `on_uploaded` must be invoked after a
    /// successful upload; it is dropped otherwise.
    fn add_attachment(&mut self, path: &Path, on_uploaded: UploadCallback) -> anyhow::Result<()>;
}
