use serde::{Deserialize, Serialize};

/// Name of the tab a store creates in every new workbook.
pub const DEFAULT_TAB: &str = "Sheet1";

/// Handle to a remote workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workbook {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
}

/// Listing entry for a workbook owned by or shared with the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkbookInfo {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub modified: Option<String>,
}

/// Access level granted when sharing a workbook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareRole {
    Reader,
    Commenter,
    #[default]
    Writer,
}

impl ShareRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ShareRole::Reader => "reader",
            ShareRole::Commenter => "commenter",
            ShareRole::Writer => "writer",
        }
    }
}

/// Who to share a workbook with and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub email: String,
    pub role: ShareRole,
    /// Whether the store should email the recipient.
    pub notify: bool,
    pub message: Option<String>,
}

impl ShareRequest {
    /// Writer access with a notification, as used when provisioning.
    pub fn writer(email: impl Into<String>) -> Self {
        ShareRequest {
            email: email.into(),
            role: ShareRole::Writer,
            notify: true,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
