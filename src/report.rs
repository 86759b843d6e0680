use std::fmt;

use serde::Serialize;

/// Substring marking the placeholder address left in the report template
/// (`YOUR NAME <your@email.address>`) when no real `@author` tag was written.
pub const BOGUS_EMAIL_MARKER: &str = "address";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PassFail {
    Pass,
    Fail,
    #[default]
    Unknown,
}

impl fmt::Display for PassFail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PassFail::Pass => "PASS",
            PassFail::Fail => "FAIL",
            PassFail::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Everything pulled out of one `report.html`. Built once, read-only after.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedReport {
    pub identity_name: Option<String>,
    pub identity_email: Option<String>,
    pub project_id: Option<String>,
    pub pass_fail: PassFail,
    pub score_text: Option<String>,
    pub code_listings: Vec<String>,
    pub error_lines: Vec<String>,
    pub is_signed: bool,
}

/// A recipient that passed [`ExtractedReport::identity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    MissingName,
    MissingEmail,
    BogusEmail,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectionReason::MissingName => "no @author name",
            RejectionReason::MissingEmail => "no @author e-mail address",
            RejectionReason::BogusEmail => "placeholder e-mail address",
        };
        f.write_str(s)
    }
}

/// Why a report cannot be mailed back to its author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRejection {
    pub name: Option<String>,
    pub email: Option<String>,
    pub reason: RejectionReason,
}

impl fmt::Display for IdentityRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' <{}> not a valid e-mail address ({})",
            self.name.as_deref().unwrap_or(""),
            self.email.as_deref().unwrap_or(""),
            self.reason
        )
    }
}

impl ExtractedReport {
    /// Usable recipient, or the reason there is none.
    pub fn identity(&self) -> Result<Identity<'_>, IdentityRejection> {
        let reject = |reason| IdentityRejection {
            name: self.identity_name.clone(),
            email: self.identity_email.clone(),
            reason,
        };
        let email = match self.identity_email.as_deref() {
            Some(e) if !e.is_empty() => e,
            _ => return Err(reject(RejectionReason::MissingEmail)),
        };
        if is_bogus_email(email) {
            return Err(reject(RejectionReason::BogusEmail));
        }
        let name = match self.identity_name.as_deref() {
            Some(n) if !n.is_empty() => n,
            _ => return Err(reject(RejectionReason::MissingName)),
        };
        Ok(Identity { name, email })
    }

    pub fn score_display(&self) -> &str {
        self.score_text.as_deref().unwrap_or("?")
    }

    pub fn project_display(&self) -> &str {
        self.project_id.as_deref().unwrap_or("?")
    }
}

pub fn is_bogus_email(email: &str) -> bool {
    email.contains(BOGUS_EMAIL_MARKER)
}
