use std::path::Path;

use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::Transport as _;
use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::notify::NotificationContent;
use crate::report::{ExtractedReport, Identity};

/// Sender identity and SMTP credentials. Passed in explicitly; nothing here
/// reads the process environment.
#[derive(Debug, Clone, Deserialize)]
pub struct MailerConfig {
    pub sender_name: String,
    pub sender_address: String,
    pub password: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl MailerConfig {
    fn sender(&self) -> Result<Mailbox> {
        mailbox(&self.sender_name, &self.sender_address)
    }
}

fn mailbox(name: &str, address: &str) -> Result<Mailbox> {
    let address = address
        .parse::<lettre::Address>()
        .map_err(|e| Error::Transport(format!("bad address {address:?}: {e}")))?;
    Ok(Mailbox::new(Some(name.to_string()), address))
}

/// `[codecheck] ch05-cube: FAIL (2/3) in jane.signed.zip for Jane Q. Public`
pub fn subject(report: &ExtractedReport, archive: &Path, name: &str) -> String {
    let filename = archive
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!(
        "[codecheck] {}: {} ({}) in {} for {}",
        report.project_display(),
        report.pass_fail,
        report.score_display(),
        filename,
        name
    )
}

/// Hidden header written into a new markdown file so the editor shows who
/// it is for and whether the archive verified.
pub fn comment_header(subject: &str, email: &str, signed: bool) -> String {
    let not = if signed { "" } else { " NOT" };
    format!("{subject} <{email}>{not} SIGNED")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub subject: String,
    pub to_name: String,
    pub to_email: String,
    pub text: String,
    pub html: String,
}

impl OutboundMessage {
    pub fn new(subject: String, to: &Identity<'_>, content: &NotificationContent) -> Self {
        OutboundMessage {
            subject,
            to_name: to.name.to_string(),
            to_email: to.email.to_string(),
            text: content.text.clone(),
            html: content.html.clone(),
        }
    }

    /// multipart/alternative message: plain text first, rendered HTML second.
    pub fn build(&self, config: &MailerConfig) -> Result<lettre::Message> {
        lettre::Message::builder()
            .from(config.sender()?)
            .to(mailbox(&self.to_name, &self.to_email)?)
            .subject(self.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                self.text.clone(),
                self.html.clone(),
            ))
            .map_err(|e| Error::Transport(e.to_string()))
    }
}

pub trait Transport {
    fn send(&self, message: &OutboundMessage) -> Result<()>;
}

/// Implicit-TLS SMTP relay (port 465 by default).
pub struct SmtpTransport {
    config: MailerConfig,
    inner: lettre::SmtpTransport,
}

impl SmtpTransport {
    pub fn new(config: MailerConfig) -> Result<Self> {
        let password = config
            .password
            .clone()
            .ok_or_else(|| Error::Config("SMTP password not set".to_string()))?;
        let inner = lettre::SmtpTransport::relay(&config.smtp_host)
            .map_err(|e| Error::Transport(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(config.sender_address.clone(), password))
            .build();
        Ok(SmtpTransport { config, inner })
    }
}

impl Transport for SmtpTransport {
    fn send(&self, message: &OutboundMessage) -> Result<()> {
        let email = message.build(&self.config)?;
        self.inner
            .send(&email)
            .map_err(|e| Error::Transport(e.to_string()))?;
        info!("Sent to: {} <{}>", message.to_name, message.to_email);
        Ok(())
    }
}

/// Builds the message and logs it instead of sending.
pub struct DryRunTransport {
    config: MailerConfig,
}

impl DryRunTransport {
    pub fn new(config: MailerConfig) -> Self {
        DryRunTransport { config }
    }
}

impl Transport for DryRunTransport {
    fn send(&self, message: &OutboundMessage) -> Result<()> {
        let email = message.build(&self.config)?;
        info!(
            to = %message.to_email,
            subject = %message.subject,
            "dry run, not sending"
        );
        tracing::debug!("message:\n{}", String::from_utf8_lossy(&email.formatted()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::PassFail;

    fn config() -> MailerConfig {
        MailerConfig {
            sender_name: "D. Teacher".into(),
            sender_address: "teacher@school.org".into(),
            password: None,
            smtp_host: "smtp.example.org".into(),
            smtp_port: 465,
        }
    }

    fn content() -> NotificationContent {
        NotificationContent {
            text: "Code\nx\nComment\nok".into(),
            markdown: "md".into(),
            html: "<p>ok</p>".into(),
            comment: "ok".into(),
        }
    }

    #[test]
    fn subject_line() {
        let report = ExtractedReport {
            project_id: Some("ch05-cube".into()),
            pass_fail: PassFail::Fail,
            score_text: Some("2/3".into()),
            ..Default::default()
        };
        let s = subject(&report, Path::new("data/jane.signed.zip"), "Jane Q. Public");
        assert_eq!(s, "[codecheck] ch05-cube: FAIL (2/3) in jane.signed.zip for Jane Q. Public");
    }

    #[test]
    fn header_marks_unsigned() {
        assert_eq!(comment_header("S", "a@b.c", true), "S <a@b.c> SIGNED");
        assert_eq!(comment_header("S", "a@b.c", false), "S <a@b.c> NOT SIGNED");
    }

    #[test]
    fn builds_multipart_alternative() {
        let to = Identity {
            name: "Jane Q. Public",
            email: "jane@example.com",
        };
        let msg = OutboundMessage::new("subj".into(), &to, &content());
        let raw = String::from_utf8(msg.build(&config()).unwrap().formatted()).unwrap();
        assert!(raw.contains("Subject: subj"));
        assert!(raw.contains("jane@example.com"));
        assert!(raw.contains("teacher@school.org"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn bad_recipient_is_transport_error() {
        let to = Identity {
            name: "X",
            email: "not an address",
        };
        let msg = OutboundMessage::new("s".into(), &to, &content());
        assert!(matches!(msg.build(&config()), Err(Error::Transport(_))));
    }

    #[test]
    fn smtp_requires_password() {
        assert!(matches!(SmtpTransport::new(config()), Err(Error::Config(_))));
    }

    #[test]
    fn dry_run_sends_nothing() {
        let to = Identity {
            name: "Jane",
            email: "jane@example.com",
        };
        let msg = OutboundMessage::new("s".into(), &to, &content());
        DryRunTransport::new(config()).send(&msg).unwrap();
    }
}
