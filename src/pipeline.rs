use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::archive::{self, SignatureVerifier};
use crate::mailer::{self, OutboundMessage, Transport};
use crate::notify::{ArtifactPaths, NotificationPlanner, Renderer};
use crate::parser::{self, MatcherKind};
use crate::report::{ExtractedReport, IdentityRejection};

/// What happened to one archive that was processed without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    UpToDate,
    NoIdentity(IdentityRejection),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub sent: usize,
    pub up_to_date: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn print(&self) {
        println!(
            "Done: {} archives ({} sent, {} up to date, {} skipped, {} failed).",
            self.total, self.sent, self.up_to_date, self.skipped, self.failed
        );
    }
}

pub struct Pipeline<R, T> {
    planner: NotificationPlanner<R>,
    transport: T,
    verifier: SignatureVerifier,
    matcher: MatcherKind,
    resend: bool,
    verbose: bool,
}

impl<R: Renderer, T: Transport> Pipeline<R, T> {
    pub fn new(
        planner: NotificationPlanner<R>,
        transport: T,
        verifier: SignatureVerifier,
        matcher: MatcherKind,
        resend: bool,
        verbose: bool,
    ) -> Self {
        Pipeline {
            planner,
            transport,
            verifier,
            matcher,
            resend,
            verbose,
        }
    }

    /// Process every archive in order. A failing archive is logged and
    /// counted; it never stops the run.
    pub fn run(&self, archives: &[PathBuf]) -> RunSummary {
        let pb = ProgressBar::new(archives.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );

        let mut summary = RunSummary {
            total: archives.len(),
            ..Default::default()
        };

        for path in archives {
            pb.set_message(file_label(path));
            // The renderer may hand the terminal to an editor; keep the bar out of its way.
            match pb.suspend(|| self.process(path)) {
                Ok(Outcome::Sent) => summary.sent += 1,
                Ok(Outcome::UpToDate) => {
                    info!(archive = %path.display(), "already sent, skipping");
                    summary.up_to_date += 1;
                }
                Ok(Outcome::NoIdentity(rejection)) => {
                    error!(archive = %path.display(), "* ERROR: {rejection}");
                    summary.skipped += 1;
                }
                Err(e) => {
                    error!(archive = %path.display(), "{e:#}");
                    summary.failed += 1;
                }
            }
            pb.inc(1);
        }

        pb.finish_and_clear();
        summary
    }

    pub fn process(&self, path: &Path) -> Result<Outcome> {
        info!("Processing: {}", path.display());
        let report = extract_archive(path, &self.verifier, self.matcher, self.verbose)?;
        if self.verbose {
            info!(values = ?report, "extracted");
        }
        if !report.is_signed {
            warn!(archive = %path.display(), "signature did not verify");
        }

        let identity = match report.identity() {
            Ok(identity) => identity,
            Err(rejection) => return Ok(Outcome::NoIdentity(rejection)),
        };

        let subject = mailer::subject(&report, path, identity.name);
        let header = mailer::comment_header(&subject, identity.email, report.is_signed);
        let paths = ArtifactPaths::for_archive(path);
        let plan = self
            .planner
            .plan(&report, &paths, paths.presence(), self.resend, &header)
            .with_context(|| format!("planning notification for {}", path.display()))?;

        if !plan.should_notify {
            return Ok(Outcome::UpToDate);
        }

        let message = OutboundMessage::new(subject, &identity, &plan.content);
        self.transport
            .send(&message)
            .with_context(|| format!("sending to {}", message.to_email))?;
        Ok(Outcome::Sent)
    }
}

/// Read, verify and extract one archive.
pub fn extract_archive(
    path: &Path,
    verifier: &SignatureVerifier,
    matcher: MatcherKind,
    verbose: bool,
) -> Result<ExtractedReport> {
    let markup = archive::read_report(path)?;
    let report = parser::extract(&markup, verbose, matcher)
        .with_context(|| format!("parsing {} in {}", archive::REPORT_ENTRY, path.display()))?;
    Ok(ExtractedReport {
        is_signed: verifier.is_signed(path),
        ..report
    })
}

#[derive(Debug, Serialize)]
pub struct InspectRecord {
    pub archive: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ExtractedReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Extract every archive without planning or sending anything.
pub fn inspect(
    archives: &[PathBuf],
    verifier: &SignatureVerifier,
    matcher: MatcherKind,
    verbose: bool,
) -> Vec<InspectRecord> {
    archives
        .iter()
        .map(|path| match extract_archive(path, verifier, matcher, verbose) {
            Ok(report) => InspectRecord {
                archive: path.clone(),
                report: Some(report),
                error: None,
            },
            Err(e) => InspectRecord {
                archive: path.clone(),
                report: None,
                error: Some(format!("{e:#}")),
            },
        })
        .collect()
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default()
}
