pub mod artifacts;
pub mod decision;
pub mod render;
pub mod template;

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::report::ExtractedReport;
pub use artifacts::ArtifactPaths;
pub use decision::{ArtifactPresence, Decision};
pub use render::{CommandRenderer, Renderer};
pub use template::ColorPolicy;

/// The same feedback three ways. Only the comment prose changes between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub text: String,
    pub markdown: String,
    pub html: String,
    /// Hand-written part of the markdown, after the sentinel.
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub should_notify: bool,
    pub content: NotificationContent,
}

pub struct NotificationPlanner<R> {
    renderer: R,
    colors: ColorPolicy,
    code_language: String,
}

impl<R: Renderer> NotificationPlanner<R> {
    pub fn new(renderer: R, colors: ColorPolicy, code_language: impl Into<String>) -> Self {
        NotificationPlanner {
            renderer,
            colors,
            code_language: code_language.into(),
        }
    }

    /// Decide whether to (re)notify, (re)building the artifacts as needed,
    /// and assemble the message content from them.
    pub fn plan(
        &self,
        report: &ExtractedReport,
        paths: &ArtifactPaths,
        presence: ArtifactPresence,
        resend: bool,
        comment_header: &str,
    ) -> Result<Plan> {
        let decision = Decision::decide(resend, presence);
        debug!(?presence, resend, ?decision, "notification decision");
        let color = self.colors.color_for(report.pass_fail);

        if decision.create_intermediate {
            let seeded = template::seed_markdown(
                &report.code_listings,
                &report.error_lines,
                color,
                &self.code_language,
                comment_header,
            );
            write(&paths.intermediate, &seeded)?;
        }

        if decision.regenerate_rendered {
            remove_stale(&paths.rendered)?;
            self.renderer.render(&paths.intermediate, &paths.rendered)?;
            if !paths.rendered.is_file() {
                return Err(Error::RenderingFailed {
                    path: paths.rendered.clone(),
                    reason: "file not found after rendering".to_string(),
                });
            }
        }

        let markdown = read_trimmed(&paths.intermediate)?;
        let comment = match template::comment_section(&markdown) {
            Some(c) => c.to_string(),
            None => {
                warn!(
                    path = %paths.intermediate.display(),
                    "comment sentinel missing; sending without a comment"
                );
                String::new()
            }
        };
        let text = template::plain_text(&report.code_listings, &comment);
        let html = read_trimmed(&paths.rendered)?;

        Ok(Plan {
            should_notify: decision.notify,
            content: NotificationContent {
                text,
                markdown,
                html,
                comment,
            },
        })
    }
}

fn write(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| Error::io(path, e))
}

fn read_trimmed(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| Error::io(path, e))
}

fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(path, e)),
    }
}
