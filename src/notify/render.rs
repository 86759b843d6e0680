use std::ffi::OsString;
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::utils::run_quiet;

/// Turns an intermediate markdown file into its rendered HTML counterpart.
///
/// The default is a human in an editor exporting by hand, so calls may block
/// for as long as that takes.
pub trait Renderer {
    fn render(&self, intermediate: &Path, rendered: &Path) -> Result<()>;
}

/// Runs an external program, e.g. `open -W -a MacDown` or
/// `pandoc {input} -o {output}`.
///
/// `{input}` and `{output}` in the arguments are replaced by the artifact
/// paths. Without either placeholder the input path is appended.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    argv: Vec<String>,
}

impl CommandRenderer {
    pub fn new(argv: Vec<String>) -> Self {
        CommandRenderer { argv }
    }

    fn command_line(&self, intermediate: &Path, rendered: &Path) -> (Vec<String>, Vec<OsString>) {
        let has_placeholder = self
            .argv
            .iter()
            .any(|a| a.contains("{input}") || a.contains("{output}"));
        if !has_placeholder {
            return (self.argv.clone(), vec![intermediate.as_os_str().to_os_string()]);
        }
        let argv = self
            .argv
            .iter()
            .map(|a| {
                a.replace("{input}", &intermediate.to_string_lossy())
                    .replace("{output}", &rendered.to_string_lossy())
            })
            .collect();
        (argv, Vec::new())
    }
}

impl Renderer for CommandRenderer {
    fn render(&self, intermediate: &Path, rendered: &Path) -> Result<()> {
        info!(
            "Editing {} ... MUST export {}",
            intermediate.display(),
            rendered.display()
        );
        let (argv, extra) = self.command_line(intermediate, rendered);
        let failed = |reason: String| Error::RenderingFailed {
            path: rendered.to_path_buf(),
            reason,
        };
        let status = run_quiet(&argv, &extra)
            .map_err(|e| failed(format!("cannot run {:?}: {e}", self.argv)))?;
        if !status.success() {
            return Err(failed(format!("{:?} exited with {status}", self.argv)));
        }
        Ok(())
    }
}
