use serde::Deserialize;

use crate::parser::fields::unescape_listing;
use crate::report::PassFail;

/// Separates the generated part of the markdown from the hand-written comment.
pub const EDIT_SENTINEL: &str = "<!-- ONLY EDIT BELOW -->";

/// Colour tokens used to tag headings and listing separators.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColorPolicy {
    pub pass: String,
    pub fail: String,
}

impl Default for ColorPolicy {
    fn default() -> Self {
        ColorPolicy {
            pass: "green".to_string(),
            fail: "red".to_string(),
        }
    }
}

impl ColorPolicy {
    pub fn color_for(&self, pass_fail: PassFail) -> &str {
        match pass_fail {
            PassFail::Pass => &self.pass,
            PassFail::Fail | PassFail::Unknown => &self.fail,
        }
    }
}

fn html_comment(text: &str) -> String {
    format!("<!-- {text} -->")
}

fn separator(color: &str) -> String {
    format!(
        "\n<hr style=\"padding:0; margin:0; border:none; background-color:{color}; height:1px;\">\n"
    )
}

/// Fenced, unescaped listings joined by a rule in the pass/fail colour.
pub fn markdown_listings(listings: &[String], color: &str, language: &str) -> String {
    listings
        .iter()
        .map(|l| format!("```{language}\n{}\n```", unescape_listing(l)))
        .collect::<Vec<_>>()
        .join(&separator(color))
}

/// Initial contents of a recipient's markdown file.
pub fn seed_markdown(
    listings: &[String],
    error_lines: &[String],
    color: &str,
    language: &str,
    comment_header: &str,
) -> String {
    let code = markdown_listings(listings, color, language);
    let errors: String = error_lines
        .iter()
        .map(|e| format!("> {e} <br>\n"))
        .collect();
    format!(
        "<h1 style=\"color: {color};\">Code</h1>\n\
         {code}\n\
         \n\
         <h1 style=\"color: {color};\">Comment</h1>\n\
         {header}{EDIT_SENTINEL}\n\
         {errors}\
         Add comment here&hellip;",
        header = html_comment(comment_header),
    )
}

/// Everything after the sentinel, trimmed. `None` if the sentinel was removed.
pub fn comment_section(markdown: &str) -> Option<&str> {
    markdown
        .find(EDIT_SENTINEL)
        .map(|start| markdown[start + EDIT_SENTINEL.len()..].trim())
}

/// Plain-text alternative of the message.
pub fn plain_text(listings: &[String], comment: &str) -> String {
    let code: String = listings
        .iter()
        .map(|l| format!("{}\n", unescape_listing(l)))
        .collect();
    format!("Code\n{}\nComment\n{}", code.trim(), comment.trim())
        .trim()
        .to_string()
}
