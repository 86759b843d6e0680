pub mod fields;
pub mod markup;
pub mod state;

use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::report::{is_bogus_email, ExtractedReport, PassFail};
use fields::{escape_listing, evaluate_score, find_author, first_line, ERROR_MARKER};
use markup::Node;
use state::{CodeStateMachine, CombinedClassMatcher, ListingMatcher};

/// How student listings are recognised; the `listing_matcher` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatcherKind {
    /// Walk the student/provided `div` convention with [`CodeStateMachine`].
    #[default]
    StateMachine,
    /// `<pre class="student code">`, see [`CombinedClassMatcher`].
    CombinedClass,
}

/// Extract an [`ExtractedReport`] from the text of a `report.html`.
///
/// `is_signed` is left `false`; signature checking happens outside the document.
pub fn extract(markup: &str, verbose: bool, kind: MatcherKind) -> Result<ExtractedReport> {
    match kind {
        MatcherKind::StateMachine => extract_with(markup, verbose, &mut CodeStateMachine::new()),
        MatcherKind::CombinedClass => extract_with(markup, verbose, &mut CombinedClassMatcher),
    }
}

/// [`extract`] with a caller-chosen way of recognising student listings.
pub fn extract_with<M: ListingMatcher>(
    markup: &str,
    verbose: bool,
    matcher: &mut M,
) -> Result<ExtractedReport> {
    let nodes = markup::parse_nodes(markup)?;
    let mut report = ExtractedReport::default();

    for node in &nodes {
        apply_field_rules(&mut report, node)?;
        if matcher.is_listing(node) {
            capture_listing(&mut report, node, verbose);
        }
    }

    Ok(report)
}

/// Rules that fire on every node, whatever the state machine is doing.
fn apply_field_rules(report: &mut ExtractedReport, node: &Node) -> Result<()> {
    // <meta name="ID" content="PROJECT">
    if node.is("meta") && node.attr("name").eq_ignore_ascii_case("id") {
        report.project_id = node.has_attr("content").then(|| node.attr("content").to_string());
    }

    // <p class="score">47/47</p>, class *exactly* "score"
    if node.is("p") && node.attr("class").eq_ignore_ascii_case("score") {
        let value = evaluate_score(&node.text)?;
        report.pass_fail = if value < 1.0 { PassFail::Fail } else { PassFail::Pass };
        report.score_text = Some(node.text.clone());
    }

    // <pre class="output">cube(2) expected:&lt;8&gt; but was:&lt;4&gt;</pre>
    if node.is("pre") && node.text.contains(ERROR_MARKER) {
        report.error_lines.push(first_line(&node.text).to_string());
    }

    Ok(())
}

fn capture_listing(report: &mut ExtractedReport, node: &Node, verbose: bool) {
    report.code_listings.push(escape_listing(&node.text));

    let Some(author) = find_author(&node.text) else {
        return;
    };
    if verbose {
        info!(name = %author.name, email = %author.email, "@author match");
    }
    // Last usable tag wins. Listings by different collaborators will silently
    // address only the last one.
    if !is_bogus_email(&author.email) {
        report.identity_name = Some(author.name);
        report.identity_email = Some(author.email);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn extract(markup: &str, verbose: bool) -> Result<ExtractedReport> {
        super::extract(markup, verbose, MatcherKind::StateMachine)
    }

    fn page(body: &str) -> String {
        format!(
            "<html xmlns=\"http://www.w3.org/1999/xhtml\"><head>\
             <meta name=\"ID\" content=\"pset-12\"/></head><body>{body}</body></html>"
        )
    }

    #[test]
    fn single_listing_with_author() {
        let html = page(
            "<p class=\"score\">3/4</p>\
             <div class=\"studentFiles\"><pre>/** @author Jane Q. Public &lt;jane@example.com&gt; */\nclass A {}</pre></div>",
        );
        let r = extract(&html, false).unwrap();
        assert_eq!(r.project_id.as_deref(), Some("pset-12"));
        assert_eq!(r.score_text.as_deref(), Some("3/4"));
        assert_eq!(r.pass_fail, PassFail::Fail);
        assert_eq!(r.code_listings.len(), 1);
        assert_eq!(r.identity_name.as_deref(), Some("Jane Q. Public"));
        assert_eq!(r.identity_email.as_deref(), Some("jane@example.com"));
        assert!(!r.is_signed);
    }

    #[test]
    fn full_score_passes() {
        let r = extract(&page("<p class=\"Score\">47/47</p>"), false).unwrap();
        assert_eq!(r.pass_fail, PassFail::Pass);
    }

    #[test]
    fn no_score_is_unknown() {
        let r = extract(&page("<p class=\"scores\">1/2</p><p>3/4</p>"), false).unwrap();
        assert_eq!(r.pass_fail, PassFail::Unknown);
        assert_eq!(r.score_text, None);
    }

    #[test]
    fn bad_score_fails_extraction() {
        let err = extract(&page("<p class=\"score\">n/a</p>"), false).unwrap_err();
        assert!(matches!(err, Error::InvalidScoreExpression(s) if s == "n/a"));
    }

    #[test]
    fn malformed_markup() {
        let err = extract("<html><body></html>", false).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument(_)));
    }

    #[test]
    fn bogus_author_leaves_identity_unset() {
        let html = page(
            "<div class=\"student\"><pre>// @author YOUR NAME &lt;your@email.address&gt;</pre></div>",
        );
        let r = extract(&html, false).unwrap();
        assert_eq!(r.code_listings.len(), 1);
        assert_eq!(r.identity_name, None);
        assert_eq!(r.identity_email, None);
        assert!(r.identity().is_err());
    }

    #[test]
    fn last_author_wins() {
        let html = page(
            "<div class=\"student\">\
             <pre>@author Ann Lee &lt;ann@x.org&gt;</pre>\
             <pre>@author Bo Chan &lt;bo@x.org&gt;</pre>\
             <pre>@author YOUR NAME &lt;your@email.address&gt;</pre>\
             </div>",
        );
        let r = extract(&html, false).unwrap();
        assert_eq!(r.code_listings.len(), 3);
        assert_eq!(r.identity_name.as_deref(), Some("Bo Chan"));
        assert_eq!(r.identity_email.as_deref(), Some("bo@x.org"));
    }

    #[test]
    fn listings_are_quote_escaped() {
        let html = page("<div class=\"student\"><pre>s = \"it's\";</pre></div>");
        let r = extract(&html, false).unwrap();
        assert_eq!(r.code_listings, ["s = &quot;it&apos;s&quot;;"]);
    }

    #[test]
    fn error_lines_truncated_per_block() {
        let html = page(
            "<pre class=\"output\">cube(2) expected:&lt;8&gt; but was:&lt;4&gt;\nextra</pre>\
             <pre>fine</pre>\
             <pre class=\"output\">sq(3) expected:&lt;9&gt; but was:&lt;6&gt;\nmore\nlines</pre>",
        );
        let r = extract(&html, false).unwrap();
        assert_eq!(
            r.error_lines,
            ["cube(2) expected:<8> but was:<4>", "sq(3) expected:<9> but was:<6>"]
        );
        assert!(r.code_listings.is_empty());
    }

    #[test]
    fn field_rules_apply_after_done() {
        let html = page(
            "<div class=\"student\"><pre>a</pre></div>\
             <div class=\"provided\"><pre>b</pre></div>\
             <p class=\"score\">1/1</p>",
        );
        let r = extract(&html, false).unwrap();
        assert_eq!(r.code_listings, ["a"]);
        assert_eq!(r.pass_fail, PassFail::Pass);
    }

    #[test]
    fn combined_class_alternative() {
        let html = page("<pre class=\"student code\">x</pre><div class=\"student\"><pre>y</pre></div>");
        let r = super::extract(&html, false, MatcherKind::CombinedClass).unwrap();
        assert_eq!(r.code_listings, ["x"]);
    }

    #[test]
    fn codecheck_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/report.html").unwrap();
        let r = extract(&html, true).unwrap();
        assert_eq!(r.project_id.as_deref(), Some("ch05-cube"));
        assert_eq!(r.score_text.as_deref(), Some("2/3"));
        assert_eq!(r.pass_fail, PassFail::Fail);
        assert_eq!(r.code_listings.len(), 2, "listings: {:?}", r.code_listings);
        assert!(r.code_listings[0].contains("public class Cube"));
        assert!(r.code_listings[1].contains("&quot;Volume: &quot;"));
        assert_eq!(r.identity_name.as_deref(), Some("Jane Q. Public"));
        assert_eq!(r.identity_email.as_deref(), Some("jane@example.com"));
        assert_eq!(r.error_lines, ["cube(2) expected:<8> but was:<4>"]);
    }
}
