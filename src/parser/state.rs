//! Locating student code in a report.
//!
//! The report never marks student code directly. Student files live inside a
//! `<div class="...student...">`, each listing is a bare `<pre>`, and the
//! provided (instructor) files follow in a `<div class="...provided...">`.
//! [`CodeStateMachine`] walks that convention. If the report format ever tags
//! listings with a combined class (`<pre class="student code">`), the whole
//! machine collapses to the one check in [`CombinedClassMatcher`].

use super::markup::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    Init,
    Student,
    Pre,
    Done,
}

/// What a node means to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// A `<div>`; which of the two class tokens its `class` contains.
    /// A class may carry both (`providedStudentFiles`).
    Container { student: bool, provided: bool },
    Preformatted,
    /// The `<pre>` that moved the machine into [`State::Pre`] has been captured.
    Captured,
    Other,
}

impl Signal {
    pub fn of(node: &Node) -> Signal {
        if node.is("pre") {
            return Signal::Preformatted;
        }
        if node.is("div") {
            let class = node.attr("class").to_lowercase();
            return Signal::Container {
                student: class.contains("student"),
                provided: class.contains("provided"),
            };
        }
        Signal::Other
    }
}

/// The full transition table. Pairs not listed leave the state unchanged;
/// `Done` is terminal.
pub fn transition(state: State, signal: Signal) -> State {
    match (state, signal) {
        (State::Init, Signal::Container { student: true, .. }) => State::Student,
        (State::Student, Signal::Preformatted) => State::Pre,
        (State::Pre, Signal::Captured) => State::Student,
        (State::Student, Signal::Container { provided: true, .. }) => State::Done,
        (s, _) => s,
    }
}

/// Decides, node by node, whether a node is a student code listing.
pub trait ListingMatcher {
    fn is_listing(&mut self, node: &Node) -> bool;
}

#[derive(Debug, Default)]
pub struct CodeStateMachine {
    state: State,
}

impl CodeStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn state(&self) -> State {
        self.state
    }
}

impl ListingMatcher for CodeStateMachine {
    fn is_listing(&mut self, node: &Node) -> bool {
        self.state = transition(self.state, Signal::of(node));
        if self.state != State::Pre {
            return false;
        }
        // Pre is entered on the listing itself; capture and go straight back.
        self.state = transition(self.state, Signal::Captured);
        true
    }
}

/// Single-conditional matcher for reports whose listings carry both the
/// `student` and `code` class tokens.
#[derive(Debug, Default)]
pub struct CombinedClassMatcher;

impl ListingMatcher for CombinedClassMatcher {
    fn is_listing(&mut self, node: &Node) -> bool {
        if !node.is("pre") {
            return false;
        }
        let class = node.attr("class").to_lowercase();
        let tokens: Vec<&str> = class.split_whitespace().collect();
        tokens.contains(&"student") && tokens.contains(&"code")
    }
}
