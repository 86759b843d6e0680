/// Which of a recipient's two artifacts are already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArtifactPresence {
    pub intermediate_exists: bool,
    pub rendered_exists: bool,
}

/// What the planner does for one recipient.
///
/// Editing the markdown always requires a fresh HTML export, so regenerating
/// the rendered artifact and notifying go together.
///
/// | resend | .md | .html | action                                   |
/// |--------|-----|-------|------------------------------------------|
/// | F      | F   | F     | create .md, regenerate .html, notify     |
/// | F      | F   | T     | create .md, regenerate .html, notify     |
/// | F      | T   | F     | reuse .md, regenerate .html, notify      |
/// | F      | T   | T     | reuse both, do not notify                |
/// | T      | F   | *     | create .md, regenerate .html, notify     |
/// | T      | T   | *     | reuse .md, regenerate .html, notify      |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub create_intermediate: bool,
    pub regenerate_rendered: bool,
    pub notify: bool,
}

impl Decision {
    pub fn decide(resend: bool, presence: ArtifactPresence) -> Decision {
        let notify = resend || !presence.intermediate_exists || !presence.rendered_exists;
        Decision {
            create_intermediate: !presence.intermediate_exists,
            regenerate_rendered: notify,
            notify,
        }
    }
}
