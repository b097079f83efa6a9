//! Template interpolation.
//!
//! `{subject}` is the only placeholder. Any other brace text is left alone,
//! so templates can quote literal braces without escaping.

use welli_contracts::context::ChatContext;

pub const SUBJECT_PLACEHOLDER: &str = "{subject}";

/// Substitute the context's subject into `template`.
pub fn render(template: &str, ctx: &ChatContext) -> String {
    template.replace(SUBJECT_PLACEHOLDER, ctx.subject())
}

/// True if `template` interpolates the subject.
pub fn mentions_subject(template: &str) -> bool {
    template.contains(SUBJECT_PLACEHOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_every_placeholder() {
        let ctx = ChatContext::for_subject("Robert Chen");
        let out = render("{subject} and {subject}'s family", &ctx);
        assert_eq!(out, "Robert Chen and Robert Chen's family");
    }

    #[test]
    fn render_uses_generic_subject_without_a_name() {
        let out = render("Based on {subject}'s profile", &ChatContext::generic());
        assert_eq!(out, "Based on the patient's profile");
    }

    #[test]
    fn render_leaves_other_braces_untouched() {
        let out = render("{name} {subject} {}", &ChatContext::for_subject("Emma"));
        assert_eq!(out, "{name} Emma {}");
        assert!(!mentions_subject("{name}"));
        assert!(mentions_subject("hi {subject}"));
    }
}
