//! Feature-List Parser
//!
//! Turns the FEATURES section of an adversary or environment into
//! [`FeatureRecord`]s. A header line `Name - Passive|Action|Reaction[: text]`
//! opens a feature; every following line until the next header belongs to it.
//! Bullet lines (`•` or `- `) become list items, other lines run together into
//! paragraphs.
//!
//! The parser is an explicit state machine ([`transition`]) that emits each
//! completed feature; resolution against the compendium happens on emission.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex, RegexBuilder};

use super::annotator::annotate;
use super::entity::{FeatureRecord, FeatureSource};
use super::vocabulary::FeatureForm;
use crate::core::compendium::FeatureLookup;

/// Marker the host replaces with the owning entity's current name.
pub const SELF_REFERENCE: &str = "@Lookup[@name]";

// ============================================================================
// Regex Patterns
// ============================================================================

/// "Earth Eruption - Action: Mark a Stress to ...".
pub static FEATURE_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<name>.+?)\s*-\s*(?P<form>Passive|Action|Reaction)(?::\s*(?P<text>.*))?$")
        .expect("Failed to compile feature header regex")
});

// ============================================================================
// Types
// ============================================================================

/// One piece of a feature body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Paragraph(String),
    Bullet(String),
}

/// A feature whose body is still being collected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFeature {
    pub name: String,
    pub form: FeatureForm,
    pub fragments: Vec<Fragment>,
}

impl PendingFeature {
    fn push_line(&mut self, line: &str) {
        if let Some(item) = bullet_text(line) {
            self.fragments.push(Fragment::Bullet(item.to_string()));
            return;
        }
        match self.fragments.last_mut() {
            Some(Fragment::Paragraph(text)) => {
                text.push(' ');
                text.push_str(line);
            }
            _ => self.fragments.push(Fragment::Paragraph(line.to_string())),
        }
    }

    /// Body as HTML: paragraphs in `<p>`, bullet runs in one `<ul>`.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        let mut in_list = false;

        for fragment in &self.fragments {
            match fragment {
                Fragment::Bullet(item) => {
                    if !in_list {
                        html.push_str("<ul>");
                        in_list = true;
                    }
                    html.push_str(&format!("<li>{item}</li>"));
                }
                Fragment::Paragraph(text) => {
                    if in_list {
                        html.push_str("</ul>");
                        in_list = false;
                    }
                    if !text.is_empty() {
                        html.push_str(&format!("<p>{text}</p>"));
                    }
                }
            }
        }
        if in_list {
            html.push_str("</ul>");
        }
        html
    }
}

/// Parser state: between features, or inside one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListState {
    #[default]
    Idle,
    Open(PendingFeature),
}

/// Replaces the owning entity's name with [`SELF_REFERENCE`], case-insensitively.
#[derive(Debug, Clone)]
pub struct SelfReference {
    pattern: Option<Regex>,
}

impl SelfReference {
    pub fn new(entity_name: &str) -> Self {
        let name = entity_name.trim();
        let pattern = if name.is_empty() {
            None
        } else {
            RegexBuilder::new(&regex::escape(name))
                .case_insensitive(true)
                .build()
                .ok()
        };
        Self { pattern }
    }

    pub fn apply(&self, text: &str) -> String {
        match &self.pattern {
            Some(pattern) => pattern.replace_all(text, NoExpand(SELF_REFERENCE)).into_owned(),
            None => text.to_string(),
        }
    }
}

// ============================================================================
// State Machine
// ============================================================================

fn bullet_text(line: &str) -> Option<&str> {
    line.strip_prefix('•')
        .or_else(|| line.strip_prefix("- "))
        .map(str::trim)
}

/// Feed one line. Returns the next state and, when a header closes the open
/// feature, that completed feature.
pub fn transition(
    state: ListState,
    line: &str,
    self_ref: &SelfReference,
) -> (ListState, Option<PendingFeature>) {
    if let Some(caps) = FEATURE_HEADER_RE.captures(line) {
        let mut feature = PendingFeature {
            name: caps["name"].trim().to_string(),
            form: FeatureForm::from_word(&caps["form"]).unwrap_or_default(),
            fragments: Vec::new(),
        };
        let text = caps.name("text").map_or("", |m| m.as_str().trim());
        if !text.is_empty() {
            feature.fragments.push(Fragment::Paragraph(self_ref.apply(text)));
        }

        let emitted = match state {
            ListState::Open(previous) => Some(previous),
            ListState::Idle => None,
        };
        return (ListState::Open(feature), emitted);
    }

    match state {
        ListState::Open(mut feature) => {
            feature.push_line(&self_ref.apply(line));
            (ListState::Open(feature), None)
        }
        // text before the first header has no owner
        ListState::Idle => (ListState::Idle, None),
    }
}

/// Resolve a completed feature: a compendium hit is used verbatim, otherwise
/// the local body is rendered and annotated.
pub fn resolve(feature: PendingFeature, lookup: &dyn FeatureLookup) -> FeatureRecord {
    if let Some(found) = lookup.find_feature(&feature.name) {
        log::debug!("Found compendium match for feature: {} ({})", feature.name, found.id);
        return FeatureRecord {
            name: found.name.clone(),
            form: found.form,
            description: found.description.clone(),
            actions: Vec::new(),
            source: FeatureSource::Compendium {
                id: found.id.clone(),
            },
        };
    }

    let annotated = annotate(&feature.to_html());
    FeatureRecord {
        name: feature.name,
        form: feature.form,
        description: annotated.description,
        actions: annotated.actions,
        source: FeatureSource::Authored,
    }
}

/// Parse a whole FEATURES section.
pub fn parse_features<S: AsRef<str>>(
    lines: &[S],
    entity_name: &str,
    lookup: &dyn FeatureLookup,
) -> Vec<FeatureRecord> {
    let self_ref = SelfReference::new(entity_name);
    let mut features = Vec::new();
    let mut state = ListState::Idle;

    for line in lines {
        let (next, emitted) = transition(state, line.as_ref(), &self_ref);
        state = next;
        if let Some(feature) = emitted {
            features.push(resolve(feature, lookup));
        }
    }
    if let ListState::Open(last) = state {
        features.push(resolve(last, lookup));
    }

    features
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::compendium::{CompendiumFeature, CompendiumIndex};
    use crate::ingestion::ttrpg::entity::ActionDescriptor;

    fn empty() -> CompendiumIndex {
        CompendiumIndex::new()
    }

    #[test]
    fn test_header_pattern() {
        let caps = FEATURE_HEADER_RE.captures("Earth Eruption - Action: Mark a Stress.").unwrap();
        assert_eq!(&caps["name"], "Earth Eruption");
        assert_eq!(&caps["form"], "Action");
        assert_eq!(&caps["text"], "Mark a Stress.");

        assert!(FEATURE_HEADER_RE.is_match("Relentless (3) - Passive"));
        assert!(!FEATURE_HEADER_RE.is_match("The burrower digs - quickly."));
    }

    #[test]
    fn test_transition_emits_previous_on_header() {
        let self_ref = SelfReference::new("Bear");
        let (state, emitted) = transition(ListState::Idle, "Bite - Action: Chomp.", &self_ref);
        assert!(emitted.is_none());

        let (state, emitted) = transition(state, "Still chomping.", &self_ref);
        assert!(emitted.is_none());

        let (state, emitted) = transition(state, "Roar - Reaction", &self_ref);
        let bite = emitted.unwrap();
        assert_eq!(bite.name, "Bite");
        assert_eq!(
            bite.fragments,
            vec![Fragment::Paragraph("Chomp. Still chomping.".to_string())]
        );
        assert!(matches!(state, ListState::Open(ref f) if f.name == "Roar"));
    }

    #[test]
    fn test_text_before_first_header_is_ignored() {
        let self_ref = SelfReference::new("Bear");
        let (state, emitted) = transition(ListState::Idle, "stray text", &self_ref);
        assert_eq!(state, ListState::Idle);
        assert!(emitted.is_none());
    }

    #[test]
    fn test_bullets_grouped_into_one_list() {
        let features = parse_features(
            &[
                "Shapes - Passive: Choose one:",
                "• Wolf form",
                "- Bear form",
                "Then return.",
            ],
            "Druid",
            &empty(),
        );
        assert_eq!(
            features[0].description,
            "<p>Choose one:</p><ul><li>Wolf form</li><li>Bear form</li></ul><p>Then return.</p>"
        );
    }

    #[test]
    fn test_self_name_replaced_case_insensitively() {
        let features = parse_features(
            &["Burrow - Action: The acid burrower digs.", "ACID BURROWER resurfaces."],
            "Acid Burrower",
            &empty(),
        );
        assert_eq!(
            features[0].description,
            "<p>The @Lookup[@name] digs. @Lookup[@name] resurfaces.</p>"
        );
    }

    #[test]
    fn test_local_feature_is_annotated() {
        let features = parse_features(
            &["Spit Acid - Action: Mark a Stress to deal 2d6 physical damage."],
            "Acid Burrower",
            &empty(),
        );
        let feature = &features[0];
        assert_eq!(feature.source, FeatureSource::Authored);
        assert_eq!(feature.form, FeatureForm::Action);
        assert!(feature.description.contains("[[/r 2d6]]"));
        assert_eq!(feature.actions.len(), 2);
        assert!(matches!(feature.actions[1], ActionDescriptor::Damage { .. }));
    }

    #[test]
    fn test_compendium_body_used_verbatim() {
        let mut index = CompendiumIndex::new();
        index.insert_feature(CompendiumFeature {
            id: "f-1".to_string(),
            name: "Relentless (3)".to_string(),
            form: FeatureForm::Passive,
            description: "<p>Mark a Stress. 1d4 damage.</p>".to_string(),
        });

        let features = parse_features(
            &["relentless (3) - Passive: local text 2d6 damage", "- a bullet"],
            "Bear",
            &index,
        );
        let feature = &features[0];
        assert!(feature.is_compendium());
        assert_eq!(feature.name, "Relentless (3)");
        assert_eq!(feature.description, "<p>Mark a Stress. 1d4 damage.</p>");
        assert!(feature.actions.is_empty());
    }

    #[test]
    fn test_header_without_text() {
        let features = parse_features(&["Horde (1d4+1) - Passive"], "Rats", &empty());
        assert_eq!(features[0].name, "Horde (1d4+1)");
        assert_eq!(features[0].description, "");
    }
}
