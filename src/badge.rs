//! Unread-count badges in the topbar.

use crate::dom::{Document, Element};
use crate::types::BadgeCounts;

/// Element id of the unread messages badge.
pub const MESSAGE_BADGE: &str = "messageBadge";
/// Element id of the unread alerts badge.
pub const ALERT_BADGE: &str = "alertBadge";

/// Counts above this are shown as `"9+"`.
pub const MAX_SHOWN: u64 = 9;

const VISIBLE: &str = "inline-block";
const HIDDEN: &str = "none";

/// Text a badge shows for `count`, or `None` when the badge is hidden.
#[must_use]
pub fn badge_label(count: u64) -> Option<String> {
    match count {
        0 => None,
        n if n > MAX_SHOWN => Some(format!("{MAX_SHOWN}+")),
        n => Some(n.to_string()),
    }
}

/// Show or hide one badge for `count`.
///
/// A hidden badge keeps its previous text.
pub fn apply(element: &mut Element, count: u64) {
    match badge_label(count) {
        Some(label) => {
            element.set_text_content(label);
            element.set_display(VISIBLE);
        }
        None => element.set_display(HIDDEN),
    }
}

/// Update both badges. Either may be missing from the document.
pub fn apply_counts(doc: &mut Document, counts: BadgeCounts) {
    if let Some(badge) = doc.get_mut(MESSAGE_BADGE) {
        apply(badge, counts.message_count);
    }
    if let Some(badge) = doc.get_mut(ALERT_BADGE) {
        apply(badge, counts.alert_count);
    }
}

/// What a badge currently shows: `None` when hidden or absent.
pub fn shown(doc: &Document, id: &str) -> Option<String> {
    doc.get(id)
        .filter(|badge| !badge.is_hidden())
        .map(|badge| badge.text_content().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_display_rule() {
        assert_eq!(badge_label(0), None);
        for n in 1..=9 {
            assert_eq!(badge_label(n), Some(n.to_string()));
        }
        assert_eq!(badge_label(10).as_deref(), Some("9+"));
        assert_eq!(badge_label(15).as_deref(), Some("9+"));
        assert_eq!(badge_label(u64::MAX).as_deref(), Some("9+"));
    }

    #[test]
    fn apply_counts_tolerates_missing_badges() {
        let mut doc = Document::from_html(r#"<span id="messageBadge" style="display:none"></span>"#);
        apply_counts(
            &mut doc,
            BadgeCounts {
                message_count: 15,
                alert_count: 4,
            },
        );
        assert_eq!(shown(&doc, MESSAGE_BADGE).as_deref(), Some("9+"));
        assert_eq!(doc.get(MESSAGE_BADGE).unwrap().display(), Some("inline-block"));
        assert_eq!(shown(&doc, ALERT_BADGE), None);
    }

    #[test]
    fn zero_hides_a_visible_badge() {
        let mut doc = Document::from_html(r#"<span id="alertBadge">3</span>"#);
        assert_eq!(shown(&doc, ALERT_BADGE).as_deref(), Some("3"));
        apply_counts(&mut doc, BadgeCounts::default());
        assert!(doc.get(ALERT_BADGE).unwrap().is_hidden());
        assert_eq!(shown(&doc, ALERT_BADGE), None);
    }
}
