//! Manage-time client rules (class/instance/title matching).
use crate::model::TagMask;

/// A manage-time matcher, applied once against a new client's
/// `WM_CLASS`/title in [`crate::event::handle::manage`].
///
/// An absent field is a wildcard. The first matching rule wins, mirroring
/// dwm's linear scan over its static `rules[]` table.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    pub class: Option<String>,
    pub instance: Option<String>,
    pub title: Option<String>,

    pub tags: TagMask,
    pub is_floating: bool,
    /// `None` keeps the client on the monitor it was mapped on; `Some(ix)`
    /// re-homes it to monitor `ix` during `manage`.
    pub monitor: Option<usize>,
}

impl Rule {
    pub fn matches(&self, class: &str, instance: &str, title: &str) -> bool {
        let class_ok = self.class.as_deref().map_or(true, |c| class.contains(c));
        let instance_ok = self.instance.as_deref().map_or(true, |i| instance.contains(i));
        let title_ok = self.title.as_deref().map_or(true, |t| title.contains(t));

        class_ok && instance_ok && title_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_fields_always_match() {
        let r = Rule::default();
        assert!(r.matches("Firefox", "firefox", "some title"));
    }

    #[test]
    fn class_mismatch_fails() {
        let r = Rule {
            class: Some("Gimp".into()),
            ..Default::default()
        };
        assert!(!r.matches("Firefox", "firefox", "title"));
        assert!(r.matches("Gimp", "gimp", "title"));
    }

    #[test]
    fn title_match_is_substring() {
        let r = Rule {
            title: Some("Sharing".into()),
            ..Default::default()
        };
        assert!(r.matches("Firefox", "firefox", "Firefox is Sharing Indicator"));
        assert!(!r.matches("Firefox", "firefox", "Firefox"));
    }
}
