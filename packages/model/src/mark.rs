//! Inline style annotations attached to text and inline leaves.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A mark with its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Code,
    Link {
        href: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },
    Comment {
        id: String,
        #[serde(default)]
        color: String,
    },
}

/// Mark kind without attributes. The declaration order is the canonical
/// order of marks inside a mark set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkKind {
    Link,
    Italic,
    Underline,
    Bold,
    Strikethrough,
    Code,
    Comment,
}

impl Mark {
    pub fn kind(&self) -> MarkKind {
        match self {
            Mark::Bold => MarkKind::Bold,
            Mark::Italic => MarkKind::Italic,
            Mark::Underline => MarkKind::Underline,
            Mark::Strikethrough => MarkKind::Strikethrough,
            Mark::Code => MarkKind::Code,
            Mark::Link { .. } => MarkKind::Link,
            Mark::Comment { .. } => MarkKind::Comment,
        }
    }

    pub fn link(href: impl Into<String>) -> Self {
        Mark::Link {
            href: href.into(),
            title: None,
        }
    }

    pub fn comment(id: impl Into<String>, color: impl Into<String>) -> Self {
        Mark::Comment {
            id: id.into(),
            color: color.into(),
        }
    }

    /// Add this mark to `set`, replacing any mark of the same kind and
    /// keeping the set in canonical order.
    pub fn add_to_set(&self, set: &[Mark]) -> Vec<Mark> {
        let mut out: Vec<Mark> = set
            .iter()
            .filter(|m| m.kind() != self.kind())
            .cloned()
            .collect();
        let at = out
            .iter()
            .position(|m| m.kind() > self.kind())
            .unwrap_or(out.len());
        out.insert(at, self.clone());
        out
    }

    pub fn is_in_set(&self, set: &[Mark]) -> bool {
        set.contains(self)
    }
}

impl MarkKind {
    pub fn name(self) -> &'static str {
        match self {
            MarkKind::Bold => "bold",
            MarkKind::Italic => "italic",
            MarkKind::Underline => "underline",
            MarkKind::Strikethrough => "strikethrough",
            MarkKind::Code => "code",
            MarkKind::Link => "link",
            MarkKind::Comment => "comment",
        }
    }

    /// The attribute-free mark for this kind, if the kind has no attributes.
    pub fn plain(self) -> Option<Mark> {
        match self {
            MarkKind::Bold => Some(Mark::Bold),
            MarkKind::Italic => Some(Mark::Italic),
            MarkKind::Underline => Some(Mark::Underline),
            MarkKind::Strikethrough => Some(Mark::Strikethrough),
            MarkKind::Code => Some(Mark::Code),
            MarkKind::Link | MarkKind::Comment => None,
        }
    }

    /// Whether typing at the end of a run carrying this mark extends it.
    pub fn inclusive(self) -> bool {
        self != MarkKind::Comment
    }

    pub fn find_in(self, set: &[Mark]) -> Option<&Mark> {
        set.iter().find(|m| m.kind() == self)
    }

    pub fn remove_from_set(self, set: &[Mark]) -> Vec<Mark> {
        set.iter().filter(|m| m.kind() != self).cloned().collect()
    }
}

impl fmt::Display for MarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_to_set_keeps_canonical_order() {
        let set = Mark::Bold.add_to_set(&[]);
        let set = Mark::Italic.add_to_set(&set);
        let set = Mark::link("https://example.com").add_to_set(&set);
        let kinds: Vec<MarkKind> = set.iter().map(Mark::kind).collect();
        assert_eq!(kinds, vec![MarkKind::Link, MarkKind::Italic, MarkKind::Bold]);
    }

    #[test]
    fn test_mark_excludes_its_own_kind() {
        let set = Mark::comment("c1", "#f00").add_to_set(&[]);
        let set = Mark::comment("c2", "#0f0").add_to_set(&set);
        assert_eq!(set, vec![Mark::comment("c2", "#0f0")]);
    }

    #[test]
    fn test_remove_from_set() {
        let set = vec![Mark::Italic, Mark::Bold];
        assert_eq!(MarkKind::Bold.remove_from_set(&set), vec![Mark::Italic]);
    }
}
