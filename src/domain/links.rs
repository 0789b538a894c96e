//! Link bookkeeping for a single rendered unit.
//!
//! While a page is serialized its embedded links are swapped for synthetic
//! names (`link0`, `link1`, …) so they can be rewritten consistently and
//! resolved back later. A table belongs to the unit that built it and is
//! dropped with it.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const LINK_NAME_PREFIX: &str = "link";

/// Relation a link has to the unit that embeds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Anchor,
    Image,
    Script,
    Stylesheet,
    Frame,
    Other,
}

impl LinkKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkKind::Anchor => "anchor",
            LinkKind::Image => "image",
            LinkKind::Script => "script",
            LinkKind::Stylesheet => "stylesheet",
            LinkKind::Frame => "frame",
            LinkKind::Other => "other",
        }
    }

    /// Classify a link by the HTML element that carries it.
    pub fn for_element(element: &str) -> Self {
        match element.to_ascii_lowercase().as_str() {
            "a" | "area" => LinkKind::Anchor,
            "img" | "picture" | "source" => LinkKind::Image,
            "script" => LinkKind::Script,
            "link" => LinkKind::Stylesheet,
            "frame" | "iframe" => LinkKind::Frame,
            _ => LinkKind::Other,
        }
    }
}

/// A link target plus how it relates to the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    target: String,
    kind: LinkKind,
    internal: bool,
}

impl LinkDescriptor {
    /// Create an unnamed descriptor; the table assigns its name on insert.
    pub fn new(kind: LinkKind, target: impl Into<String>, internal: bool) -> Self {
        Self {
            name: None,
            target: target.into(),
            kind,
            internal,
        }
    }

    /// Create a descriptor carrying a pre-assigned name.
    pub fn named(
        name: impl Into<String>,
        kind: LinkKind,
        target: impl Into<String>,
        internal: bool,
    ) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(kind, target, internal)
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn kind(&self) -> LinkKind {
        self.kind
    }

    /// Whether the target resolves inside the managed repository.
    pub fn is_internal(&self) -> bool {
        self.internal
    }
}

/// Insertion-ordered map from synthetic link name to descriptor.
///
/// Inserting under a name that is already present replaces that entry in
/// place. There is no removal, so auto-assigned names stay unique as long as
/// callers do not pre-assign names of the `linkN` form themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTable {
    entries: Vec<LinkDescriptor>,
    index: HashMap<String, usize>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor under its own name, or under a fresh synthetic
    /// name when it carries none. Returns the name used.
    pub fn add_link(&mut self, mut descriptor: LinkDescriptor) -> String {
        let name = match descriptor.name.clone() {
            Some(name) => name,
            None => {
                let name = self.next_name();
                descriptor.name = Some(name.clone());
                name
            }
        };

        match self.index.get(&name).copied() {
            Some(position) => self.entries[position] = descriptor,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push(descriptor);
            }
        }

        name
    }

    /// Insert a new link under the next synthetic name (`"link" + len`).
    pub fn add(&mut self, kind: LinkKind, target: impl Into<String>, internal: bool) -> String {
        self.add_link(LinkDescriptor::new(kind, target, internal))
    }

    pub fn get_link(&self, name: &str) -> Option<&LinkDescriptor> {
        self.index.get(name).map(|&position| &self.entries[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinkDescriptor> {
        self.entries.iter()
    }

    /// Descriptors whose targets stay inside the repository.
    pub fn internal_links(&self) -> impl Iterator<Item = &LinkDescriptor> {
        self.entries.iter().filter(|link| link.internal)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn next_name(&self) -> String {
        format!("{LINK_NAME_PREFIX}{}", self.entries.len())
    }
}

impl<'a> IntoIterator for &'a LinkTable {
    type Item = &'a LinkDescriptor;
    type IntoIter = std::slice::Iter<'a, LinkDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for LinkTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.entries)
    }
}

impl<'de> Deserialize<'de> for LinkTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let descriptors = Vec::<LinkDescriptor>::deserialize(deserializer)?;
        let mut table = LinkTable::new();
        for descriptor in descriptors {
            table.add_link(descriptor);
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_names_follow_insertion_order() {
        let mut table = LinkTable::new();
        assert!(table.is_empty());

        let names: Vec<String> = (0..5)
            .map(|i| table.add(LinkKind::Anchor, format!("/page-{i}.html"), true))
            .collect();

        assert_eq!(names, ["link0", "link1", "link2", "link3", "link4"]);
        assert_eq!(table.len(), 5);
        assert!(!table.is_empty());
        assert_eq!(
            table.get_link("link3").map(LinkDescriptor::target),
            Some("/page-3.html")
        );
    }

    #[test]
    fn unknown_name_is_not_found() {
        let mut table = LinkTable::new();
        table.add(LinkKind::Image, "/logo.png", true);
        assert!(table.get_link("link1").is_none());
        assert!(table.get_link("logo").is_none());
    }

    #[test]
    fn preassigned_name_is_kept() {
        let mut table = LinkTable::new();
        let name = table.add_link(LinkDescriptor::named(
            "link7",
            LinkKind::Script,
            "/js/app.js",
            true,
        ));

        assert_eq!(name, "link7");
        let link = table.get_link("link7").expect("stored under its own name");
        assert_eq!(link.kind(), LinkKind::Script);
        assert_eq!(link.name(), Some("link7"));
    }

    #[test]
    fn same_name_replaces_in_place() {
        let mut table = LinkTable::new();
        table.add(LinkKind::Anchor, "/a.html", true);
        table.add(LinkKind::Anchor, "/b.html", true);
        table.add_link(LinkDescriptor::named(
            "link0",
            LinkKind::Anchor,
            "https://example.org/",
            false,
        ));

        assert_eq!(table.len(), 2);
        let targets: Vec<&str> = table.iter().map(LinkDescriptor::target).collect();
        assert_eq!(targets, ["https://example.org/", "/b.html"]);
    }

    #[test]
    fn internal_links_skip_external_targets() {
        let mut table = LinkTable::new();
        table.add(LinkKind::Anchor, "/news/index.html", true);
        table.add(LinkKind::Anchor, "https://example.org/", false);
        table.add(LinkKind::Stylesheet, "/css/site.css", true);

        let internal: Vec<&str> = table.internal_links().map(|l| l.target()).collect();
        assert_eq!(internal, ["/news/index.html", "/css/site.css"]);
    }

    #[test]
    fn json_round_trip_restores_names() {
        let mut table = LinkTable::new();
        table.add(LinkKind::Anchor, "/a.html", true);
        table.add(LinkKind::Frame, "https://example.org/embed", false);

        let json = serde_json::to_string(&table).expect("serialize table");
        let restored: LinkTable = serde_json::from_str(&json).expect("deserialize table");

        assert_eq!(restored, table);
        assert_eq!(
            restored.get_link("link1").map(LinkDescriptor::kind),
            Some(LinkKind::Frame)
        );
    }

    #[test]
    fn element_classification() {
        assert_eq!(LinkKind::for_element("A"), LinkKind::Anchor);
        assert_eq!(LinkKind::for_element("img"), LinkKind::Image);
        assert_eq!(LinkKind::for_element("iframe"), LinkKind::Frame);
        assert_eq!(LinkKind::for_element("video"), LinkKind::Other);
        assert_eq!(LinkKind::Stylesheet.as_str(), "stylesheet");
    }
}
