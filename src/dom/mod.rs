//! In-memory document the fragments run against.
//!
//! Only what the fragments need is modelled: a tree of elements with classes,
//! attributes and text, class-based queries, viewport geometry and page
//! visibility. Layout and rendering stay with the real browser.

mod page;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

pub use page::{ElementSpec, PageError, PageSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(u64);

impl ElementId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }
}

pub type SharedDocument = Rc<RefCell<Document>>;

/// Arena of elements rooted at `body`.
///
/// Every accessor tolerates unknown ids: reads return `None`/empty and writes
/// are ignored, mirroring handlers that no-op when their element is gone.
pub struct Document {
    elements: HashMap<ElementId, Element>,
    next_id: u64,
    body: ElementId,
    viewport: Viewport,
    hidden: bool,
}

impl Document {
    pub fn new(viewport: Viewport) -> Self {
        let body = ElementId(0);
        let mut elements = HashMap::new();
        elements.insert(body, Element::new("body"));
        Self {
            elements,
            next_id: 1,
            body,
            viewport,
            hidden: false,
        }
    }

    pub fn into_shared(self) -> SharedDocument {
        Rc::new(RefCell::new(self))
    }

    pub fn body(&self) -> ElementId {
        self.body
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        self.elements.insert(id, Element::new(tag));
        id
    }

    /// Move `child` (and its subtree) under `parent`, detaching it first.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> bool {
        if parent == child
            || !self.elements.contains_key(&parent)
            || !self.elements.contains_key(&child)
            || self.ancestors(parent).contains(&child)
        {
            return false;
        }
        self.detach(child);
        if let Some(node) = self.elements.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.elements.get_mut(&parent) {
            node.children.push(child);
        }
        true
    }

    /// Detach an element from the tree. The subtree stays addressable but
    /// is no longer connected, so queries stop finding it.
    pub fn remove(&mut self, id: ElementId) -> bool {
        if id == self.body || !self.elements.contains_key(&id) {
            return false;
        }
        self.detach(id);
        true
    }

    /// Detach and drop every child of `parent`.
    pub fn clear_children(&mut self, parent: ElementId) {
        let children = match self.elements.get_mut(&parent) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        let mut stack = children;
        while let Some(id) = stack.pop() {
            if let Some(node) = self.elements.remove(&id) {
                stack.extend(node.children);
            }
        }
    }

    fn detach(&mut self, id: ElementId) {
        let parent = self.elements.get_mut(&id).and_then(|node| node.parent.take());
        if let Some(node) = parent.and_then(|parent| self.elements.get_mut(&parent)) {
            node.children.retain(|child| *child != id);
        }
    }

    /// Parents of `id`, nearest first.
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut cursor = self.elements.get(&id).and_then(|node| node.parent);
        while let Some(parent) = cursor {
            out.push(parent);
            cursor = self.elements.get(&parent).and_then(|node| node.parent);
        }
        out
    }

    pub fn is_connected(&self, id: ElementId) -> bool {
        id == self.body || self.ancestors(id).last() == Some(&self.body)
    }

    /// Descendants of `root` in document order, excluding `root`.
    fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = match self.elements.get(&root) {
            Some(node) => node.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(node) = self.elements.get(&id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Every connected element carrying `class`, in document order.
    pub fn query_all(&self, class: &str) -> Vec<ElementId> {
        self.query_all_within(self.body, class)
    }

    pub fn query_all_within(&self, root: ElementId, class: &str) -> Vec<ElementId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.has_class(*id, class))
            .collect()
    }

    /// First descendant of `root` carrying `class`.
    pub fn query_within(&self, root: ElementId, class: &str) -> Option<ElementId> {
        self.descendants(root)
            .into_iter()
            .find(|id| self.has_class(*id, class))
    }

    /// `id` itself or its nearest ancestor carrying `class`.
    pub fn closest(&self, id: ElementId, class: &str) -> Option<ElementId> {
        if self.has_class(id, class) {
            return Some(id);
        }
        self.ancestors(id)
            .into_iter()
            .find(|ancestor| self.has_class(*ancestor, class))
    }

    pub fn contains(&self, root: ElementId, id: ElementId) -> bool {
        root == id || self.ancestors(id).contains(&root)
    }

    pub fn attr(&self, id: ElementId, name: &str) -> Option<&str> {
        self.elements
            .get(&id)
            .and_then(|node| node.attributes.get(name))
            .map(String::as_str)
    }

    pub fn has_attr(&self, id: ElementId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn set_attr(&mut self, id: ElementId, name: &str, value: impl Into<String>) {
        if let Some(node) = self.elements.get_mut(&id) {
            node.attributes.insert(name.to_string(), value.into());
        }
    }

    pub fn remove_attr(&mut self, id: ElementId, name: &str) -> Option<String> {
        self.elements
            .get_mut(&id)
            .and_then(|node| node.attributes.remove(name))
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.elements
            .get(&id)
            .is_some_and(|node| node.classes.iter().any(|c| c == class))
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) {
        if let Some(node) = self.elements.get_mut(&id) {
            if !node.classes.iter().any(|c| c == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        if let Some(node) = self.elements.get_mut(&id) {
            node.classes.retain(|c| c != class);
        }
    }

    /// Flip `class`, or force it on/off. Returns whether it is now present.
    pub fn toggle_class(&mut self, id: ElementId, class: &str, force: Option<bool>) -> bool {
        let on = force.unwrap_or_else(|| !self.has_class(id, class));
        if on {
            self.add_class(id, class);
        } else {
            self.remove_class(id, class);
        }
        on && self.elements.contains_key(&id)
    }

    /// Drop every class starting with `prefix`.
    pub fn remove_classes_with_prefix(&mut self, id: ElementId, prefix: &str) {
        if let Some(node) = self.elements.get_mut(&id) {
            node.classes.retain(|c| !c.starts_with(prefix));
        }
    }

    pub fn text(&self, id: ElementId) -> &str {
        self.elements
            .get(&id)
            .map(|node| node.text.as_str())
            .unwrap_or_default()
    }

    pub fn set_text(&mut self, id: ElementId, text: impl Into<String>) {
        if let Some(node) = self.elements.get_mut(&id) {
            node.text = text.into();
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (Document, ElementId, ElementId, ElementId) {
        let mut doc = Document::default();
        let card = doc.create_element("article");
        doc.add_class(card, "news-card");
        let link = doc.create_element("a");
        doc.add_class(link, "news-card__link");
        let title = doc.create_element("span");
        doc.add_class(title, "news-card__title");
        doc.append_child(doc.body(), card);
        doc.append_child(card, link);
        doc.append_child(link, title);
        (doc, card, link, title)
    }

    #[test]
    fn queries_follow_document_order() {
        let (mut doc, card, _, _) = tree();
        let second = doc.create_element("article");
        doc.add_class(second, "news-card");
        doc.append_child(doc.body(), second);
        assert_eq!(doc.query_all("news-card"), vec![card, second]);
    }

    #[test]
    fn closest_includes_self_and_walks_up() {
        let (doc, card, link, title) = tree();
        assert_eq!(doc.closest(title, "news-card"), Some(card));
        assert_eq!(doc.closest(link, "news-card__link"), Some(link));
        assert_eq!(doc.closest(card, "missing"), None);
    }

    #[test]
    fn removed_subtree_is_disconnected() {
        let (mut doc, card, _, title) = tree();
        assert!(doc.is_connected(title));
        assert!(doc.remove(card));
        assert!(!doc.is_connected(title));
        assert!(doc.query_all("news-card").is_empty());
        assert_eq!(doc.query_within(card, "news-card__title"), Some(title));
    }

    #[test]
    fn cannot_append_into_own_subtree() {
        let (mut doc, card, _, title) = tree();
        assert!(!doc.append_child(title, card));
        assert!(doc.is_connected(card));
    }

    #[test]
    fn toggle_class_reports_state() {
        let (mut doc, card, _, _) = tree();
        assert!(doc.toggle_class(card, "is-open", None));
        assert!(!doc.toggle_class(card, "is-open", None));
        assert!(doc.toggle_class(card, "is-open", Some(true)));
        assert!(doc.toggle_class(card, "is-open", Some(true)));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut doc = Document::default();
        let ghost = ElementId(999);
        doc.set_attr(ghost, "src", "x");
        assert_eq!(doc.attr(ghost, "src"), None);
        assert_eq!(doc.text(ghost), "");
        assert!(!doc.remove(ghost));
    }
}
