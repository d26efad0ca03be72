//! Lookups of `<slug>__<part>` sub-elements inside a fragment root.

use tracing::warn;

use crate::dom::{ElementId, SharedDocument};
use crate::lifecycle::FragmentType;
use crate::util::{parse_timestamp, RelativeTimeStyle, Utils};

#[derive(Clone)]
pub(crate) struct Parts {
    document: SharedDocument,
    root: ElementId,
    kind: FragmentType,
}

impl Parts {
    pub(crate) fn new(document: SharedDocument, root: ElementId, kind: FragmentType) -> Self {
        Self {
            document,
            root,
            kind,
        }
    }

    pub(crate) fn one(&self, part: &str) -> Option<ElementId> {
        self.document
            .borrow()
            .query_within(self.root, &self.kind.part_class(part))
    }

    pub(crate) fn all(&self, part: &str) -> Vec<ElementId> {
        self.document
            .borrow()
            .query_all_within(self.root, &self.kind.part_class(part))
    }

    /// The `part` element that is `target` or encloses it, if it lies inside
    /// this fragment.
    pub(crate) fn enclosing(&self, target: ElementId, part: &str) -> Option<ElementId> {
        let doc = self.document.borrow();
        doc.closest(target, &self.kind.part_class(part))
            .filter(|found| doc.contains(self.root, *found))
    }

    pub(crate) fn is_in(&self, target: ElementId, part: Option<ElementId>) -> bool {
        part.is_some_and(|part| self.document.borrow().contains(part, target))
    }

    pub(crate) fn attr(&self, id: ElementId, name: &str) -> Option<String> {
        self.document.borrow().attr(id, name).map(str::to_string)
    }

    pub(crate) fn root_attr(&self, name: &str) -> Option<String> {
        self.attr(self.root, name)
    }

    /// Trimmed text of the first `part`, if present.
    pub(crate) fn text_of(&self, part: &str) -> Option<String> {
        let id = self.one(part)?;
        Some(self.document.borrow().text(id).trim().to_string())
    }

    /// Replace a `<time datetime=..>` element's text with a relative label.
    /// Malformed timestamps are logged and the text is left as it was.
    pub(crate) fn render_time(
        &self,
        element: ElementId,
        utils: &Utils,
        style: RelativeTimeStyle,
        prefix: &str,
    ) -> Option<String> {
        let raw = self.attr(element, "datetime")?;
        match parse_timestamp(&raw) {
            Ok(reference) => {
                let label = utils.relative_time_with(style, reference);
                self.document
                    .borrow_mut()
                    .set_text(element, format!("{prefix}{label}"));
                Some(label)
            }
            Err(e) => {
                warn!(fragment = %self.kind, %element, error = %e, "unparsable datetime, text unchanged");
                None
            }
        }
    }
}
