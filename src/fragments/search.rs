use crate::bus::Notification;
use crate::dom::{ElementId, SharedDocument};
use crate::lifecycle::{FragmentContext, FragmentType, InstanceResources};
use crate::util::Debounced;

/// Search input shared by the header and the navigation menu.
pub(crate) struct SearchBox {
    document: SharedDocument,
    input: ElementId,
    suggest: Debounced<String>,
}

impl SearchBox {
    pub(crate) fn new(
        ctx: &FragmentContext,
        resources: &InstanceResources,
        source: FragmentType,
        input: ElementId,
    ) -> Self {
        let bus = ctx.bus.clone();
        let suggest = resources.debounce(ctx.timing.search_debounce(), move |query: String| {
            bus.emit(Notification::SearchSuggestion {
                source,
                element: input,
                query,
            });
        });
        Self {
            document: ctx.document.clone(),
            input,
            suggest,
        }
    }

    pub(crate) fn input(&self) -> ElementId {
        self.input
    }

    /// Suggestions start at three characters; anything shorter drops the
    /// pending one.
    pub(crate) fn on_input(&self, value: &str) {
        let query = value.trim();
        if query.chars().count() > 2 {
            self.suggest.call(query.to_string());
        } else {
            self.suggest.cancel();
        }
    }

    pub(crate) fn clear(&self) {
        self.suggest.cancel();
        self.document.borrow_mut().set_attr(self.input, "value", "");
    }

    /// Trimmed, non-empty query.
    pub(crate) fn query(&self) -> Option<String> {
        let doc = self.document.borrow();
        let query = doc.attr(self.input, "value").unwrap_or_default().trim();
        (!query.is_empty()).then(|| query.to_string())
    }

    pub(crate) fn cancel(&self) {
        self.suggest.cancel();
    }
}
