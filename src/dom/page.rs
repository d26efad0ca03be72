use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Document, ElementId, Viewport};

#[derive(Debug, Error)]
pub enum PageError {
    #[error("Failed to read page file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse page file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Declarative element tree, as written in a page file or built in tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub class: Vec<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<ElementSpec>,
}

fn default_tag() -> String {
    "div".to_string()
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.class.push(class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// A whole page: viewport, visibility and the elements under `body`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
}

impl PageSpec {
    pub fn load(path: &Path) -> Result<Self, PageError> {
        let content = fs::read_to_string(path).map_err(|e| PageError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| PageError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new(self.viewport);
        doc.set_hidden(self.hidden);
        let body = doc.body();
        for spec in &self.elements {
            doc.build(body, spec);
        }
        doc
    }
}

impl Document {
    /// Materialise `spec` as the last child of `parent`.
    pub fn build(&mut self, parent: ElementId, spec: &ElementSpec) -> ElementId {
        let id = self.create_element(&spec.tag);
        for class in &spec.class {
            self.add_class(id, class);
        }
        for (name, value) in &spec.attrs {
            self.set_attr(id, name, value.as_str());
        }
        if let Some(text) = &spec.text {
            self.set_text(id, text.as_str());
        }
        for child in &spec.children {
            self.build(id, child);
        }
        self.append_child(parent, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_file_round_trips_into_document() {
        let page: PageSpec = toml::from_str(
            r#"
hidden = true

[viewport]
width = 600
height = 900

[[elements]]
class = ["news-card"]
attrs = { "data-layout" = "horizontal" }

[[elements.children]]
tag = "time"
class = ["news-card__time"]
attrs = { datetime = "2025-01-01T00:00:00Z" }
text = "1 Jan"
"#,
        )
        .unwrap();

        let doc = page.to_document();
        assert!(doc.is_hidden());
        assert_eq!(doc.viewport().width, 600);

        let card = doc.query_all("news-card")[0];
        assert_eq!(doc.attr(card, "data-layout"), Some("horizontal"));
        let time = doc.query_within(card, "news-card__time").unwrap();
        assert_eq!(doc.element(time).unwrap().tag, "time");
        assert_eq!(doc.text(time), "1 Jan");
    }
}
