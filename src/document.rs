//! Rendered Document Module
//!
//! A `Document` answers declarative `Query`s with the visible text of every
//! matching node. `HtmlDocument` is the snapshot implementation: page source
//! and title captured from the browser after a navigation settles, parsed
//! with `scraper`, so extraction never holds live element handles.

use crate::error::QueryError;
use scraper::{ElementRef, Html, Selector};

/// Tags whose text is never visible
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Declarative description of candidate nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    /// Every element matching a CSS selector
    Css(&'static str),
    /// Elements (limited to `tags` unless empty) whose own text holds, for
    /// each group in `all_of`, at least one of its needles
    OwnText {
        tags: &'static [&'static str],
        all_of: &'static [&'static [&'static str]],
    },
    /// Own text of elements (limited to `tags`) whose trimmed own text is
    /// exactly `len` characters long
    OwnTextLength {
        tags: &'static [&'static str],
        len: usize,
    },
    /// First element sibling after an element labelled with the text
    LabelNextSibling(&'static str),
    /// Every element sibling after an element labelled with the text
    LabelFollowingSiblings(&'static str),
    /// Element sibling after the labelled element's parent
    LabelParentNextSibling(&'static str),
    /// First non-blank text node after the labelled element's subtree
    LabelFollowingText(&'static str),
    /// Siblings of any element holding the value, minus those holding it
    Near(String),
    /// Document title split on `delimiter`, only if the title contains `requires`
    TitleSegments {
        delimiter: char,
        requires: &'static str,
        exclude: &'static [&'static str],
    },
}

/// Anything the field matcher can search.
pub trait Document {
    /// Visible text of every node the query selects, in document order.
    fn query(&self, query: &Query) -> Result<Vec<String>, QueryError>;

    fn title(&self) -> &str;
}

/// Parsed snapshot of a rendered page
pub struct HtmlDocument {
    html: Html,
    title: String,
}

impl HtmlDocument {
    /// Build from page source. `title` overrides the `<title>` element when
    /// the browser reported one.
    pub fn new(source: &str, title: Option<String>) -> Self {
        let html = Html::parse_document(source);
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| {
                Selector::parse("title")
                    .ok()
                    .and_then(|sel| html.select(&sel).next().map(|t| visible_text(&t)))
                    .unwrap_or_default()
            });
        Self { html, title }
    }

    pub fn parse(source: &str) -> Self {
        Self::new(source, None)
    }

    fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| !is_hidden(el))
    }

    /// Elements whose own text contains the label
    fn labelled<'a>(&'a self, label: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.elements().filter(move |el| own_text(el).contains(label))
    }

    fn following_text(&self, anchor: &ElementRef<'_>) -> Option<String> {
        let mut past = false;
        for node in self.html.root_element().descendants() {
            if node.id() == anchor.id() {
                past = true;
                continue;
            }
            if !past || node.ancestors().any(|a| a.id() == anchor.id()) {
                continue;
            }
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let inside_hidden = node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|a| is_skip_tag(&a));
            if inside_hidden {
                continue;
            }
            let collapsed = collapse_whitespace(text);
            if !collapsed.is_empty() {
                return Some(collapsed);
            }
        }
        None
    }
}

impl Document for HtmlDocument {
    fn query(&self, query: &Query) -> Result<Vec<String>, QueryError> {
        let texts = match query {
            Query::Css(selector) => {
                let sel = Selector::parse(selector).map_err(|e| QueryError::InvalidSelector {
                    selector: selector.to_string(),
                    reason: format!("{:?}", e),
                })?;
                self.html
                    .select(&sel)
                    .filter(|el| !is_hidden(el))
                    .map(|el| visible_text(&el))
                    .collect()
            }
            Query::OwnText { tags, all_of } => self
                .elements()
                .filter(|el| tags.is_empty() || tags.contains(&el.value().name()))
                .filter(|el| {
                    let own = own_text(el);
                    all_of
                        .iter()
                        .all(|group| group.iter().any(|needle| own.contains(needle)))
                })
                .map(|el| visible_text(&el))
                .collect(),
            Query::OwnTextLength { tags, len } => self
                .elements()
                .filter(|el| tags.is_empty() || tags.contains(&el.value().name()))
                .map(|el| collapse_whitespace(&own_text(&el)))
                .filter(|own| own.chars().count() == *len)
                .collect(),
            Query::LabelNextSibling(label) => self
                .labelled(label)
                .filter_map(|el| next_element_sibling(&el))
                .map(|el| visible_text(&el))
                .collect(),
            Query::LabelFollowingSiblings(label) => self
                .labelled(label)
                .flat_map(|el| el.next_siblings().filter_map(ElementRef::wrap))
                .map(|el| visible_text(&el))
                .collect(),
            Query::LabelParentNextSibling(label) => self
                .labelled(label)
                .filter_map(|el| el.parent().and_then(ElementRef::wrap))
                .filter_map(|parent| next_element_sibling(&parent))
                .map(|el| visible_text(&el))
                .collect(),
            Query::LabelFollowingText(label) => self
                .labelled(label)
                .filter_map(|el| self.following_text(&el))
                .collect(),
            Query::Near(value) => {
                if value.trim().is_empty() {
                    return Err(QueryError::EmptyAnchor);
                }
                let mut out = Vec::new();
                for anchor in self.labelled(value) {
                    let Some(parent) = anchor.parent().and_then(ElementRef::wrap) else {
                        continue;
                    };
                    for sibling in parent.children().filter_map(ElementRef::wrap) {
                        let text = visible_text(&sibling);
                        if !text.contains(value.as_str()) {
                            out.push(text);
                        }
                    }
                }
                out
            }
            Query::TitleSegments { delimiter, requires, exclude } => {
                if !self.title.contains(requires) {
                    return Ok(vec![]);
                }
                self.title
                    .split(*delimiter)
                    .map(str::trim)
                    .filter(|part| !exclude.iter().any(|x| part.contains(x)))
                    .map(str::to_string)
                    .collect()
            }
        };
        Ok(texts)
    }

    fn title(&self) -> &str {
        &self.title
    }
}

fn is_skip_tag(el: &ElementRef<'_>) -> bool {
    SKIP_TAGS.contains(&el.value().name())
}

/// The element or one of its ancestors never renders text
fn is_hidden(el: &ElementRef<'_>) -> bool {
    is_skip_tag(el) || el.ancestors().filter_map(ElementRef::wrap).any(|a| is_skip_tag(&a))
}

fn next_element_sibling<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// Text nodes that are direct children of the element
fn own_text(el: &ElementRef<'_>) -> String {
    el.children()
        .filter_map(|child| child.value().as_text().map(|t| &**t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whitespace-collapsed text of the element's subtree, skipping script-like nodes
pub fn visible_text(el: &ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for node in el.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .take_while(|a| a.id() != el.id())
            .filter_map(ElementRef::wrap)
            .any(|a| is_skip_tag(&a));
        if !hidden {
            parts.push(&**text);
        }
    }
    collapse_whitespace(&parts.join(" "))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
