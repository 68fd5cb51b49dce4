/// In-memory document model for the grid
///
/// The grid core never talks to a browser. It reads and writes a small element
/// tree instead: elements with a tag, attributes and children, where children
/// are either elements or text. Handles are `Rc<RefCell<Element>>`, so a row
/// element placed in the body on one draw is the same object on the next.
///
/// # Examples
///
/// ```
/// use livegrid::dom::{build_table, Element};
///
/// let table = build_table(&["Name"], &[vec!["Alice".to_string()]]);
/// let body = Element::first_child_by_tag(&table, "tbody").unwrap();
/// assert_eq!(body.borrow().text_content(), "Alice");
/// ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Shared handle to an element.
pub type ElementRef = Rc<RefCell<Element>>;

#[derive(Debug, Clone)]
pub enum Node {
    Element(ElementRef),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&ElementRef> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            tag: tag.into().to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Create an element and wrap it in a shared handle.
    pub fn new_ref(tag: impl Into<String>) -> ElementRef {
        Rc::new(RefCell::new(Element::new(tag)))
    }

    /// Create `<tag>text</tag>` as a shared handle.
    pub fn with_text(tag: impl Into<String>, text: impl Into<String>) -> ElementRef {
        let mut el = Element::new(tag);
        el.append_text(text);
        Rc::new(RefCell::new(el))
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn append_child(&mut self, node: Node) {
        self.children.push(node);
    }

    pub fn append_element(&mut self, el: ElementRef) {
        self.children.push(Node::Element(el));
    }

    pub fn append_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Swap out every child in one step.
    pub fn replace_children(&mut self, nodes: Vec<Node>) {
        self.children = nodes;
    }

    /// Direct element children whose tag is one of `tags`.
    pub fn child_elements_by_tag(&self, tags: &[&str]) -> Vec<ElementRef> {
        self.children
            .iter()
            .filter_map(Node::as_element)
            .filter(|el| tags.contains(&el.borrow().tag()))
            .cloned()
            .collect()
    }

    pub fn has_element_children(&self) -> bool {
        self.children.iter().any(|n| matches!(n, Node::Element(_)))
    }

    /// First direct child of `el` with the given tag.
    pub fn first_child_by_tag(el: &ElementRef, tag: &str) -> Option<ElementRef> {
        el.borrow().child_elements_by_tag(&[tag]).into_iter().next()
    }

    /// Concatenated text of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.borrow().collect_text(out),
            }
        }
    }

    /// Serialized markup of the children.
    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(&html_escape::encode_text(text)),
                Node::Element(el) => el.borrow().write_outer_html(&mut out),
            }
        }
        out
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.write_outer_html(&mut out);
        out
    }

    fn write_outer_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&html_escape::encode_double_quoted_attribute(value));
            out.push('"');
        }
        out.push('>');
        out.push_str(&self.inner_html());
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }

    /// Hidden via the `hidden` attribute or an inline `display: none`.
    pub fn is_hidden(&self) -> bool {
        if self.attributes.contains_key("hidden") {
            return true;
        }
        self.attribute("style")
            .map(|style| {
                style
                    .split(';')
                    .filter_map(|decl| decl.split_once(':'))
                    .any(|(prop, value)| {
                        prop.trim().eq_ignore_ascii_case("display")
                            && value.trim().eq_ignore_ascii_case("none")
                    })
            })
            .unwrap_or(false)
    }
}

/// Build `<table><thead><tr><th>..</th></tr></thead><tbody>..</tbody></table>`.
pub fn build_table(headers: &[&str], rows: &[Vec<String>]) -> ElementRef {
    let table = Element::new_ref("table");

    let thead = Element::new_ref("thead");
    let header_row = Element::new_ref("tr");
    for title in headers {
        header_row.borrow_mut().append_element(Element::with_text("th", *title));
    }
    thead.borrow_mut().append_element(header_row);

    let tbody = Element::new_ref("tbody");
    for row in rows {
        let tr = Element::new_ref("tr");
        for value in row {
            tr.borrow_mut().append_element(Element::with_text("td", value.as_str()));
        }
        tbody.borrow_mut().append_element(tr);
    }

    table.borrow_mut().append_element(thead);
    table.borrow_mut().append_element(tbody);
    table
}
