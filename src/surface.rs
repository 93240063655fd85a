//! Display surface: the container bubbles are rendered into.
//!
//! DESIGN
//! ======
//! Mirrors the host page's `#chat` element: an ordered list of nodes with
//! the newest at the head, plus one injected stylesheet node. Nodes are
//! addressed by attribute value, the same way the page is queried with
//! `div[message-id="…"]` selectors. Every mutation bumps a revision counter
//! so the host bridge can tell when to re-emit the surface.

use std::collections::VecDeque;

use crate::markup::{Node, Raw, render};

/// Well-known id of the bubble container.
pub const DEFAULT_CONTAINER_ID: &str = "chat";

#[derive(Debug, Clone)]
pub struct Surface {
    id: String,
    stylesheet: Option<Node>,
    nodes: VecDeque<Node>,
    revision: u64,
}

impl Surface {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), stylesheet: None, nodes: VecDeque::new(), revision: 0 }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Insert a node before every existing one.
    pub fn prepend(&mut self, node: Node) {
        self.nodes.push_front(node);
        self.revision += 1;
    }

    /// Remove every `div` whose attribute `name` equals `value`, at any depth.
    pub fn remove_by_attr(&mut self, name: &str, value: &str) -> Vec<Node> {
        self.remove_where(|node| is_div_with(node, name, value))
    }

    /// Remove every node matching `pred`, preserving the order of the rest.
    ///
    /// Descendants of kept nodes are searched too. A removed node takes its
    /// subtree with it. Removed nodes come back in document order.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&Node) -> bool) -> Vec<Node> {
        let mut removed = Vec::new();
        let mut kept = VecDeque::with_capacity(self.nodes.len());
        for mut node in self.nodes.drain(..) {
            if pred(&node) {
                removed.push(node);
            } else {
                remove_descendants(&mut node, &mut pred, &mut removed);
                kept.push_back(node);
            }
        }
        self.nodes = kept;
        if !removed.is_empty() {
            self.revision += 1;
        }
        removed
    }

    /// First `div` in document order whose attribute `name` equals `value`.
    #[must_use]
    pub fn find_by_attr(&self, name: &str, value: &str) -> Option<&Node> {
        self.nodes.iter().find_map(|node| find_in(node, name, value))
    }

    /// Nodes head-first.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Replace the injected stylesheet wholesale.
    pub fn set_stylesheet(&mut self, node: Node) {
        self.stylesheet = Some(node);
        self.revision += 1;
    }

    #[must_use]
    pub fn stylesheet(&self) -> Option<&Node> {
        self.stylesheet.as_ref()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Serialize as the stylesheet followed by the container and its nodes.
    #[must_use]
    pub fn to_html(&self) -> String {
        let inner: String = self.nodes.iter().map(Node::to_html).collect();
        let container = render(&[r#"<div id=""#, r#"">"#, "</div>"], &[self.id.as_str().into(), Raw::new(inner).into()]);
        match &self.stylesheet {
            Some(style) => style.to_html() + &container,
            None => container,
        }
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(DEFAULT_CONTAINER_ID)
    }
}

fn is_div_with(node: &Node, name: &str, value: &str) -> bool {
    node.as_element()
        .is_some_and(|el| el.tag == "div" && el.attr(name) == Some(value))
}

fn remove_descendants<F>(node: &mut Node, pred: &mut F, removed: &mut Vec<Node>)
where
    F: FnMut(&Node) -> bool,
{
    let Node::Element(el) = node else {
        return;
    };
    let mut kept = Vec::with_capacity(el.children.len());
    for mut child in el.children.drain(..) {
        if pred(&child) {
            removed.push(child);
        } else {
            remove_descendants(&mut child, pred, removed);
            kept.push(child);
        }
    }
    el.children = kept;
}

fn find_in<'a>(node: &'a Node, name: &str, value: &str) -> Option<&'a Node> {
    if is_div_with(node, name, value) {
        return Some(node);
    }
    node.as_element()?
        .children
        .iter()
        .find_map(|child| find_in(child, name, value))
}

#[cfg(test)]
#[path = "surface_test.rs"]
mod tests;
