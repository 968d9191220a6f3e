// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM host adapter.
//!
//! [`DomHost`] creates real DOM nodes for the engine. Attributes are written
//! with `setAttribute`, except the text content of text nodes, which goes to
//! `nodeValue`. Event handlers are wrapped in JS closures that the adapter
//! keeps alive until the subscription (or the node) is removed.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use fibril_core::element::TEXT_VALUE;
use fibril_core::{EventHandler, HostAdapter, NodeKind, PropValue};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Element, Node};

type ListenerClosure = Closure<dyn FnMut()>;

struct Listener {
    node: Node,
    event: String,
    handler: EventHandler,
    closure: ListenerClosure,
}

impl Listener {
    fn detach(&self) -> Result<(), JsValue> {
        self.node
            .remove_event_listener_with_callback(&self.event, self.closure.as_ref().unchecked_ref())
    }
}

/// A [`HostAdapter`] over live DOM nodes of one document.
pub struct DomHost {
    document: Document,
    listeners: Vec<Listener>,
}

impl core::fmt::Debug for DomHost {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomHost")
            .field("document", &"Document")
            .field("listeners_len", &self.listeners.len())
            .finish()
    }
}

impl DomHost {
    /// Creates an adapter that creates nodes in `document`.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            listeners: Vec::new(),
        }
    }

    /// Creates an adapter for the document that owns `container`.
    ///
    /// Returns `None` if `container` is itself a document.
    #[must_use]
    pub fn for_container(container: &Element) -> Option<Self> {
        container.owner_document().map(Self::new)
    }

    /// Returns the document nodes are created in.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Returns the number of live event subscriptions.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Detaches and drops every listener registered on `root` or a
    /// descendant of it.
    fn release_listeners(&mut self, root: &Node) -> Result<(), JsValue> {
        let mut kept = Vec::with_capacity(self.listeners.len());
        let mut result = Ok(());
        for listener in self.listeners.drain(..) {
            if root.contains(Some(&listener.node)) {
                if let Err(err) = listener.detach() {
                    result = Err(err);
                }
            } else {
                kept.push(listener);
            }
        }
        self.listeners = kept;
        result
    }
}

fn is_text(node: &Node) -> bool {
    node.node_type() == Node::TEXT_NODE
}

fn as_element(node: &Node) -> Result<&Element, JsValue> {
    node.dyn_ref::<Element>()
        .ok_or_else(|| JsValue::from_str("attribute target is not an element"))
}

impl HostAdapter for DomHost {
    type Node = Node;
    type Error = JsValue;

    fn create_node(&mut self, kind: NodeKind<'_>) -> Result<Node, JsValue> {
        Ok(match kind {
            NodeKind::Element(tag) => self.document.create_element(tag)?.into(),
            NodeKind::Text => self.document.create_text_node("").into(),
        })
    }

    fn set_attribute(&mut self, node: &Node, name: &str, value: &PropValue) -> Result<(), JsValue> {
        if is_text(node) && name == TEXT_VALUE {
            node.set_node_value(Some(&value.to_string()));
            return Ok(());
        }
        as_element(node)?.set_attribute(name, &value.to_string())
    }

    fn remove_attribute(&mut self, node: &Node, name: &str) -> Result<(), JsValue> {
        if is_text(node) && name == TEXT_VALUE {
            node.set_node_value(None);
            return Ok(());
        }
        as_element(node)?.remove_attribute(name)
    }

    fn add_event_subscription(
        &mut self,
        node: &Node,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), JsValue> {
        let call = handler.clone();
        let closure = Closure::wrap(Box::new(move || call.call()) as Box<dyn FnMut()>);
        node.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        self.listeners.push(Listener {
            node: node.clone(),
            event: event.to_string(),
            handler: handler.clone(),
            closure,
        });
        Ok(())
    }

    fn remove_event_subscription(
        &mut self,
        node: &Node,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), JsValue> {
        let position = self.listeners.iter().position(|l| {
            l.event == event && &l.handler == handler && l.node.is_same_node(Some(node))
        });
        let Some(position) = position else {
            return Err(JsValue::from_str("handler is not subscribed"));
        };
        let listener = self.listeners.remove(position);
        listener.detach()
    }

    fn insert_child(
        &mut self,
        parent: &Node,
        child: &Node,
        before: Option<&Node>,
    ) -> Result<(), JsValue> {
        parent.insert_before(child, before).map(drop)
    }

    fn remove_child(&mut self, parent: &Node, child: &Node) -> Result<(), JsValue> {
        parent.remove_child(child)?;
        self.release_listeners(child)
    }
}
