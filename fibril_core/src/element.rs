// Copyright 2026 the Fibril Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Element data: the immutable description of the desired UI.
//!
//! An [`Element`] pairs an [`ElementKind`] with a shared [`Props`] value.
//! Elements are produced fresh on every render and carry no identity beyond
//! structural equality of their kind; the reconciler pairs them with fibers
//! purely by position.
//!
//! # Attribute namespaces
//!
//! Attribute names are split by convention:
//!
//! - Names starting with [`EVENT_PREFIX`] (`"on"`) holding a
//!   [`PropValue::Handler`] are event subscriptions. The suffix, lowercased,
//!   is the host event type (`onClick` → `click`).
//! - Every other name is assigned to the host node as an attribute. Text
//!   elements carry their content in [`TEXT_VALUE`].
//!
//! Children are kept outside the attribute map in [`Props::children`].

use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use crate::hooks::Hooks;

/// Reserved attribute holding a text element's content.
pub const TEXT_VALUE: &str = "nodeValue";

/// Prefix marking an attribute name as an event subscription.
pub const EVENT_PREFIX: &str = "on";

/// The render function of a function component.
///
/// Called with the component's hook context and props while its fiber is
/// being processed; returns the component's child elements.
pub type RenderFn = fn(&mut Hooks<'_>, &Props) -> Vec<Element>;

/// A function component: a named [`RenderFn`].
///
/// Two components are the same kind when they share the same render
/// function. The name is for diagnostics only.
#[derive(Clone, Copy)]
pub struct Component {
    name: &'static str,
    render: RenderFn,
}

impl Component {
    /// Creates a component from a diagnostic name and a render function.
    #[must_use]
    pub const fn new(name: &'static str, render: RenderFn) -> Self {
        Self { name, render }
    }

    /// Returns the diagnostic name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn render(&self, hooks: &mut Hooks<'_>, props: &Props) -> Vec<Element> {
        (self.render)(hooks, props)
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::fn_addr_eq(self.render, other.render)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.name)
    }
}

/// What an element renders to.
#[derive(Clone, Debug, PartialEq)]
pub enum ElementKind {
    /// A host node with the given tag name (e.g. `"div"`).
    Host(Cow<'static, str>),
    /// A primitive text node. Its content is the [`TEXT_VALUE`] attribute.
    Text,
    /// A function component. It owns no host node of its own.
    Component(Component),
}

impl ElementKind {
    /// Returns `true` for function components.
    #[must_use]
    pub const fn is_component(&self) -> bool {
        matches!(self, Self::Component(_))
    }
}

/// A subscribable event callback.
///
/// Handlers compare by identity: two handlers are equal only if they are
/// clones of the same allocation. A handler recreated on every render is
/// therefore re-subscribed on every commit.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn()>);

impl EventHandler {
    /// Wraps a callback.
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invokes the callback.
    pub fn call(&self) {
        (self.0)();
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

/// An attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// A string value.
    Str(String),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// An event handler (only meaningful under an event name).
    Handler(EventHandler),
}

impl PropValue {
    /// Returns the handler if this value is one.
    #[must_use]
    pub const fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            Self::Handler(h) => Some(h),
            _ => None,
        }
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Handler(_) => f.write_str("[handler]"),
        }
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        Self::Handler(value)
    }
}

/// How an attribute maps onto the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Attribute<'a> {
    /// Assign `value` to the host attribute `name`.
    Plain {
        /// Attribute name.
        name: &'a str,
        /// Attribute value.
        value: &'a PropValue,
    },
    /// Subscribe `handler` to the host event `event` (the attribute name
    /// without [`EVENT_PREFIX`]; lowercase it for the host event type).
    Event {
        /// Event name suffix, case preserved.
        event: &'a str,
        /// The subscribed handler.
        handler: &'a EventHandler,
    },
}

impl<'a> Attribute<'a> {
    /// Classifies an attribute by name and value.
    #[must_use]
    pub fn classify(name: &'a str, value: &'a PropValue) -> Self {
        match (event_suffix(name), value.as_handler()) {
            (Some(event), Some(handler)) => Self::Event { event, handler },
            _ => Self::Plain { name, value },
        }
    }
}

/// Returns the part of `name` after [`EVENT_PREFIX`], if `name` is an event
/// attribute name.
#[must_use]
pub fn event_suffix(name: &str) -> Option<&str> {
    name.strip_prefix(EVENT_PREFIX).filter(|rest| !rest.is_empty())
}

/// Returns the host event type for an event attribute name (`onClick` →
/// `click`), or `None` if `name` is not an event attribute name.
#[must_use]
pub fn event_type(name: &str) -> Option<String> {
    event_suffix(name).map(str::to_ascii_lowercase)
}

/// The props of an element: attributes plus the ordered child list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    attributes: BTreeMap<String, PropValue>,
    children: Vec<Element>,
}

impl Props {
    /// Creates empty props.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates props with only children.
    #[must_use]
    pub fn with_children(children: Vec<Element>) -> Self {
        Self {
            attributes: BTreeMap::new(),
            children,
        }
    }

    /// Returns the value of an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.attributes.get(name)
    }

    /// Returns the string value of an attribute, if it is a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.attributes.get(name) {
            Some(PropValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value of an attribute, if it is an integer.
    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.attributes.get(name) {
            Some(PropValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Iterates over attributes in name order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the ordered child elements.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Sets an attribute, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Appends a child element.
    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }
}

/// An immutable UI description node.
///
/// Cloning is cheap: props are shared.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    kind: ElementKind,
    props: Rc<Props>,
}

impl Element {
    /// Creates an element from a kind and props.
    #[must_use]
    pub fn new(kind: ElementKind, props: Props) -> Self {
        Self {
            kind,
            props: Rc::new(props),
        }
    }

    /// Creates a host element with the given tag.
    #[must_use]
    pub fn host(tag: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ElementKind::Host(tag.into()), Props::new())
    }

    /// Creates a text element.
    #[must_use]
    pub fn text(value: impl Into<PropValue>) -> Self {
        let mut props = Props::new();
        props.set(TEXT_VALUE, value);
        Self::new(ElementKind::Text, props)
    }

    /// Creates a function component element.
    #[must_use]
    pub fn component(name: &'static str, render: RenderFn) -> Self {
        Self::new(ElementKind::Component(Component::new(name, render)), Props::new())
    }

    /// Sets an attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        Rc::make_mut(&mut self.props).set(name, value);
        self
    }

    /// Subscribes a handler to an event; `event` is the suffix after
    /// [`EVENT_PREFIX`] (e.g. `"Click"`).
    #[must_use]
    pub fn on(self, event: &str, handler: EventHandler) -> Self {
        let mut name = String::from(EVENT_PREFIX);
        name.push_str(event);
        self.attr(name, handler)
    }

    /// Appends a child.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        Rc::make_mut(&mut self.props).push_child(child);
        self
    }

    /// Appends several children.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        let props = Rc::make_mut(&mut self.props);
        for child in children {
            props.push_child(child);
        }
        self
    }

    /// Appends a text child.
    #[must_use]
    pub fn text_child(self, value: impl Into<PropValue>) -> Self {
        self.child(Self::text(value))
    }

    /// Returns the kind.
    #[must_use]
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Returns the props.
    #[must_use]
    pub fn props(&self) -> &Props {
        &self.props
    }

    pub(crate) fn shared_props(&self) -> &Rc<Props> {
        &self.props
    }
}
