//! The immutable description tree consumed by the reconciler.
//!
//! [`Element`]s are pure data produced by whatever front end assembles the UI
//! description; the reconciler only ever reads them. Prop classification
//! (plain value vs. event handler vs. the reserved children list) is decided
//! once, here, at construction time, so the diff step never has to inspect
//! prop names.

use core::fmt::{self, Debug, Display};
use std::rc::Rc;

/// The prop-name prefix that marks an event subscription, e.g. `onClick`.
pub const EVENT_PREFIX: &str = "on";

/// The node type of an [`Element`]: a host tag or the reserved text leaf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tag {
	/// A host element, identified by its tag name (e.g. `"div"`).
	Host(Box<str>),
	/// The reserved text-leaf tag. Text leaves carry their content in the
	/// `nodeValue` prop and never have children.
	Text,
}

/// A plain property value. Compared by value; no deep comparison exists
/// because none is needed.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
	Str(Box<str>),
	Int(i64),
	Float(f64),
	Bool(bool),
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::Str(value.into())
	}
}
impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::Str(value.into())
	}
}
impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Int(value)
	}
}
impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Float(value)
	}
}
impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Str(value) => Display::fmt(value, f),
			Value::Int(value) => Display::fmt(value, f),
			Value::Float(value) => Display::fmt(value, f),
			Value::Bool(value) => Display::fmt(value, f),
		}
	}
}

/// A shared event-handler closure.
///
/// Handlers are compared by reference identity, never by behavior: replacing
/// a handler with a different closure of identical behavior still counts as
/// a change and causes a remove-then-add of the subscription.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn()>);

impl EventHandler {
	pub fn new(handler: impl 'static + Fn()) -> Self {
		Self(Rc::new(handler))
	}

	/// Invokes the handler. Called by hosts when the subscribed event fires;
	/// the reconciler itself never calls handlers.
	pub fn call(&self) {
		(self.0)();
	}
}

impl Debug for EventHandler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0).cast::<()>())
	}
}

impl PartialEq for EventHandler {
	fn eq(&self, other: &Self) -> bool {
		// Compare data pointers only; vtable addresses aren't stable.
		core::ptr::eq(
			Rc::as_ptr(&self.0).cast::<()>(),
			Rc::as_ptr(&other.0).cast::<()>(),
		)
	}
}

/// A prop, already classified at construction.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PropEntry {
	Value(Value),
	Handler {
		/// The host event name derived from the prop name (`onClick` → `click`).
		event: Box<str>,
		handler: EventHandler,
	},
}

/// A small ordered mapping from prop name to classified value.
///
/// Order is preserved so that mutations are applied deterministically; lookup
/// is linear, which is the right trade-off for the handful of props a node
/// typically carries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
	entries: Vec<(Box<str>, PropEntry)>,
}

impl Props {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a plain property.
	///
	/// The reserved `children` key is rejected: child elements are structured
	/// data on [`Element`], never a prop applied to output nodes.
	#[must_use]
	pub fn value(mut self, name: &str, value: impl Into<Value>) -> Self {
		debug_assert!(name != "children", "`children` is a reserved prop name");
		debug_assert!(self.get(name).is_none(), "duplicate prop name: {:?}", name);
		self.entries.push((name.into(), PropEntry::Value(value.into())));
		self
	}

	/// Adds an event subscription under its prop name, e.g. `onClick`.
	///
	/// The host event name is derived here, once: the [`EVENT_PREFIX`] is
	/// stripped and the remainder lowercased per host convention.
	#[must_use]
	pub fn handler(mut self, name: &str, handler: EventHandler) -> Self {
		debug_assert!(
			name.starts_with(EVENT_PREFIX),
			"event props follow the `on` naming convention: {:?}",
			name
		);
		debug_assert!(self.get(name).is_none(), "duplicate prop name: {:?}", name);
		let event = name
			.strip_prefix(EVENT_PREFIX)
			.unwrap_or(name)
			.to_ascii_lowercase();
		self.entries.push((
			name.into(),
			PropEntry::Handler {
				event: event.into(),
				handler,
			},
		));
		self
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &PropEntry)> {
		self.entries.iter().map(|(name, entry)| (&**name, entry))
	}

	pub(crate) fn get(&self, name: &str) -> Option<&PropEntry> {
		self.entries
			.iter()
			.find(|(entry_name, _)| &**entry_name == name)
			.map(|(_, entry)| entry)
	}
}

/// One immutable node of the description tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
	tag: Tag,
	props: Props,
	children: Vec<Element>,
}

impl Element {
	/// Builds a host-element description.
	#[must_use]
	pub fn host(tag: &str, props: Props, children: Vec<Element>) -> Self {
		Self {
			tag: Tag::Host(tag.into()),
			props,
			children,
		}
	}

	/// Builds a text-leaf description, normalizing any displayable value.
	///
	/// The content travels in the `nodeValue` prop and reaches the output
	/// tree through the ordinary property-delta path.
	#[must_use]
	pub fn text(value: impl Display) -> Self {
		Self {
			tag: Tag::Text,
			props: Props::new().value("nodeValue", value.to_string()),
			children: Vec::new(),
		}
	}

	#[must_use]
	pub fn tag(&self) -> &Tag {
		&self.tag
	}

	#[must_use]
	pub fn props(&self) -> &Props {
		&self.props
	}

	#[must_use]
	pub fn children(&self) -> &[Element] {
		&self.children
	}

	pub(crate) fn into_parts(self) -> (Tag, Props, Vec<Element>) {
		(self.tag, self.props, self.children)
	}
}

impl From<&str> for Element {
	fn from(value: &str) -> Self {
		Element::text(value)
	}
}
impl From<String> for Element {
	fn from(value: String) -> Self {
		Element::text(value)
	}
}
