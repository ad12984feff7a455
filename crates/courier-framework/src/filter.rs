//! Attribute filter chains.
//!
//! A [`FilterChain`] is an ordered AND-sequence of `(attribute, pattern)`
//! links. Links are only ever appended, so evaluation order is the order in
//! which they were added, and evaluation stops at the first link that does
//! not match.
//!
//! Chains are built once at configuration time and then shared read-only
//! between concurrent invocations.
//!
//! ```rust,ignore
//! let chain = FilterChain::link("type", r"^com\.example\.")?
//!     .with_link("source", "^/orders")?;
//!
//! assert!(chain.filter_envelope(&event));
//! ```

use courier_core::{Envelope, MessageError, MessageResult};
use regex::Regex;
use tracing::trace;

/// A single `(attribute, pattern)` predicate.
#[derive(Debug, Clone)]
pub struct FilterLink {
    attribute_name: String,
    pattern: Regex,
}

impl FilterLink {
    /// Compiles a link. Fails if the attribute name is blank or the pattern
    /// is not a valid regular expression.
    pub fn new(attribute_name: impl Into<String>, pattern: &str) -> MessageResult<Self> {
        let attribute_name = attribute_name.into();
        if attribute_name.trim().is_empty() {
            return Err(MessageError::validation(
                "filter attribute name required",
                "attributeName",
            ));
        }
        let pattern = Regex::new(pattern).map_err(|e| {
            MessageError::validation(
                format!("invalid filter pattern: {e}"),
                attribute_name.as_str(),
            )
        })?;
        Ok(Self {
            attribute_name,
            pattern,
        })
    }

    /// The attribute this link inspects.
    pub fn attribute_name(&self) -> &str {
        &self.attribute_name
    }

    /// The pattern source.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Returns `true` if `value` matches this link's pattern.
    pub fn matches(&self, value: &str) -> bool {
        self.pattern.is_match(value)
    }
}

/// An append-only AND-chain of [`FilterLink`]s.
///
/// An empty chain accepts everything.
#[derive(Debug, Clone, Default)]
pub struct FilterChain {
    links: Vec<FilterLink>,
}

impl FilterChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a single-link chain.
    pub fn link(attribute_name: impl Into<String>, pattern: &str) -> MessageResult<Self> {
        Ok(Self {
            links: vec![FilterLink::new(attribute_name, pattern)?],
        })
    }

    /// Appends a compiled link at the tail.
    pub fn push(&mut self, link: FilterLink) {
        self.links.push(link);
    }

    /// Compiles and appends a link at the tail.
    pub fn add_link(
        &mut self,
        attribute_name: impl Into<String>,
        pattern: &str,
    ) -> MessageResult<()> {
        self.push(FilterLink::new(attribute_name, pattern)?);
        Ok(())
    }

    /// Builder-style [`add_link`](Self::add_link).
    pub fn with_link(
        mut self,
        attribute_name: impl Into<String>,
        pattern: &str,
    ) -> MessageResult<Self> {
        self.add_link(attribute_name, pattern)?;
        Ok(self)
    }

    /// Appends every link of `other` after this chain's tail.
    pub fn append(&mut self, other: FilterChain) {
        self.links.extend(other.links);
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Returns `true` if the chain has no links.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// The link at `index`, head first.
    pub fn get(&self, index: usize) -> Option<&FilterLink> {
        self.links.get(index)
    }

    /// The last link, if any.
    pub fn tail(&self) -> Option<&FilterLink> {
        self.links.last()
    }

    /// Iterates over links, head first.
    pub fn links(&self) -> impl Iterator<Item = &FilterLink> {
        self.links.iter()
    }

    /// Returns `true` if every link's pattern matches `value`.
    pub fn do_filter(&self, value: &str) -> bool {
        self.links.iter().all(|link| link.matches(value))
    }

    /// Returns `true` if every link matches the envelope attribute it names.
    ///
    /// A missing attribute counts as a non-match.
    pub fn filter_envelope<E: Envelope>(&self, envelope: &E) -> bool {
        self.first_rejecting(envelope).is_none()
    }

    /// Returns the first link the envelope fails, if any.
    pub fn first_rejecting<E: Envelope>(&self, envelope: &E) -> Option<&FilterLink> {
        self.links.iter().find(|link| {
            let matched = envelope
                .attribute(link.attribute_name())
                .is_some_and(|value| link.matches(&value));
            trace!(
                attribute = link.attribute_name(),
                pattern = link.pattern(),
                matched,
                "Evaluated filter link"
            );
            !matched
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::CloudEvent;

    fn event() -> CloudEvent {
        CloudEvent::builder("com.example.order.created", "/orders/eu")
            .subject("order-1")
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_chain_accepts_everything() {
        let chain = FilterChain::new();
        assert!(chain.do_filter("anything"));
        assert!(chain.filter_envelope(&event()));
    }

    #[test]
    fn test_single_link() {
        let chain = FilterChain::link("value", "^abc").unwrap();
        assert!(chain.do_filter("abcdef"));
        assert!(!chain.do_filter("xabc"));
    }

    #[test]
    fn test_all_links_must_match() {
        let chain = FilterChain::link("value", "a")
            .unwrap()
            .with_link("value", "b")
            .unwrap();
        assert!(chain.do_filter("ab"));
        assert!(!chain.do_filter("a"));
        assert!(!chain.do_filter("b"));
    }

    #[test]
    fn test_links_append_at_tail() {
        let mut chain = FilterChain::link("a", "A").unwrap();
        chain.append(FilterChain::link("b", "B").unwrap());
        chain.add_link("c", "C").unwrap();

        let names: Vec<_> = chain.links().map(FilterLink::attribute_name).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(chain.get(2).map(FilterLink::attribute_name), Some("c"));
        assert_eq!(chain.tail().map(FilterLink::pattern), Some("C"));
    }

    #[test]
    fn test_invalid_links_fail_validation() {
        let err = FilterChain::link("type", "(").unwrap_err();
        assert_eq!(err.attribute(), Some("type"));

        let err = FilterChain::new().add_link("  ", ".*").unwrap_err();
        assert_eq!(err.attribute(), Some("attributeName"));
    }

    #[test]
    fn test_filter_envelope_attributes() {
        let chain = FilterChain::link("type", r"^com\.example\.")
            .unwrap()
            .with_link("source", "^/orders")
            .unwrap();
        assert!(chain.filter_envelope(&event()));

        let chain = chain.with_link("source", "/us$").unwrap();
        assert!(!chain.filter_envelope(&event()));
        assert_eq!(chain.first_rejecting(&event()).map(FilterLink::pattern), Some("/us$"));
    }

    #[test]
    fn test_missing_attribute_is_non_match() {
        let event = CloudEvent::builder("t", "s").build().unwrap();
        let chain = FilterChain::link("subject", ".*").unwrap();
        assert!(!chain.filter_envelope(&event));
    }
}
