//! Shape identifier resolution.
//!
//! The registry maps canonical shape identifiers (and recognized aliases) to
//! [`ShapeDefinition`] capabilities. It is built once during single-threaded
//! startup and then shared read-only across compiles; `Arc<ShapeRegistry>`
//! is `Send + Sync`.
//!
//! Resolution is case-insensitive. Unknown identifiers get typo correction:
//! a pure edit-distance scan over the canonical identifiers, ties broken by
//! registration order, so the suggestions are deterministic and unit-testable
//! with no UI involved.

use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::shape::{
    Cylinder, Diamond, Ellipse, Hexagon, Rectangle, Rounded, ShapeDefinition,
};

/// Suggestions are offered only within this edit distance.
const SUGGESTION_DISTANCE: usize = 2;

/// At most this many suggestions appear in one error message.
const MAX_SUGGESTIONS: usize = 2;

/// A successful identifier resolution.
pub struct Resolution<'a> {
    definition: &'a Arc<dyn ShapeDefinition>,
    canonical: &'a str,
    via_alias: Option<&'a str>,
}

impl std::fmt::Debug for Resolution<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("canonical", &self.canonical)
            .field("via_alias", &self.via_alias)
            .finish_non_exhaustive()
    }
}

impl<'a> Resolution<'a> {
    pub fn definition(&self) -> &'a Arc<dyn ShapeDefinition> {
        self.definition
    }

    pub fn canonical(&self) -> &'a str {
        self.canonical
    }

    /// The alias that matched, when the identifier was not the canonical id.
    ///
    /// Callers surface this as an informational hint nudging toward the
    /// canonical spelling; it is never an error.
    pub fn via_alias(&self) -> Option<&'a str> {
        self.via_alias
    }
}

/// Resolution failure, with typo suggestions when close matches exist.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown shape type '{input}', did you mean: {}", suggestions.join(", "))]
    UnknownWithSuggestions {
        input: String,
        suggestions: Vec<String>,
    },
    #[error("unknown shape type '{input}'")]
    Unknown { input: String },
}

/// Registry of shape capabilities keyed by canonical identifier.
#[derive(Default)]
pub struct ShapeRegistry {
    shapes: IndexMap<String, Arc<dyn ShapeDefinition>>,
    aliases: IndexMap<String, String>,
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry populated with the built-in catalog sample.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Rectangle));
        registry.register(Arc::new(Rounded));
        registry.register(Arc::new(Ellipse));
        registry.register(Arc::new(Diamond));
        registry.register(Arc::new(Hexagon));
        registry.register(Arc::new(Cylinder));

        registry.register_alias("rect", "rectangle");
        registry.register_alias("box", "rectangle");
        registry.register_alias("rounded-rectangle", "rounded");
        registry.register_alias("oval", "ellipse");
        registry.register_alias("circle", "ellipse");
        registry.register_alias("rhombus", "diamond");
        registry.register_alias("database", "cylinder");
        registry.register_alias("db", "cylinder");

        registry
    }

    /// Registers a capability under its canonical identifier.
    ///
    /// Registration happens during startup only; re-registering an
    /// identifier replaces the earlier capability.
    pub fn register(&mut self, definition: Arc<dyn ShapeDefinition>) {
        self.shapes
            .insert(definition.name().to_ascii_lowercase(), definition);
    }

    /// Registers an alias for an already-registered canonical identifier.
    ///
    /// # Panics
    ///
    /// Panics if the canonical identifier is not registered; aliases for
    /// missing shapes are a startup programming error.
    pub fn register_alias(&mut self, alias: &str, canonical: &str) {
        let canonical = canonical.to_ascii_lowercase();
        assert!(
            self.shapes.contains_key(&canonical),
            "alias '{alias}' targets unregistered shape '{canonical}'"
        );
        self.aliases.insert(alias.to_ascii_lowercase(), canonical);
    }

    /// Canonical identifiers in registration order.
    pub fn canonical_ids(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(String::as_str)
    }

    /// Resolves an identifier to its capability.
    pub fn resolve(&self, identifier: &str) -> Result<Resolution<'_>, ResolveError> {
        let normalized = identifier.trim().to_ascii_lowercase();

        if let Some((canonical, definition)) = self.shapes.get_key_value(&normalized) {
            return Ok(Resolution {
                definition,
                canonical: canonical.as_str(),
                via_alias: None,
            });
        }

        if let Some((alias, canonical)) = self.aliases.get_key_value(&normalized) {
            let (canonical, definition) = self
                .shapes
                .get_key_value(canonical)
                .expect("alias registration guarantees the canonical entry");
            return Ok(Resolution {
                definition,
                canonical: canonical.as_str(),
                via_alias: Some(alias.as_str()),
            });
        }

        let suggestions = self.suggestions_for(&normalized);
        if suggestions.is_empty() {
            Err(ResolveError::Unknown {
                input: identifier.trim().to_string(),
            })
        } else {
            Err(ResolveError::UnknownWithSuggestions {
                input: identifier.trim().to_string(),
                suggestions,
            })
        }
    }

    /// Canonical identifiers within the suggestion distance, nearest first,
    /// ties in registration order.
    fn suggestions_for(&self, normalized: &str) -> Vec<String> {
        let mut best_distance = usize::MAX;
        let mut suggestions: Vec<(usize, &str)> = Vec::new();

        for canonical in self.canonical_ids() {
            let distance = levenshtein(normalized, canonical);
            if distance <= SUGGESTION_DISTANCE {
                best_distance = best_distance.min(distance);
                suggestions.push((distance, canonical));
            }
        }

        suggestions
            .into_iter()
            .filter(|(distance, _)| *distance == best_distance)
            .map(|(_, canonical)| canonical.to_string())
            .take(MAX_SUGGESTIONS)
            .collect()
    }
}

/// Classic two-row Levenshtein distance.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, &char_a) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &char_b) in b.iter().enumerate() {
            let substitution_cost = usize::from(char_a != char_b);
            current[j + 1] = (previous[j] + substitution_cost)
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("rectangel", "rectangle"), 2);
    }

    #[test]
    fn resolves_canonical_case_insensitively() {
        let registry = ShapeRegistry::with_builtins();
        let resolution = registry.resolve("Rectangle").unwrap();
        assert_eq!(resolution.canonical(), "rectangle");
        assert!(resolution.via_alias().is_none());
    }

    #[test]
    fn alias_resolution_carries_a_hint() {
        let registry = ShapeRegistry::with_builtins();
        let resolution = registry.resolve("db").unwrap();
        assert_eq!(resolution.canonical(), "cylinder");
        assert_eq!(resolution.via_alias(), Some("db"));
    }

    #[test]
    fn close_misses_get_suggestions() {
        let registry = ShapeRegistry::with_builtins();
        let err = registry.resolve("rectangel").unwrap_err();
        match err {
            ResolveError::UnknownWithSuggestions { suggestions, .. } => {
                assert_eq!(suggestions, vec!["rectangle".to_string()]);
            }
            other => panic!("expected suggestions, got {other:?}"),
        }
    }

    #[test]
    fn distant_misses_get_plain_error() {
        let registry = ShapeRegistry::with_builtins();
        let err = registry.resolve("trapezoid-cloud").unwrap_err();
        assert_eq!(
            err,
            ResolveError::Unknown {
                input: "trapezoid-cloud".to_string()
            }
        );
    }

    #[test]
    fn suggestion_message_mentions_candidates() {
        let registry = ShapeRegistry::with_builtins();
        let err = registry.resolve("elipse").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unknown shape type 'elipse'"));
        assert!(message.contains("did you mean: ellipse"));
    }

    #[test]
    fn ties_break_by_registration_order() {
        #[derive(Debug)]
        struct Named(&'static str);
        impl ShapeDefinition for Named {
            fn name(&self) -> &'static str {
                self.0
            }
            fn bounds(&self, _ctx: &crate::shape::ShapeContext<'_>) -> crate::geometry::Size {
                crate::geometry::Size::new(10.0, 10.0)
            }
            fn render(
                &self,
                _ctx: &crate::shape::ShapeContext<'_>,
                _position: crate::geometry::Point,
                _size: crate::geometry::Size,
            ) -> crate::draw::LayeredOutput {
                crate::draw::LayeredOutput::new()
            }
        }

        let mut registry = ShapeRegistry::new();
        registry.register(Arc::new(Named("cart")));
        registry.register(Arc::new(Named("card")));

        // "carp" is distance 1 from both; the first-registered id leads.
        let err = registry.resolve("carp").unwrap_err();
        match err {
            ResolveError::UnknownWithSuggestions { suggestions, .. } => {
                assert_eq!(suggestions, vec!["cart".to_string(), "card".to_string()]);
            }
            other => panic!("expected suggestions, got {other:?}"),
        }
    }

    #[test]
    fn resolution_is_deterministic() {
        let registry = ShapeRegistry::with_builtins();
        let a = format!("{:?}", registry.resolve("squircle").unwrap_err());
        let b = format!("{:?}", registry.resolve("squircle").unwrap_err());
        assert_eq!(a, b);
    }
}
