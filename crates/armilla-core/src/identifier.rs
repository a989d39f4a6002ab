//! Identifier management using string interning.
//!
//! Node, container, and collapse-state identifiers are compared and hashed
//! constantly during layout and routing; interning makes those operations
//! cheap symbol copies instead of string comparisons.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner backing [`Id`].
///
/// The interner is append-only; symbols stay valid for the process lifetime.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> std::sync::MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock")
}

/// An interned identifier.
///
/// # Examples
///
/// ```
/// use armilla_core::identifier::Id;
///
/// let a = Id::new("web_server");
/// let b = Id::new("web_server");
/// assert_eq!(a, b);
/// assert_eq!(a.resolved(), "web_server");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `name` and returns its identifier.
    pub fn new(name: &str) -> Self {
        let mut interner = interner();
        Self(interner.get_or_intern(name))
    }

    /// Resolves the identifier back to an owned string.
    pub fn resolved(self) -> String {
        let interner = interner();
        interner
            .resolve(self.0)
            .expect("Symbol should exist in interner")
            .to_owned()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        let resolved = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        f.write_str(resolved)
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        let interner = interner();
        let resolved = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        resolved == other
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
