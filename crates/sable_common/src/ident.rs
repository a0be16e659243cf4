//! Interned names for declarations, modules and instances.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// An interned name.
///
/// Comparing two `Ident`s from the same [`Interner`] is an integer compare,
/// which is what uniqueness checks over module declarations rely on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Creates an `Ident` from a raw index. Intended for tests and serialized data.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw index of this identifier.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Ident` wraps a `u32`; `try_from_usize` rejects indices that do
// not fit, so every key handed out round-trips through `into_usize`.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Ident)
    }
}

/// String interner owned by one output unit.
///
/// Backed by [`lasso::ThreadedRodeo`] so a finished file can be emitted from
/// several reader threads at once.
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates an empty interner.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns `s`, returning the existing [`Ident`] if it was seen before.
    pub fn intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Looks up `s` without interning it.
    pub fn lookup(&self, s: &str) -> Option<Ident> {
        self.rodeo.get(s)
    }

    /// Resolves an [`Ident`] to its text.
    ///
    /// # Panics
    ///
    /// Panics if `ident` came from a different interner.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }

    /// Number of distinct strings interned so far.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Returns `true` if nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_then_resolve() {
        let interner = Interner::new();
        let id = interner.intern("data_in");
        assert_eq!(interner.resolve(id), "data_in");
    }

    #[test]
    fn repeated_intern_is_stable() {
        let interner = Interner::new();
        assert_eq!(interner.intern("clk"), interner.intern("clk"));
        assert_ne!(interner.intern("clk"), interner.intern("rst"));
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn lookup_does_not_intern() {
        let interner = Interner::new();
        assert!(interner.lookup("missing").is_none());
        assert!(interner.is_empty());
        let id = interner.intern("present");
        assert_eq!(interner.lookup("present"), Some(id));
    }

    #[test]
    fn serde_roundtrip() {
        let id = Ident::from_raw(7);
        let json = serde_json::to_string(&id).unwrap();
        let back: Ident = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
