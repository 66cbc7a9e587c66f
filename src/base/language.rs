//! Language identity and dialect relationships.

use std::fmt;

/// A language (or dialect) that syntax trees can be written in.
///
/// Languages are declared as `static` items. A dialect names its base language,
/// and [`Language::is_kind_of`] follows that chain.
pub struct Language {
    id: &'static str,
    base: Option<&'static Language>,
}

impl Language {
    /// Declare a root language.
    pub const fn new(id: &'static str) -> Self {
        Self { id, base: None }
    }

    /// Declare a dialect of `base`.
    pub const fn dialect(id: &'static str, base: &'static Language) -> Self {
        Self {
            id,
            base: Some(base),
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn base(&self) -> Option<&'static Language> {
        self.base
    }

    /// Returns true if `self` is `other` or a (transitive) dialect of it.
    pub fn is_kind_of(&self, other: &Language) -> bool {
        let mut current = Some(self);
        while let Some(language) = current {
            if language == other {
                return true;
            }
            current = language.base;
        }
        false
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Language {}

impl std::hash::Hash for Language {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Language({})", self.id)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static BASE: Language = Language::new("base");
    static DIALECT: Language = Language::dialect("dialect", &BASE);
    static NESTED: Language = Language::dialect("nested", &DIALECT);
    static OTHER: Language = Language::new("other");

    #[test]
    fn test_is_kind_of_is_reflexive() {
        assert!(BASE.is_kind_of(&BASE));
        assert!(OTHER.is_kind_of(&OTHER));
    }

    #[test]
    fn test_is_kind_of_follows_base_chain() {
        assert!(DIALECT.is_kind_of(&BASE));
        assert!(NESTED.is_kind_of(&BASE));
        assert!(!BASE.is_kind_of(&DIALECT));
        assert!(!NESTED.is_kind_of(&OTHER));
    }
}
