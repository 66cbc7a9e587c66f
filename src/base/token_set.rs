//! Small sets of element types used as child filters.

use super::ElementType;

/// An unordered set of element types.
///
/// Sets are tiny (a handful of token kinds), so membership is a linear scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    types: Vec<ElementType>,
}

impl TokenSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of(types: &[ElementType]) -> Self {
        let mut set = Self::empty();
        for ty in types {
            set.insert(*ty);
        }
        set
    }

    pub fn insert(&mut self, ty: ElementType) {
        if !self.contains(ty) {
            self.types.push(ty);
        }
    }

    pub fn contains(&self, ty: ElementType) -> bool {
        self.types.contains(&ty)
    }

    pub fn union(&self, other: &TokenSet) -> TokenSet {
        let mut result = self.clone();
        for ty in &other.types {
            result.insert(*ty);
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ElementType> + '_ {
        self.types.iter().copied()
    }
}
