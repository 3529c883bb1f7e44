use std::ops::Not;

/// SQL three-valued truth. `Unknown` is what a comparison against a
/// missing value yields; it is neither true nor false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tri {
    True,
    False,
    Unknown,
}

impl Tri {
    pub fn from_bool(value: bool) -> Tri {
        if value { Tri::True } else { Tri::False }
    }

    pub fn from_option(value: Option<bool>) -> Tri {
        value.map_or(Tri::Unknown, Tri::from_bool)
    }

    pub fn to_option(self) -> Option<bool> {
        match self {
            Tri::True => Some(true),
            Tri::False => Some(false),
            Tri::Unknown => None,
        }
    }

    pub fn is_true(self) -> bool {
        self == Tri::True
    }

    pub fn and(self, other: Tri) -> Tri {
        match (self, other) {
            (Tri::False, _) | (_, Tri::False) => Tri::False,
            (Tri::True, Tri::True) => Tri::True,
            _ => Tri::Unknown,
        }
    }

    pub fn or(self, other: Tri) -> Tri {
        match (self, other) {
            (Tri::True, _) | (_, Tri::True) => Tri::True,
            (Tri::False, Tri::False) => Tri::False,
            _ => Tri::Unknown,
        }
    }

    /// Kleene AND over an already evaluated sequence.
    pub fn all<I: IntoIterator<Item = Tri>>(values: I) -> Tri {
        values.into_iter().fold(Tri::True, Tri::and)
    }

    pub fn any<I: IntoIterator<Item = Tri>>(values: I) -> Tri {
        values.into_iter().fold(Tri::False, Tri::or)
    }
}

impl Not for Tri {
    type Output = Tri;

    fn not(self) -> Tri {
        match self {
            Tri::True => Tri::False,
            Tri::False => Tri::True,
            Tri::Unknown => Tri::Unknown,
        }
    }
}

impl From<bool> for Tri {
    fn from(value: bool) -> Self {
        Tri::from_bool(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Tri::*;

    #[test]
    fn kleene_truth_tables() {
        assert_eq!(Unknown.and(False), False);
        assert_eq!(Unknown.and(True), Unknown);
        assert_eq!(True.and(Unknown), Unknown);
        assert_eq!(Unknown.or(True), True);
        assert_eq!(Unknown.or(False), Unknown);
        assert_eq!(!Unknown, Unknown);
        assert_eq!(!True, False);
    }

    #[test]
    fn folds() {
        assert_eq!(Tri::all([True, Unknown, False]), False);
        assert_eq!(Tri::all([True, Unknown]), Unknown);
        assert_eq!(Tri::any([False, Unknown, True]), True);
        assert_eq!(Tri::any(Vec::new()), False);
    }
}
