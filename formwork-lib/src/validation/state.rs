use serde::{Deserialize, Serialize};

/// Aggregate validity of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValidationState {
    /// Not evaluated yet (detached node or fresh array element).
    #[default]
    Pending,
    /// The node and everything below it pass.
    Valid,
    /// The node or something below it fails.
    Invalid,
}

impl ValidationState {
    /// Check if the state is `Valid`.
    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }

    /// Check if the state is `Invalid`.
    pub fn is_invalid(self) -> bool {
        self == Self::Invalid
    }

    /// Combines a parent's own verdict with a child's state.
    ///
    /// Invalid wins over pending, pending wins over valid.
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Invalid, _) | (_, Self::Invalid) => Self::Invalid,
            (Self::Pending, _) | (_, Self::Pending) => Self::Pending,
            _ => Self::Valid,
        }
    }
}

/// User interaction flags of a node.
///
/// Both flags start cleared and only an explicit reset clears them again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionState {
    /// The value was changed at least once.
    pub dirty: bool,
    /// The node was visited (lost focus) at least once.
    pub touched: bool,
}

impl InteractionState {
    /// Check if the value was never changed.
    pub fn is_pristine(self) -> bool {
        !self.dirty
    }

    /// Check if the node was never visited.
    pub fn is_untouched(self) -> bool {
        !self.touched
    }

    /// Check if the user has interacted with the node in any way.
    pub fn is_interacted(self) -> bool {
        self.dirty || self.touched
    }

    /// Merges the flags of two nodes (used for composites).
    pub fn merge(self, other: Self) -> Self {
        Self {
            dirty: self.dirty || other.dirty,
            touched: self.touched || other.touched,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine() {
        use ValidationState::*;
        assert_eq!(Valid.combine(Valid), Valid);
        assert_eq!(Valid.combine(Pending), Pending);
        assert_eq!(Pending.combine(Invalid), Invalid);
        assert_eq!(Invalid.combine(Valid), Invalid);
    }

    #[test]
    fn test_merge_interaction() {
        let dirty = InteractionState {
            dirty: true,
            touched: false,
        };
        let touched = InteractionState {
            dirty: false,
            touched: true,
        };
        let merged = dirty.merge(touched);
        assert!(merged.dirty && merged.touched);
        assert!(InteractionState::default().is_pristine());
        assert!(InteractionState::default().is_untouched());
        assert!(!touched.is_untouched());
        assert!(!InteractionState::default().is_interacted());
    }
}
