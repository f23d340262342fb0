use serde::{Deserialize, Serialize};

/// Qualified node name: module name plus local name
///
/// The module name stands in for the full namespace URI; mapping between
/// the two belongs to the external schema toolchain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QName {
    pub module: String,
    pub local_name: String,
}

impl QName {
    /// Create a new QName from module and local name
    pub fn new(module: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            local_name: local_name.into(),
        }
    }

    /// Create a QName with no module qualification
    ///
    /// Used for synthetic nodes such as the datastore document root.
    pub fn unqualified(local_name: impl Into<String>) -> Self {
        Self {
            module: String::new(),
            local_name: local_name.into(),
        }
    }

    /// Check whether this QName carries a module qualification
    pub fn is_qualified(&self) -> bool {
        !self.module.is_empty()
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.module.is_empty() {
            write!(f, "{}", self.local_name)
        } else {
            write!(f, "{}:{}", self.module, self.local_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_display() {
        let q = QName::new("test", "top");
        assert_eq!(format!("{}", q), "test:top");
        assert!(q.is_qualified());
    }

    #[test]
    fn test_unqualified_display() {
        let q = QName::unqualified("data");
        assert_eq!(format!("{}", q), "data");
        assert!(!q.is_qualified());
    }

    #[test]
    fn test_ordering_is_stable() {
        let a = QName::new("m", "a");
        let b = QName::new("m", "b");
        assert!(a < b);
    }
}
