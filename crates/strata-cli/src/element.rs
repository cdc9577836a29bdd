use serde::{Deserialize, Serialize};

/// Role of an element in the sample hierarchy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    #[default]
    Root,
    Solution,
    Project,
    Folder,
    File,
}

/// Payload stored at every element of the trees the CLI builds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInfo {
    pub kind: ElementKind,
    /// Number of times the element's payload was modified.
    pub touched: u64,
}

impl ElementInfo {
    pub fn new(kind: ElementKind) -> Self {
        Self { kind, touched: 0 }
    }
}
