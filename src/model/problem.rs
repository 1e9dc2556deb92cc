use serde::{Deserialize, Serialize};

/// A forward/reverse inconsistency found in a built index.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind")]
pub enum Problem {
    /// A PTR whose address has no forward name at all.
    DanglingPTR { address: String, ptr_target: String },
    /// A PTR whose address has forward names, none of which is the PTR target.
    MismatchedPTR {
        address: String,
        ptr_target: String,
        forward_names: Vec<String>,
    },
}

impl Problem {
    pub fn address(&self) -> &str {
        match self {
            Problem::DanglingPTR { address, .. } => address,
            Problem::MismatchedPTR { address, .. } => address,
        }
    }

    pub fn ptr_target(&self) -> &str {
        match self {
            Problem::DanglingPTR { ptr_target, .. } => ptr_target,
            Problem::MismatchedPTR { ptr_target, .. } => ptr_target,
        }
    }
}
