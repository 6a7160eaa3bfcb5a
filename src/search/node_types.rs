//! Compile-time node type specialization for search.
//!
//! Uses Rust generics to compile different versions of search functions
//! for different node types, eliminating runtime if-checks.
//!
//! # Node Types
//! - `Root`: Root of the search tree (PV=true, ROOT=true)
//! - `OnPV`: On principal variation, non-root (PV=true, ROOT=false)
//! - `OffPV`: Null-window scout (PV=false, ROOT=false)

pub trait NodeType {
    /// Full window; records the principal variation and never takes TT cutoffs.
    const PV: bool;
    /// The root, where the clock is not checked before the first move.
    const ROOT: bool;
    /// The node type for the first child searched from this node.
    type Next: NodeType;
}

pub struct Root;

pub struct OnPV;

pub struct OffPV;

impl NodeType for Root {
    const PV: bool = true;
    const ROOT: bool = true;
    type Next = OnPV;
}

impl NodeType for OnPV {
    const PV: bool = true;
    const ROOT: bool = false;
    type Next = Self;
}

impl NodeType for OffPV {
    const PV: bool = false;
    const ROOT: bool = false;
    type Next = Self;
}
