//! multiomix-kg: Heterogeneous gene/protein/term network and per-gene
//! association rollup built from one integration run.

pub mod assembler;
pub mod association;
pub mod export;
pub mod graph;

pub use assembler::{assemble, AssemblyOptions};
pub use association::{aggregate, AssociationRow, ASSOCIATION_SEPARATOR};
pub use export::{graph_to_json, write_associations_csv, GraphExport};
pub use graph::{Edge, Graph, Node, NodeId, NodeKind, NodeShape};
