//! # Containers Crate
//!
//! Foundational container library, one module per structure.
//!
//! ## Modules
//!
//! - `dynvec` – Growable array over raw storage (doubling growth, checked ops)
//! - `chained` – Separately-chained hash table with live instrumentation
//! - `robin_hood` – Fixed-capacity cache-line-aligned Robin-Hood hash table
//! - `hash` – Integer mixers and byte hashers shared by the tables

pub mod chained;
pub mod dynvec;
pub mod hash;
pub mod robin_hood;

pub use chained::{ChainedTable, FnvChainedTable, TableError};
pub use dynvec::{DynVec, VectorError};
pub use robin_hood::RobinHoodTable;
