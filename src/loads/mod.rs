//! Load cases, member/node loads and load combinations

pub mod combination;
mod distributed;
mod load_case;
mod load_combo;
mod node_load;

pub use combination::LoadCombinationEngine;
pub use distributed::{DistributedLoad, LoadDirection};
pub use load_case::{LoadCase, LoadCaseSet, LoadCategory};
pub use load_combo::{CombinationTerm, LimitState, LoadCombination};
pub use node_load::NodeLoad;
