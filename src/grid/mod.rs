pub mod address;
pub mod spec;

pub use address::CellId;
pub use spec::{CellRect, GridSpec};
