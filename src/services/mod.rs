pub mod aggregation;

pub use aggregation::{derive_view, DerivedView};
