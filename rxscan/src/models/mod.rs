mod catalog;
mod prescription;

pub use catalog::*;
pub use prescription::*;
