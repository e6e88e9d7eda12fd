pub mod clean;
pub mod dataset;
pub mod fields;
pub mod normalize;
pub mod registry;
pub mod validate;
