pub mod indicator;
pub mod slot;
