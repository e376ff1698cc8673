pub mod covers;
pub mod document;
pub mod error;
pub mod operations;
