pub mod platform;
pub mod track;
