pub mod anytime;
pub mod common;
