pub mod tools;
pub mod types;
