pub mod interview;
pub mod message;
