pub mod image;
pub mod task;
