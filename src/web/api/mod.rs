pub mod camera;
pub mod error;
pub mod report;
pub mod root;
