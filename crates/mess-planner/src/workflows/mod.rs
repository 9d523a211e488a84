pub mod import;
pub mod mess;
