pub mod policy;
pub mod ports;
pub mod project;
