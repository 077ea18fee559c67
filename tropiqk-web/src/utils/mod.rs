pub mod jwt;
pub mod paths;
