pub mod commands;
pub mod detector;
pub mod distros;
pub mod doctor;
pub mod error;
pub mod paths;
pub mod switch;
pub mod ui;

pub use error::DistroError;

#[cfg(test)]
pub mod test_utils;
