pub mod reports;
pub mod upload;
