pub mod claims;
pub mod download;
pub mod echo;
pub mod upload;
