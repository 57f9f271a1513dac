pub mod download;
pub mod echo;
pub mod health;
pub mod me;
pub mod upload;
