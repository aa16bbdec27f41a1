pub mod backup;
pub mod info;
pub mod user;
