pub mod logger;
pub mod providers;
