pub mod backend;
pub mod config;
pub mod confirm;
pub mod deposit;
pub mod errors;
pub mod network;
pub mod poll;
pub mod provider;
pub mod reader;
pub mod session;
pub mod share;
pub mod units;
pub mod utils;

#[cfg(test)]
mod test_helpers;
