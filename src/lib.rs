pub mod config;
pub mod diff;
pub mod error;
pub mod mapping;
pub mod suggestion;

#[cfg(test)]
pub(crate) mod testing;
