//! Storage adapters. The adapter contract itself lives in
//! [`crate::core::store`]; this module holds the shipped implementations.

pub mod memory;

pub use memory::InMemoryStorage;
