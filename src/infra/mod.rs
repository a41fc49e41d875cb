//! Infrastructure adapters for reservation storage backends.

pub mod store;
