//! Command modules for the fml-build CLI.
//!
//! - [`generate`] - Fetch the generator and run validate + generate (default)
//! - [`fetch`] - Fetch the generator and print its path
//! - [`version`] - Print the resolved generator version

pub mod fetch;
pub mod generate;
pub mod version;
