//! Integration tests across the catalog crates.

mod catalog_test;
mod helpers;
mod installation_test;
