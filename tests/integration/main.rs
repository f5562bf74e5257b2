//! Integration tests

mod common;
mod engine_test;
mod persistence_test;
mod scan_test;
