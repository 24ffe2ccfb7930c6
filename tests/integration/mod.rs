//! Integration tests for the conftree configuration store

mod include_loading;
mod override_backend;
mod test_utils;
mod xml_ingestion;
