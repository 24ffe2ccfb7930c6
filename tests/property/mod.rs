//! Property-based tests for path resolution and value storage
