//! Tests for token entities
