//! Tests for the signed token service

mod token_family_tests;
