//! Tests for the session manager

mod service_tests;
