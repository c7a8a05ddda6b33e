//! Tests for token encoding and the expired token sweeper
