//! Integration test harness

mod support;

mod analysis_test;
mod e2e_test;
mod feed_test;
