//! Cross-module scenario tests driven through [`crate::Engine`]

mod engine_scenarios;
