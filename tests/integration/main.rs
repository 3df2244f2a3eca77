#[path = "../common/mod.rs"]
mod common;

mod linker_tests;
mod publish_tests;
mod scenario_tests;
