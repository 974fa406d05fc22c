#![allow(dead_code)]

pub mod schedule;
pub mod world;

/// Route `log` output to the test harness; safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
