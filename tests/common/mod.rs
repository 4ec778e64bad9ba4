#![allow(dead_code, unused_imports)]

pub use tierflow_test_utils::builders;
pub use tierflow_test_utils::fake_delegate;
pub use tierflow_test_utils::{init_tracing, with_timeout};
