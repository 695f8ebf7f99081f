#[allow(dead_code)]
pub mod builders;
#[allow(dead_code)]
pub mod harness;
