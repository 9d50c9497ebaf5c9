pub mod common;
pub mod record;
