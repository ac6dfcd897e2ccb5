// sluice/src/commands/mod.rs

pub mod bi;
pub mod compare;
pub mod export;
