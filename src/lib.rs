#![doc = include_str!("../README.md")]

pub use stratum_engine as engine;
pub use stratum_reflect as reflect;
