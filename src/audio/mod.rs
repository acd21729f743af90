pub mod encode;
pub mod fragment;
pub mod tone;

pub use fragment::{AudioFragment, TARGET_RATE};
