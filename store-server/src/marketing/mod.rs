//! Marketing: loyalty point arithmetic

pub mod loyalty;
