#![allow(unsafe_code)]
mod common;
pub(crate) mod bf16;
