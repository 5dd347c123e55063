#![allow(unsafe_code)]
pub(crate) mod bf16;
