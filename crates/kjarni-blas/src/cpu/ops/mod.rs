pub mod array;
pub mod gemv;
