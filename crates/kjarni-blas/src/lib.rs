//! BF16-input matrix-vector products with F32 or F64 accumulation.
//!
//! Computes BLAS-style `y = alpha * op(A) * x + beta * y` where `A` and `x`
//! hold BF16 values. `cpu::kernels` holds the scalar, portable and `unsafe`
//! SIMD kernels together with the strided copy helpers; `cpu::ops` holds the
//! safe dispatching entry points.

pub mod accum;
pub mod config;
pub mod cpu;
pub mod error;
pub mod layout;

pub use accum::Accumulator;
pub use config::{load_config, BlasConfig, KernelChoice};
pub use cpu::kernels::Kernel;
pub use cpu::ops::array::{gemv_bf16, matvec_bf16};
pub use cpu::ops::gemv::{dbgemv, gemv, sbgemv};
pub use error::{BlasError, BlasResult};
pub use layout::{Layout, Transpose};
