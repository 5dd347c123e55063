use std::time::Instant;

use half::bf16;
use kjarni_blas::{gemv, BlasConfig, Kernel, KernelChoice, Layout, Transpose};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // A LLaMA-sized projection: 4096 outputs, 4096 inputs.
    let (m, n) = (4096, 4096);
    let a: Vec<bf16> = (0..m * n)
        .map(|i| bf16::from_f32(((i % 1000) as f32) * 0.001 - 0.5))
        .collect();
    let x: Vec<bf16> = (0..n).map(|i| bf16::from_f32((i % 7) as f32 * 0.1)).collect();
    let iterations = 20;

    for choice in [KernelChoice::Scalar, KernelChoice::Portable, KernelChoice::Auto] {
        let config = BlasConfig { kernel: choice, ..BlasConfig::default() };
        for trans in [Transpose::NoTrans, Transpose::Trans] {
            let mut y = vec![0.0f32; m];

            let start = Instant::now();
            for _ in 0..iterations {
                gemv(&config, Layout::ColMajor, trans, m, n, 1.0, &a, m, &x, 1, 0.0, &mut y, 1)?;
                std::hint::black_box(&y);
            }
            let elapsed = start.elapsed() / iterations;
            let gflops = 2.0 * (m * n) as f64 / elapsed.as_secs_f64() / 1e9;

            println!(
                "{:?} ({:?}) {:?}: {:?} per call ({:.2} GFLOPS), y[0] = {:.4}",
                choice,
                Kernel::select(choice),
                trans,
                elapsed,
                gflops,
                y[0]
            );
        }
    }
    Ok(())
}
