//! Async staging from a tokio stream.
//!
//! Demonstrates staging several concurrent streams into pooled buffers
//! using tokio-util's compat layer.
//!
//! Run with:
//!     cargo run --example async_tokio --features async-io

use std::io::Read;

use overflowbuf::{BufferConfig, BufferPool, stage_async};
use tokio::io::AsyncWriteExt;
use tokio_util::compat::TokioAsyncReadCompatExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let pool = BufferPool::new();
    let config = BufferConfig::new(16 * 1024);

    let sizes = [4 * 1024, 50 * 1024, 200 * 1024];
    println!("Staging {} streams concurrently...\n", sizes.len());

    let handles: Vec<_> = sizes
        .into_iter()
        .enumerate()
        .map(|(stream_id, size)| {
            let pool = pool.clone();
            let config = config.clone();
            tokio::spawn(async move {
                let (mut tx, rx) = tokio::io::duplex(8192);
                tokio::spawn(async move {
                    let data: Vec<u8> = (0..size).map(|i| (i % 256) as u8).collect();
                    tx.write_all(&data).await
                });

                let (mut buf, staged) = stage_async(rx.compat(), pool.acquire(&config)).await?;
                let spilled = buf.is_overflowed();

                let mut out = Vec::new();
                buf.read_to_end(&mut out)?;
                pool.release(buf)?;

                Ok::<_, Box<dyn std::error::Error + Send + Sync>>((stream_id, staged, spilled))
            })
        })
        .collect();

    for handle in handles {
        let (stream_id, staged, spilled) = handle
            .await?
            .map_err(|e| e as Box<dyn std::error::Error>)?;
        println!("Stream {}: {} bytes, spilled={}", stream_id, staged, spilled);
    }

    println!("\nIdle buffers: {}", pool.idle());
    Ok(())
}
