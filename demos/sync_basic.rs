//! Basic synchronous overflow buffer example.
//!
//! Run with:
//!     cargo run --example sync_basic

use std::io::{Read, Write};

use overflowbuf::{BufferConfig, OverflowBuffer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Keep 64 KiB in memory, spill the rest
    let mut buf = OverflowBuffer::new(BufferConfig::new(64 * 1024).with_prefix("demo-"));

    // Simulate a 1 MB body arriving in 8 KB pieces
    let data: Vec<u8> = (0..1024 * 1024).map(|i| (i % 256) as u8).collect();
    for piece in data.chunks(8 * 1024) {
        buf.write_all(piece)?;
    }

    println!("Wrote {} bytes", buf.len());
    println!("  in memory: {} bytes", buf.memory_len());
    if let Some(path) = buf.backing_path() {
        println!("  on disk:   {}", path.display());
    }

    // Read it back twice
    for pass in 1..=2 {
        let mut out = Vec::with_capacity(data.len());
        buf.read_to_end(&mut out)?;
        println!("Pass {}: read {} bytes, intact={}", pass, out.len(), out == data);
        buf.reset_read()?;
    }

    // Writing is over once reading has started
    if let Err(e) = buf.write(b"too late") {
        println!("Write after read rejected: {}", e);
    }

    buf.close()?;
    println!("Closed, backing file removed");

    Ok(())
}
