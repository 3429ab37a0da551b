//! Staging request bodies through the process-wide pool.
//!
//! Run with:
//!     cargo run --example pool_stage

use std::io::Read;

use overflowbuf::{BufferConfig, default_pool};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = BufferConfig::new(1024).with_prefix("request-");

    // Small and large bodies, as a server might receive them
    let bodies: Vec<Vec<u8>> = vec![
        b"{\"ping\":true}".to_vec(),
        vec![b'x'; 100 * 1024],
        b"short again".to_vec(),
    ];

    for (i, body) in bodies.iter().enumerate() {
        let mut staged = default_pool().stage(&body[..], &config)?;
        let on_disk = staged.get_ref().is_overflowed();

        // A handler consumes the body
        let mut received = Vec::new();
        staged.read_to_end(&mut received)?;

        println!(
            "Request {}: {} bytes, spilled={}, intact={}",
            i,
            received.len(),
            on_disk,
            received == *body
        );

        // Closing returns the buffer to the pool
        staged.close()?;
        println!("  idle buffers in pool: {}", default_pool().idle());
    }

    Ok(())
}
