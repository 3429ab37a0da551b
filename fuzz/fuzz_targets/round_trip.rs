#![no_main]

use std::io::{Read, Write};

use libfuzzer_sys::fuzz_target;
use overflowbuf::OverflowBuffer;

fuzz_target!(|input: (u8, Vec<u8>, Vec<u8>)| {
    let (capacity, splits, data) = input;
    let mut buf = OverflowBuffer::with_capacity(capacity as usize);

    // Write data in pieces whose sizes come from the fuzzer
    let mut rest = &data[..];
    let mut sizes = splits.iter().map(|&s| s as usize + 1).cycle();
    while !rest.is_empty() {
        let n = sizes.next().unwrap_or(rest.len()).min(rest.len());
        assert_eq!(buf.write(&rest[..n]).unwrap(), n);
        rest = &rest[n..];
    }

    // Verify: total bytes match input
    assert_eq!(buf.len(), data.len() as u64);
    assert_eq!(buf.is_overflowed(), data.len() > capacity as usize);

    // Verify: read back in order, twice
    for _ in 0..2 {
        let mut out = Vec::new();
        buf.read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
        assert_eq!(buf.read(&mut [0u8; 4]).unwrap(), 0);
        buf.reset_read().unwrap();
    }

    // Verify: phase exclusivity
    assert!(buf.write(b"x").is_err());

    let path = buf.backing_path().map(|p| p.to_path_buf());
    buf.close().unwrap();
    if let Some(path) = path {
        assert!(!path.exists());
    }
});
