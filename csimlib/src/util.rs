use std::fmt::Write;

/// Generates a deterministic trace of `records` lines for tests and benchmarks
///
/// Addresses are drawn from a small working set so the trace produces a realistic mix of hits and
/// misses. Roughly one record in eight is an instruction fetch, the remainder split between loads,
/// stores, and modifies. The same seed always produces the same trace
pub fn synthetic_trace(records: usize, seed: u64) -> Vec<u8> {
    // xorshift64, a zero state would get stuck
    let mut state = seed.max(1);
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    let mut out = String::with_capacity(records * 16);
    for _ in 0..records {
        let roll = next();
        let address = 0x7ff000000 + ((next() % 0x4000) & !0x3);
        let size = [1, 2, 4, 8][(roll >> 8) as usize % 4];
        let operation = match roll % 8 {
            0 => "I",
            1..=3 => " L",
            4 | 5 => " S",
            _ => " M",
        };
        writeln!(out, "{operation} {address:08x},{size}").expect("writing to a String cannot fail");
    }
    out.into_bytes()
}
