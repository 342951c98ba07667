fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    // Generated here rather than with a const fn so the table is cached across compilations
    let out_dir = std::env::var_os("OUT_DIR").unwrap();
    let path = std::path::Path::new(&out_dir).join("hex.rs");
    let lookup_table = format!("{:?}", generate_hex_lookup_table());
    std::fs::write(
        &path,
        format!(
            "pub const HEX_INVALID: u8 = {HEX_INVALID};\npub const HEX_DIGITS: [u8; u8::MAX as usize + 1] = {lookup_table};"
        ),
    )
    .unwrap();
}

// Anything that isn't a hex digit maps to this, a digit never exceeds 15
const HEX_INVALID: u8 = 0xFF;

fn generate_hex_lookup_table() -> [u8; u8::MAX as usize + 1] {
    let mut output = [HEX_INVALID; u8::MAX as usize + 1];
    for input in 0..=u8::MAX {
        output[input as usize] = map_hex_char(input);
    }
    output
}

fn map_hex_char(input: u8) -> u8 {
    match input {
        b'0'..=b'9' => input - b'0',
        b'a'..=b'f' => input - b'a' + 10,
        b'A'..=b'F' => input - b'A' + 10,
        _ => HEX_INVALID,
    }
}
