use std::fmt::{Display, Formatter};
use crate::error::TraceLineError;
use crate::hex::{HEX_DIGITS, HEX_INVALID};

/// Most hex digits an address may have, 16 digits is 64 bits
pub const MAX_ADDRESS_DIGITS: usize = 16;

/// The operation of a trace record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// Instruction fetch, `I`. Never simulated, this is a data cache
    Instruction,
    /// Data load, `L`
    Load,
    /// Data store, `S`. Treated exactly like a load
    Store,
    /// Data modify, `M`, a load followed by a store to the same address
    Modify,
}

impl AccessKind {
    /// Number of cache accesses the operation makes
    pub fn sub_accesses(self) -> usize {
        match self {
            AccessKind::Instruction => 0,
            AccessKind::Load | AccessKind::Store => 1,
            AccessKind::Modify => 2,
        }
    }

    pub fn letter(self) -> char {
        match self {
            AccessKind::Instruction => 'I',
            AccessKind::Load => 'L',
            AccessKind::Store => 'S',
            AccessKind::Modify => 'M',
        }
    }
}

impl TryFrom<u8> for AccessKind {
    type Error = TraceLineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            b'I' => Ok(AccessKind::Instruction),
            b'L' => Ok(AccessKind::Load),
            b'S' => Ok(AccessKind::Store),
            b'M' => Ok(AccessKind::Modify),
            other => Err(TraceLineError::UnknownOperation(other as char)),
        }
    }
}

/// One parsed trace record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryAccess {
    pub kind: AccessKind,
    pub address: u64,
    /// Bytes accessed. Carried for display only, accesses never span lines in this model
    pub size: u32,
}

/// Formats the record the way verbose mode echoes it, `L 10,1`. The address loses any leading
/// zeros, though at least one digit is kept
impl Display for MemoryAccess {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:x},{}", self.kind.letter(), self.address, self.size)
    }
}

/// Parses one line of a trace
///
/// The format is an optional leading space, an operation letter, a space, a hexadecimal address,
/// a comma, and a decimal size. Anything after the size is ignored, see [`parse_record_with_trailer`]
/// to keep it. Lines starting with `I` are
/// instruction fetches and are skipped without looking at the rest of the line, as are blank lines
///
/// # Arguments
///
/// * `line`: The raw line, without its `\n`. A trailing `\r` is tolerated
///
/// returns: Result<Option<MemoryAccess>, TraceLineError>, `None` for lines with nothing to simulate
///
/// # Examples
///
/// ```
/// use csimlib::trace::{parse_record, AccessKind, MemoryAccess};
/// let access = parse_record(b" M 0421c7f0,4").unwrap();
/// assert_eq!(access, Some(MemoryAccess { kind: AccessKind::Modify, address: 0x0421c7f0, size: 4 }));
/// assert_eq!(parse_record(b"I 0400d7d4,8"), Ok(None));
/// assert!(parse_record(b" L 04f6b868").is_err());
/// ```
pub fn parse_record(line: &[u8]) -> Result<Option<MemoryAccess>, TraceLineError> {
    Ok(parse_record_with_trailer(line)?.map(|(access, _)| access))
}

/// Same as [`parse_record`] but also returns whatever follows the size digits, with trailing
/// whitespace removed, so verbose mode can echo the record as written
///
/// # Examples
///
/// ```
/// use csimlib::trace::parse_record_with_trailer;
/// let (access, trailer) = parse_record_with_trailer(b" L 10,1 cold\r").unwrap().unwrap();
/// assert_eq!(access.address, 0x10);
/// assert_eq!(trailer, b" cold");
/// ```
pub fn parse_record_with_trailer(line: &[u8]) -> Result<Option<(MemoryAccess, &[u8])>, TraceLineError> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.first() == Some(&b'I') || line.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let line = line.strip_prefix(b" ").unwrap_or(line);
    let (&operation, rest) = line.split_first().ok_or(TraceLineError::Malformed("missing operation"))?;
    let kind = AccessKind::try_from(operation)?;
    if kind == AccessKind::Instruction {
        return Ok(None);
    }
    let rest = rest
        .strip_prefix(b" ")
        .ok_or(TraceLineError::Malformed("expected a space after the operation"))?;
    // Bounded by the record, a missing comma is an error rather than a runaway search
    let comma = rest
        .iter()
        .position(|b| *b == b',')
        .ok_or(TraceLineError::Malformed("missing ',' after the address"))?;
    let address = parse_address(&rest[..comma])?;
    let field = &rest[comma + 1..];
    let size = parse_size(field);
    let digits = field.iter().take_while(|b| b.is_ascii_digit()).count();
    Ok(Some((MemoryAccess { kind, address, size }, field[digits..].trim_ascii_end())))
}

/// Parses a hexadecimal address of 1 to 16 digits, upper or lower case, without a `0x` prefix
///
/// Uses the lookup table generated by build.rs, which maps every non-hex byte to a sentinel, so
/// validation and conversion happen in the same pass
///
/// # Examples
///
/// ```
/// use csimlib::trace::parse_address;
/// assert_eq!(parse_address(b"7ff0005c8"), Ok(0x7ff0005c8));
/// assert!(parse_address(b"12g4").is_err());
/// ```
pub fn parse_address(digits: &[u8]) -> Result<u64, TraceLineError> {
    if digits.is_empty() {
        return Err(TraceLineError::Malformed("empty address"));
    }
    if digits.len() > MAX_ADDRESS_DIGITS {
        return Err(TraceLineError::Malformed("address wider than 64 bits"));
    }
    let mut res: u64 = 0;
    for digit in digits {
        let value = HEX_DIGITS[*digit as usize];
        if value == HEX_INVALID {
            return Err(TraceLineError::Malformed("address is not hexadecimal"));
        }
        res = (res << 4) | value as u64;
    }
    debug_assert_eq!(
        {
            let addr_as_str = std::str::from_utf8(digits).unwrap();
            u64::from_str_radix(addr_as_str, 16).unwrap()
        },
        res
    );
    Ok(res)
}

/// Parses the leading decimal digits of the size field, stopping at the first non-digit
///
/// The size plays no part in the simulation, so a missing or odd size is not an error, it
/// becomes 0 and saturates rather than overflowing
pub fn parse_size(field: &[u8]) -> u32 {
    field
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u32, |acc, b| acc.saturating_mul(10).saturating_add((b - b'0') as u32))
}
