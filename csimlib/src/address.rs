use crate::config::{CacheGeometry, ADDRESS_BITS};
use crate::error::{ConfigError, IllegalRange};

/// Extracts bits `low` to `high` (both inclusive) of a 64-bit value, shifted down to bit 0
///
/// # Arguments
///
/// * `value`: The source value
/// * `low`: The lowest bit of the field
/// * `high`: The highest bit of the field
///
/// returns: Result<u64, IllegalRange>, an error unless `0 <= low <= high <= 63`
///
/// # Examples
///
/// ```
/// use csimlib::address::extract_bits;
/// // 395 is 0b1_1000_1011
/// assert_eq!(extract_bits(395, 0, 5), Ok(0b00_1011));
/// assert!(extract_bits(395, 5, 64).is_err());
/// ```
pub fn extract_bits(value: u64, low: u32, high: u32) -> Result<u64, IllegalRange> {
    if low > high || high >= ADDRESS_BITS {
        return Err(IllegalRange { low, high });
    }
    Ok(bits(value, low, high))
}

// Caller guarantees low <= high <= 63
#[inline(always)]
fn bits(value: u64, low: u32, high: u32) -> u64 {
    let discard_high = ADDRESS_BITS - 1 - high;
    (value << discard_high) >> (discard_high + low)
}

/// Splits addresses into a tag and a set index for a fixed geometry
///
/// Addresses are laid out as `| tag | set index | block offset |`, from the most significant bit
/// down. Either of the tag or set index fields may be empty, in which case that field is 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressDecoder {
    block_offset_bits: u32,
    set_index_bits: u32,
}

impl AddressDecoder {
    pub fn new(geometry: &CacheGeometry) -> Result<Self, ConfigError> {
        geometry.validate()?;
        Ok(Self {
            block_offset_bits: geometry.block_offset_bits,
            set_index_bits: geometry.set_index_bits,
        })
    }

    /// The tag, bits `set_index_bits + block_offset_bits` to 63
    #[inline]
    pub fn tag_of(&self, address: u64) -> u64 {
        let low = self.block_offset_bits + self.set_index_bits;
        self.field(address, low, ADDRESS_BITS - low)
    }

    /// The set index, bits `block_offset_bits` to `set_index_bits + block_offset_bits - 1`
    ///
    /// Always within `[0, 2^set_index_bits - 1]`
    #[inline]
    pub fn set_of(&self, address: u64) -> usize {
        self.field(address, self.block_offset_bits, self.set_index_bits) as usize
    }

    #[inline(always)]
    fn field(&self, address: u64, low: u32, width: u32) -> u64 {
        if width == 0 {
            0
        } else {
            bits(address, low, low + width - 1)
        }
    }
}
