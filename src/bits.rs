//! Bit and number utilities (C1): conversions between decimal values and
//! fixed-width binary digit strings, ones-complement, and slicing an N-bit
//! value into K-bit chunks. These are string-surface helpers only — the
//! rest of the crate works with plain integers; string encoding stays at
//! the I/O boundary (see DESIGN.md).

use crate::error::ProcessorError;

/// Bit widths the helpers below accept.
const SUPPORTED_BITS: [u8; 4] = [2, 4, 8, 12];

fn check_bits(bits: u8) -> Result<(), ProcessorError> {
    if SUPPORTED_BITS.contains(&bits) {
        Ok(())
    } else {
        Err(ProcessorError::InvalidBitValue { bits })
    }
}

/// Renders `v` as a zero-padded binary digit string `bits` characters wide.
pub fn decimal_to_binary(bits: u8, v: u32) -> Result<String, ProcessorError> {
    check_bits(bits)?;
    let max = (1u32 << bits) - 1;
    if v > max {
        return Err(ProcessorError::ValueOutOfRangeForBits { value: v, bits });
    }
    Ok(format!("{:0width$b}", v, width = bits as usize))
}

/// Parses a string of `0`/`1` characters back into its decimal value.
pub fn binary_to_decimal(s: &str) -> Result<u32, ProcessorError> {
    if s.is_empty() || !s.chars().all(|c| c == '0' || c == '1') {
        return Err(ProcessorError::NotABinaryNumber(s.to_string()));
    }
    u32::from_str_radix(s, 2).map_err(|_| ProcessorError::NotABinaryNumber(s.to_string()))
}

/// Flips every bit of `v` within `bits` bits (i.e. `v XOR ((1 << bits) - 1)`).
pub fn ones_complement(v: u32, bits: u8) -> Result<u32, ProcessorError> {
    check_bits(bits)?;
    let mask = (1u32 << bits) - 1;
    if v > mask {
        return Err(ProcessorError::ValueOutOfRangeForBits { value: v, bits });
    }
    Ok((!v) & mask)
}

/// The output form requested from [`convert_decimal_to_n_bit_slices`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceFormat {
    Binary,
    Decimal,
}

/// Splits the `bits`-wide value `v` into `bits / chunk` chunks of `chunk`
/// bits each, most-significant chunk first, rendered per `format`.
pub fn convert_decimal_to_n_bit_slices(
    bits: u8,
    chunk: u8,
    v: u32,
    format: SliceFormat,
) -> Result<Vec<String>, ProcessorError> {
    if chunk == 0 || chunk > bits {
        return Err(ProcessorError::InvalidChunkValue { chunk });
    }
    if bits % chunk != 0 {
        return Err(ProcessorError::IncompatibleChunkBit { bits, chunk });
    }
    let full = decimal_to_binary(bits, v).or_else(|_| {
        // decimal_to_binary only accepts the four canonical widths; fall
        // back to a manual render for composite widths like 12 split into
        // chunks of 4, which is already covered by SUPPORTED_BITS, but
        // guard here in case a caller passes a width outside that set.
        Err(ProcessorError::ValueOutOfRangeForBits { value: v, bits })
    })?;

    let chunk_count = (bits / chunk) as usize;
    let mut out = Vec::with_capacity(chunk_count);
    for i in 0..chunk_count {
        let start = i * chunk as usize;
        let slice = &full[start..start + chunk as usize];
        match format {
            SliceFormat::Binary => out.push(slice.to_string()),
            SliceFormat::Decimal => {
                let value = binary_to_decimal(slice)?;
                out.push(value.to_string());
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_binary_round_trip() {
        for v in 0..16u32 {
            let s = decimal_to_binary(4, v).unwrap();
            assert_eq!(binary_to_decimal(&s).unwrap(), v);
        }
    }

    #[test]
    fn ones_complement_round_trip() {
        for bits in [2u8, 4, 8, 12] {
            let max = (1u32 << bits) - 1;
            for v in [0, 1, max / 2, max] {
                let complemented = ones_complement(v, bits).unwrap();
                assert_eq!(ones_complement(complemented, bits).unwrap(), v);
            }
        }
    }

    #[test]
    fn rejects_bad_binary_string() {
        assert!(binary_to_decimal("012").is_err());
        assert!(binary_to_decimal("").is_err());
    }

    #[test]
    fn slices_twelve_bits_into_three_nibbles() {
        let slices =
            convert_decimal_to_n_bit_slices(12, 4, 0x312, SliceFormat::Binary).unwrap();
        assert_eq!(slices, vec!["0011", "0001", "0010"]);

        let decimal = convert_decimal_to_n_bit_slices(12, 4, 0x312, SliceFormat::Decimal).unwrap();
        assert_eq!(decimal, vec!["3", "1", "2"]);
    }

    #[test]
    fn rejects_incompatible_chunk_size() {
        assert_eq!(
            convert_decimal_to_n_bit_slices(12, 5, 0, SliceFormat::Binary),
            Err(ProcessorError::IncompatibleChunkBit { bits: 12, chunk: 5 })
        );
    }
}
