// ABOUTME: Decoder for PostgreSQL binary-format integer and numeric values
// ABOUTME: Renders binary scalars and arrays into canonical text for the coercion table
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Binary wire decoding
//!
//! Extended-protocol queries return result columns in binary format. Rather
//! than carry two parsing paths, binary values of the coerced wire types are
//! rendered to the text `PostgreSQL` itself would print and then handed to
//! [`coerce_text`](super::coercion::coerce_text).

use super::coercion::WireType;
use thiserror::Error;

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;
const NUMERIC_PINF: u16 = 0xD000;
const NUMERIC_NINF: u16 = 0xF000;

/// Malformed binary payload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// Payload ended before the expected field
    #[error("unexpected end of {wire} value: needed {needed} more bytes")]
    Truncated {
        /// Type being decoded
        wire: &'static str,
        /// Bytes missing
        needed: usize,
    },
    /// Unknown numeric sign word
    #[error("invalid NUMERIC sign 0x{0:04X}")]
    InvalidNumericSign(u16),
    /// Negative count in a header field
    #[error("invalid {field} in {wire} value: {value}")]
    InvalidLength {
        /// Type being decoded
        wire: &'static str,
        /// Header field name
        field: &'static str,
        /// Offending value
        value: i64,
    },
    /// Array element OID does not match the column type
    #[error("array element type {found} does not match {expected}")]
    ElementMismatch {
        /// Element type implied by the column
        expected: &'static str,
        /// OID carried by the payload
        found: u32,
    },
}

struct Reader<'a> {
    wire: &'static str,
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    const fn new(wire: WireType, bytes: &'a [u8]) -> Self {
        Self {
            wire: wire.type_name(),
            bytes,
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        if self.bytes.len() < len {
            return Err(WireError::Truncated {
                wire: self.wire,
                needed: len - self.bytes.len(),
            });
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        Ok(head)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let mut out = [0_u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn i16(&mut self) -> Result<i16, WireError> {
        self.array().map(i16::from_be_bytes)
    }

    fn u16(&mut self) -> Result<u16, WireError> {
        self.array().map(u16::from_be_bytes)
    }

    fn i32(&mut self) -> Result<i32, WireError> {
        self.array().map(i32::from_be_bytes)
    }

    fn u32(&mut self) -> Result<u32, WireError> {
        self.array().map(u32::from_be_bytes)
    }

    fn i64(&mut self) -> Result<i64, WireError> {
        self.array().map(i64::from_be_bytes)
    }

    fn count(&mut self, field: &'static str, value: i64) -> Result<usize, WireError> {
        usize::try_from(value).map_err(|_| WireError::InvalidLength {
            wire: self.wire,
            field,
            value,
        })
    }
}

/// Render a binary value of `wire` as `PostgreSQL` text
///
/// # Errors
///
/// Returns a [`WireError`] when the payload is truncated or malformed.
pub fn binary_to_text(wire: WireType, bytes: &[u8]) -> Result<String, WireError> {
    if wire.is_array() {
        array_to_text(wire, bytes)
    } else {
        scalar_to_text(wire, bytes)
    }
}

fn scalar_to_text(wire: WireType, bytes: &[u8]) -> Result<String, WireError> {
    let mut reader = Reader::new(wire, bytes);
    match wire.element() {
        WireType::Int4 => reader.i32().map(|value| value.to_string()),
        WireType::Int8 => reader.i64().map(|value| value.to_string()),
        _ => numeric_to_text(&mut reader),
    }
}

fn numeric_to_text(reader: &mut Reader<'_>) -> Result<String, WireError> {
    let ndigits = reader.i16()?;
    let weight = i32::from(reader.i16()?);
    let sign = reader.u16()?;
    let dscale = usize::from(reader.u16()?);

    match sign {
        NUMERIC_NAN => return Ok("NaN".to_owned()),
        NUMERIC_PINF => return Ok("Infinity".to_owned()),
        NUMERIC_NINF => return Ok("-Infinity".to_owned()),
        NUMERIC_POS | NUMERIC_NEG => {}
        other => return Err(WireError::InvalidNumericSign(other)),
    }

    let ndigits = reader.count("ndigits", i64::from(ndigits))?;
    let digits = (0..ndigits)
        .map(|_| reader.i16())
        .collect::<Result<Vec<_>, _>>()?;
    // Base-10000 digit at group index `i`; positions outside the stored range are zero.
    let digit_at = |i: i32| -> i16 {
        usize::try_from(i)
            .ok()
            .and_then(|i| digits.get(i).copied())
            .unwrap_or(0)
    };

    let mut out = String::new();
    if sign == NUMERIC_NEG {
        out.push('-');
    }

    if weight < 0 {
        out.push('0');
    } else {
        for i in 0..=weight {
            let group = digit_at(i);
            if i == 0 {
                out.push_str(&group.to_string());
            } else {
                out.push_str(&format!("{group:04}"));
            }
        }
    }

    if dscale > 0 {
        let mut fraction = String::with_capacity(dscale + 4);
        let mut i = weight + 1;
        while fraction.len() < dscale {
            fraction.push_str(&format!("{:04}", digit_at(i)));
            i += 1;
        }
        fraction.truncate(dscale);
        out.push('.');
        out.push_str(&fraction);
    }

    Ok(out)
}

fn array_to_text(wire: WireType, bytes: &[u8]) -> Result<String, WireError> {
    let element = wire.element();
    let mut reader = Reader::new(wire, bytes);

    let ndim = reader.i32()?;
    let ndim = reader.count("ndim", i64::from(ndim))?;
    let _has_nulls = reader.i32()?;
    let element_oid = reader.u32()?;

    if ndim == 0 {
        return Ok("{}".to_owned());
    }
    if element_oid != element.oid() {
        return Err(WireError::ElementMismatch {
            expected: element.type_name(),
            found: element_oid,
        });
    }

    let mut total: usize = 1;
    for _ in 0..ndim {
        let len = reader.i32()?;
        let len = reader.count("dimension length", i64::from(len))?;
        let _lower_bound = reader.i32()?;
        total = total.saturating_mul(len);
    }

    let mut elements = Vec::with_capacity(total.min(4096));
    for _ in 0..total {
        let len = reader.i32()?;
        if len == -1 {
            elements.push("NULL".to_owned());
            continue;
        }
        let len = reader.count("element length", i64::from(len))?;
        elements.push(scalar_to_text(element, reader.take(len)?)?);
    }

    Ok(format!("{{{}}}", elements.join(",")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(weight: i16, sign: u16, dscale: u16, digits: &[i16]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&(digits.len() as i16).to_be_bytes());
        out.extend_from_slice(&weight.to_be_bytes());
        out.extend_from_slice(&sign.to_be_bytes());
        out.extend_from_slice(&dscale.to_be_bytes());
        for digit in digits {
            out.extend_from_slice(&digit.to_be_bytes());
        }
        out
    }

    fn array(element_oid: u32, elements: &[Option<Vec<u8>>]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&1_i32.to_be_bytes());
        out.extend_from_slice(&i32::from(elements.iter().any(Option::is_none)).to_be_bytes());
        out.extend_from_slice(&element_oid.to_be_bytes());
        out.extend_from_slice(&(elements.len() as i32).to_be_bytes());
        out.extend_from_slice(&1_i32.to_be_bytes());
        for element in elements {
            match element {
                Some(bytes) => {
                    out.extend_from_slice(&(bytes.len() as i32).to_be_bytes());
                    out.extend_from_slice(bytes);
                }
                None => out.extend_from_slice(&(-1_i32).to_be_bytes()),
            }
        }
        out
    }

    #[test]
    fn test_integer_scalars() {
        assert_eq!(
            binary_to_text(WireType::Int4, &(-17_i32).to_be_bytes()).unwrap(),
            "-17"
        );
        assert_eq!(
            binary_to_text(WireType::Int8, &9_007_199_254_740_993_i64.to_be_bytes()).unwrap(),
            "9007199254740993"
        );
    }

    #[test]
    fn test_numeric_values() {
        assert_eq!(
            binary_to_text(WireType::Numeric, &numeric(0, NUMERIC_POS, 2, &[123, 4500])).unwrap(),
            "123.45"
        );
        assert_eq!(
            binary_to_text(WireType::Numeric, &numeric(1, NUMERIC_POS, 0, &[1])).unwrap(),
            "10000"
        );
        assert_eq!(
            binary_to_text(WireType::Numeric, &numeric(-1, NUMERIC_NEG, 3, &[10])).unwrap(),
            "-0.001"
        );
        assert_eq!(
            binary_to_text(WireType::Numeric, &numeric(-2, NUMERIC_POS, 5, &[1000])).unwrap(),
            "0.00001"
        );
        assert_eq!(
            binary_to_text(WireType::Numeric, &numeric(0, NUMERIC_POS, 0, &[])).unwrap(),
            "0"
        );
        assert_eq!(
            binary_to_text(WireType::Numeric, &numeric(0, NUMERIC_POS, 2, &[])).unwrap(),
            "0.00"
        );
    }

    #[test]
    fn test_numeric_special_values() {
        assert_eq!(
            binary_to_text(WireType::Numeric, &numeric(0, NUMERIC_NAN, 0, &[])).unwrap(),
            "NaN"
        );
        assert_eq!(
            binary_to_text(WireType::Numeric, &numeric(0, NUMERIC_NINF, 0, &[])).unwrap(),
            "-Infinity"
        );
        assert_eq!(
            binary_to_text(WireType::Numeric, &numeric(0, 0x1234, 0, &[])),
            Err(WireError::InvalidNumericSign(0x1234))
        );
    }

    #[test]
    fn test_arrays_with_nulls() {
        let payload = array(
            WireType::Int4.oid(),
            &[
                Some(1_i32.to_be_bytes().to_vec()),
                None,
                Some(3_i32.to_be_bytes().to_vec()),
            ],
        );
        assert_eq!(
            binary_to_text(WireType::Int4Array, &payload).unwrap(),
            "{1,NULL,3}"
        );

        let payload = array(
            WireType::Numeric.oid(),
            &[Some(numeric(0, NUMERIC_POS, 1, &[2, 5000])), None],
        );
        assert_eq!(
            binary_to_text(WireType::NumericArray, &payload).unwrap(),
            "{2.5,NULL}"
        );
    }

    #[test]
    fn test_empty_array() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&0_i32.to_be_bytes());
        payload.extend_from_slice(&0_i32.to_be_bytes());
        payload.extend_from_slice(&WireType::Int8.oid().to_be_bytes());
        assert_eq!(binary_to_text(WireType::Int8Array, &payload).unwrap(), "{}");
    }

    #[test]
    fn test_malformed_payloads() {
        assert!(matches!(
            binary_to_text(WireType::Int8, &[0, 1, 2]),
            Err(WireError::Truncated { needed: 5, .. })
        ));

        let payload = array(WireType::Int8.oid(), &[Some(vec![0; 8])]);
        assert!(matches!(
            binary_to_text(WireType::Int4Array, &payload),
            Err(WireError::ElementMismatch { found: 20, .. })
        ));
    }
}
