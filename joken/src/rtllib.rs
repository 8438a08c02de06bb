//! Small reusable building blocks on top of the core graph API, and helpers for preparing their data.

use crate::error::ParseError;
use crate::graph::*;

use std::ptr;

/// Creates a `Signal` that selects `values[control]`, built as a tree of 2:1 muxes on the bits of `control`, most significant bit first.
///
/// # Panics
///
/// Panics if the number of `values` isn't exactly `2^control.bit_width()`, if `values` don't all have the same bit width, or if any of the signals belong to a different module than `m`.
///
/// # Examples
///
/// ```
/// use joken::*;
///
/// let c = Context::new();
///
/// let m = c.module("MyModule");
/// let select = m.input("select", 2);
/// let values = (0..4u32).map(|i| m.lit(i * 3, 4)).collect::<Vec<_>>();
/// m.output("selected", rtllib::mux_index(m, select, &values));
/// ```
pub fn mux_index<'a>(
    m: &'a Module<'a>,
    control: &'a Signal<'a>,
    values: &[&'a Signal<'a>],
) -> &'a Signal<'a> {
    if !ptr::eq(control.module, m) {
        panic!("Attempted to combine signals from different modules.");
    }
    let control_bit_width = control.bit_width();
    let expected = 1usize.checked_shl(control_bit_width).unwrap_or(0);
    if values.is_empty() || values.len() != expected {
        panic!(
            "Cannot select between {} value(s) with a {}-bit control signal, which requires exactly {} value(s).",
            values.len(),
            control_bit_width,
            expected
        );
    }
    let bit_width = values[0].bit_width();
    if let Some(value) = values.iter().find(|value| value.bit_width() != bit_width) {
        panic!(
            "Cannot select between values with different bit widths ({} and {}, respectively).",
            bit_width,
            value.bit_width()
        );
    }

    select(m, control, control_bit_width, values)
}

fn select<'a>(
    m: &'a Module<'a>,
    control: &'a Signal<'a>,
    remaining_bits: u32,
    values: &[&'a Signal<'a>],
) -> &'a Signal<'a> {
    if remaining_bits == 0 {
        return values[0];
    }
    let (low, high) = values.split_at(values.len() / 2);
    let bit = control.bit(remaining_bits - 1);
    m.mux(
        bit,
        select(m, control, remaining_bits - 1, high),
        select(m, control, remaining_bits - 1, low),
    )
}

/// Splits `signal` into `signal.bit_width() / chunk_bit_width` chunks of `chunk_bit_width` bits each, least significant chunk first.
///
/// # Panics
///
/// Panics if `chunk_bit_width` is zero, or if `signal`'s bit width isn't a multiple of `chunk_bit_width`.
///
/// # Examples
///
/// ```
/// use joken::*;
///
/// let c = Context::new();
///
/// let m = c.module("MyModule");
/// let word = m.input("word", 32);
/// let bytes = rtllib::partition(word, 8);
/// assert_eq!(bytes.len(), 4);
/// m.output("low_byte", bytes[0]);
/// ```
pub fn partition<'a>(signal: &'a Signal<'a>, chunk_bit_width: u32) -> Vec<&'a Signal<'a>> {
    let bit_width = signal.bit_width();
    if chunk_bit_width == 0 || bit_width % chunk_bit_width != 0 {
        panic!(
            "Cannot partition a signal with {} bit(s) into chunks of {} bit(s).",
            bit_width, chunk_bit_width
        );
    }

    (0..bit_width / chunk_bit_width)
        .map(|i| signal.bits((i + 1) * chunk_bit_width - 1, i * chunk_bit_width))
        .collect()
}

/// Parses whitespace-separated numbers in `base` from `text`, for example to fill a lookup table from a hex dump.
///
/// Tokens may span multiple lines. Prefixes such as `0x` are not accepted.
///
/// # Errors
///
/// Fails on the first token that isn't a valid number in `base`, or that doesn't fit into 128 bits.
///
/// # Panics
///
/// Panics if `base` is not in the range `2..=36`.
///
/// # Examples
///
/// ```
/// use joken::*;
///
/// assert_eq!(rtllib::str_to_int_array("a7 23", 16), Ok(vec![0xa7, 0x23]));
/// assert!(rtllib::str_to_int_array("0x0313", 2).is_err());
/// ```
pub fn str_to_int_array(text: &str, base: u32) -> Result<Vec<u128>, ParseError> {
    text.split_whitespace()
        .map(|token| {
            u128::from_str_radix(token, base).map_err(|source| ParseError::InvalidNumber {
                text: token.to_owned(),
                base,
                source,
            })
        })
        .collect()
}
