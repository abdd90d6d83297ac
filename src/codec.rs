//! Percent-encoding для сетевых строк (форма application/x-www-form-urlencoded)

use super::errors::DecodeError;

/// Байты, которые проходят без экранирования помимо букв и цифр
const PASS_THROUGH: &[u8] = b"-_.~=&";

#[inline]
fn to_hex(nibble: u8) -> u8 {
    if nibble > 9 {
        nibble + 55
    } else {
        nibble + 48
    }
}

#[inline]
fn from_hex(digit: u8) -> Option<u8> {
    match digit {
        b'A'..=b'Z' => Some(digit - b'A' + 10),
        b'a'..=b'z' => Some(digit - b'a' + 10),
        b'0'..=b'9' => Some(digit - b'0'),
        _ => None,
    }
}

/// Кодирует байтовую строку: буквы, цифры и `-_.~=&` проходят как есть,
/// пробел становится `+`, остальное — `%XY` в верхнем регистре
pub fn encode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    for &byte in input {
        if byte.is_ascii_alphanumeric() || PASS_THROUGH.contains(&byte) {
            out.push(byte);
        } else if byte == b' ' {
            out.push(b'+');
        } else {
            out.push(b'%');
            out.push(to_hex(byte >> 4));
            out.push(to_hex(byte & 0x0f));
        }
    }
    out
}

/// Декодирует `+` в пробел и `%XY` в байт (регистр цифр не важен).
/// Оборванный `%` или не-hex символ после него — `DecodeError::MalformedEscape`
pub fn decode(input: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        match input[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                if i + 2 >= input.len() {
                    return Err(DecodeError::MalformedEscape { position: i });
                }
                let high = from_hex(input[i + 1])
                    .ok_or(DecodeError::MalformedEscape { position: i })?;
                let low = from_hex(input[i + 2])
                    .ok_or(DecodeError::MalformedEscape { position: i })?;
                out.push((((high as u16) << 4) | low as u16) as u8);
                i += 3;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    Ok(out)
}
