//! Base-64 digit stream. Numbers are written as fixed-width groups of
//! little-endian digits over `A-Za-z0-9+/`.

use crate::DecodeError;

pub(crate) const TABLE: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

fn digit_of(ch: char) -> Option<u32> {
    match ch {
        'A'..='Z' => Some(ch as u32 - 'A' as u32),
        'a'..='z' => Some(ch as u32 - 'a' as u32 + 26),
        '0'..='9' => Some(ch as u32 - '0' as u32 + 52),
        '+' => Some(62),
        '/' => Some(63),
        _ => None,
    }
}

/// Cursor over the digits of an encoded body.
#[derive(Debug)]
pub(crate) struct Values {
    digits: Vec<u32>,
    at: usize,
}

impl Values {
    /// `body` must already be stripped of `?` separators and whitespace.
    pub(crate) fn parse(body: &str) -> Result<Self, DecodeError> {
        let digits = body
            .chars()
            .enumerate()
            .map(|(position, ch)| digit_of(ch).ok_or(DecodeError::InvalidCharacter { ch, position }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { digits, at: 0 })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.at >= self.digits.len()
    }

    /// Read a `width`-digit number.
    pub(crate) fn poll(&mut self, width: usize) -> Result<u32, DecodeError> {
        let end = self.at + width;
        let group = self
            .digits
            .get(self.at..end)
            .ok_or(DecodeError::UnexpectedEnd { offset: self.at })?;
        self.at = end;
        Ok(group.iter().rev().fold(0, |acc, d| acc * 64 + d))
    }
}

/// Digit sink for the encoder. Digits stay numeric until `finish` so the
/// repeat counter of an unchanged frame can be bumped in place.
#[derive(Debug, Default)]
pub(crate) struct ValueWriter {
    digits: Vec<u32>,
}

impl ValueWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, mut value: u32, width: usize) {
        for _ in 0..width {
            self.digits.push(value % 64);
            value /= 64;
        }
    }

    pub(crate) fn append(&mut self, other: ValueWriter) {
        self.digits.extend(other.digits);
    }

    pub(crate) fn len(&self) -> usize {
        self.digits.len()
    }

    pub(crate) fn digit(&self, slot: usize) -> u32 {
        self.digits[slot]
    }

    pub(crate) fn bump(&mut self, slot: usize) {
        self.digits[slot] += 1;
    }

    /// Render the digits, inserting `?` after the first 42 characters and
    /// every 47 after that.
    pub(crate) fn finish(self) -> String {
        let mut out = String::with_capacity(self.digits.len() + self.digits.len() / 47 + 1);
        for (i, digit) in self.digits.into_iter().enumerate() {
            if i >= 42 && (i - 42) % 47 == 0 {
                out.push('?');
            }
            out.push(TABLE[digit as usize] as char);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_are_little_endian() {
        let mut values = Values::parse("vhAAgH").unwrap();
        assert_eq!(values.poll(2), Ok(2159));
        assert_eq!(values.poll(1), Ok(0));
        assert_eq!(values.poll(3), Ok(7 * 64 * 64 + 32 * 64));
        assert!(values.is_empty());
        assert_eq!(values.poll(1), Err(DecodeError::UnexpectedEnd { offset: 6 }));
    }

    #[test]
    fn rejects_characters_outside_the_table() {
        let err = Values::parse("vh!A").unwrap_err();
        assert_eq!(err, DecodeError::InvalidCharacter { ch: '!', position: 2 });
    }

    #[test]
    fn writer_splits_long_output() {
        let mut writer = ValueWriter::new();
        for _ in 0..90 {
            writer.push(0, 1);
        }
        let text = writer.finish();
        let parts: Vec<_> = text.split('?').map(str::len).collect();
        assert_eq!(parts, vec![42, 47, 1]);
    }

    #[test]
    fn short_output_is_not_split() {
        let mut writer = ValueWriter::new();
        writer.push(2159, 2);
        writer.push(0, 1);
        assert_eq!(writer.finish(), "vhA");
    }
}
