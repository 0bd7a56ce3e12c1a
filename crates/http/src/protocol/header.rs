//! Header field table and the line-oriented header parser.
//!
//! Header names are case-insensitive: every name is lower-cased on the way in,
//! and lookups compare ignoring ASCII case. A name that arrives more than once
//! keeps a single entry whose values are joined with `", "` in arrival order.
//!
//! The table keeps first-insertion order so that serializing it through the
//! [`ResponseWriter`](crate::connection::ResponseWriter) is deterministic.

use std::fmt;

use tracing::trace;

use crate::ensure;
use crate::protocol::{CRLF, ParseError, find_crlf};

/// Separator between a header name and its value.
const KEY_VALUE_SEPARATOR: &str = ": ";

/// Joins the values of a repeated header name.
const VALUE_DELIMITER: &str = ", ";

/// `tchar` from RFC 9110: ``A-Z a-z 0-9 ! # $ % & ' * + - . ^ _ ` | ~``.
static TOKEN_CHARS: [bool; 256] = build_token_table();

const fn build_token_table() -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < 256 {
        let b = i as u8;
        table[i] = b.is_ascii_alphanumeric()
            || matches!(b, b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~');
        i += 1;
    }
    table
}

/// Returns true if every byte of `key` is a valid header name character.
#[inline]
pub fn is_valid_header_key(key: &str) -> bool {
    key.bytes().all(|b| TOKEN_CHARS[b as usize])
}

/// Outcome of one [`HeaderTable::parse`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderParse {
    /// Bytes consumed from the front of the supplied buffer.
    pub consumed: usize,
    /// `true` once the blank line ending the header block was consumed.
    pub done: bool,
}

/// Case-insensitive mapping from header name to a single, possibly merged, value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderTable {
    entries: Vec<(String, String)>,
}

impl HeaderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses as many complete header lines from `buf` as are available.
    ///
    /// Returns the number of bytes consumed and whether the header block is
    /// complete. A buffer without a full line consumes nothing, so the caller
    /// must supply more bytes and call again with the unconsumed tail.
    ///
    /// # Errors
    ///
    /// - [`ParseError::MalformedKeyValuePair`] if a line has no `": "` separator
    /// - [`ParseError::TrailingSpaceInKey`] if the name is followed by whitespace
    /// - [`ParseError::EmptyKey`] if the name is empty
    /// - [`ParseError::MalformedKey`] if the name contains a non-token character
    /// - [`ParseError::InvalidEncoding`] if a line is not valid UTF-8
    pub fn parse(&mut self, buf: &[u8]) -> Result<HeaderParse, ParseError> {
        let mut consumed = 0;

        loop {
            let rest = &buf[consumed..];
            let Some(line_end) = find_crlf(rest) else {
                return Ok(HeaderParse { consumed, done: false });
            };

            let raw = &rest[..line_end];
            let line = std::str::from_utf8(raw).map_err(|_e| ParseError::invalid_encoding(String::from_utf8_lossy(raw)))?;
            consumed += line_end + CRLF.len();

            if line.trim().is_empty() {
                trace!(consumed, headers = self.len(), "header block done");
                return Ok(HeaderParse { consumed, done: true });
            }

            let (key, value) = split_header_line(line)?;
            self.merge(key, value);
        }
    }

    /// Returns the value stored for `name`, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.entries[index].1.as_str())
    }

    /// Adds a value, merging it into an existing entry with `", "` when the name repeats.
    ///
    /// # Errors
    ///
    /// Fails without touching the table if the name is empty or not a token,
    /// or if the value contains CR or LF.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<(), ParseError> {
        let (name, value) = (name.as_ref(), value.as_ref());
        check_field(name, value)?;
        self.merge(name, value);
        Ok(())
    }

    /// Sets a value, replacing whatever was stored under `name`.
    ///
    /// # Errors
    ///
    /// Same rules as [`insert`](Self::insert).
    pub fn set(&mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<(), ParseError> {
        let (name, value) = (name.as_ref(), value.as_ref());
        check_field(name, value)?;
        let value = value.trim().to_string();
        match self.position(name) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((name.to_ascii_lowercase(), value)),
        }
        Ok(())
    }

    /// Builds a table from `(name, value)` pairs with [`insert`](Self::insert) semantics.
    ///
    /// # Errors
    ///
    /// Returns the first pair rejected by [`insert`](Self::insert).
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self, ParseError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut table = HeaderTable::new();
        for (name, value) in pairs {
            table.insert(name, value)?;
        }
        Ok(table)
    }

    /// Merge without validation; callers hand in names and values already checked.
    pub(super) fn merge(&mut self, name: &str, value: &str) {
        let value = value.trim();
        match self.position(name) {
            Some(index) => {
                let current = &mut self.entries[index].1;
                current.push_str(VALUE_DELIMITER);
                current.push_str(value);
            }
            None => self.entries.push((name.to_ascii_lowercase(), value.to_string())),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name).map(|index| self.entries.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, value)` pairs in first-insertion order; names are lower-case.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key.eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for HeaderTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            write!(f, "{name}: {value}{CRLF}")?;
        }
        Ok(())
    }
}

/// Rules for fields added through the public mutators.
fn check_field(name: &str, value: &str) -> Result<(), ParseError> {
    ensure!(!name.is_empty(), ParseError::empty_key(format!("{name}{KEY_VALUE_SEPARATOR}{value}")));
    ensure!(is_valid_header_key(name), ParseError::malformed_key(format!("{name}{KEY_VALUE_SEPARATOR}{value}")));
    ensure!(!value.contains(['\r', '\n']), ParseError::invalid_header_value(name, value));
    Ok(())
}

/// Splits one header line into a validated name and a trimmed value.
fn split_header_line(line: &str) -> Result<(&str, &str), ParseError> {
    let (raw_key, raw_value) = line.split_once(KEY_VALUE_SEPARATOR).ok_or_else(|| ParseError::malformed_key_value_pair(line))?;

    ensure!(!raw_key.ends_with(|c: char| c.is_ascii_whitespace()), ParseError::trailing_space_in_key(line));

    let key = raw_key.trim();
    ensure!(!key.is_empty(), ParseError::empty_key(line));
    ensure!(is_valid_header_key(key), ParseError::malformed_key(line));

    Ok((key, raw_value.trim()))
}
