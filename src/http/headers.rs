//! Header field container and field-line parsing.
//!
//! Names are matched case-insensitively. Repeated fields are merged with
//! `", "` on [`Headers::set`], the way HTTP allows a list-valued field to be
//! split across several lines.

use thiserror::Error;

const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HeaderError {
    /// A field line had no `:` separator, or its value was not UTF-8 or
    /// held a bare CR, LF or NUL.
    #[error("malformed header")]
    MalformedHeader,
    /// The field name was empty, had whitespace before the colon, or
    /// contained a non-token character.
    #[error("malformed header name")]
    MalformedHeaderName,
    /// A value contained CR, LF or NUL and would break the framing.
    #[error("invalid header value")]
    InvalidHeaderValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Field {
    /// Lower-cased lookup key.
    key: String,
    /// Spelling of the first insertion, used when serializing.
    name: String,
    value: String,
}

/// Ordered, case-insensitive header fields.
///
/// Iteration follows insertion order of the first occurrence of each name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    fields: Vec<Field>,
}

impl Headers {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the (possibly comma-joined) value for `name`.
    ///
    /// # Arguments
    ///
    /// * `name` - Header name, matched case-insensitively
    ///
    /// # Returns
    ///
    /// `Some(&str)` if the field is present, `None` otherwise.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.fields[i].value.as_str())
    }

    /// Whether a field named `name` is present, ignoring case.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Adds a value, joining it onto any existing value with `", "`.
    ///
    /// # Arguments
    ///
    /// * `name` - Field name; must be an HTTP token
    /// * `value` - Field value; must not contain CR, LF or NUL
    ///
    /// # Errors
    ///
    /// [`HeaderError::MalformedHeaderName`] or
    /// [`HeaderError::InvalidHeaderValue`]; the container is left unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// # use httpwire::http::headers::Headers;
    /// let mut headers = Headers::new();
    /// headers.set("Accept", "text/html").unwrap();
    /// headers.set("accept", "text/plain").unwrap();
    /// assert_eq!(headers.get("ACCEPT"), Some("text/html, text/plain"));
    /// assert!(headers.set("Bad Name", "x").is_err());
    /// ```
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        validate_field(name, value)?;

        match self.position(name) {
            Some(i) => {
                let field = &mut self.fields[i];
                field.value.push_str(", ");
                field.value.push_str(value);
            }
            None => self.push(name, value),
        }
        Ok(())
    }

    /// Overrides any existing value for `name`.
    ///
    /// Validation is the same as for [`Headers::set`].
    pub fn replace(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        validate_field(name, value)?;

        match self.position(name) {
            Some(i) => self.fields[i].value = value.to_string(),
            None => self.push(name, value),
        }
        Ok(())
    }

    /// Appends a field whose name and value are fixed by this crate.
    pub(crate) fn push_known(&mut self, name: &'static str, value: String) {
        debug_assert!(validate_field(name, &value).is_ok());
        self.fields.push(Field {
            key: name.to_ascii_lowercase(),
            name: name.to_string(),
            value,
        });
    }

    /// Removes `name`, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.position(name)
            .map(|i| self.fields.remove(i).value)
    }

    /// Number of distinct field names.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no fields are present.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|f| (f.name.as_str(), f.value.as_str()))
    }

    /// Parses as many complete field lines from `data` as are available.
    ///
    /// Returns the number of bytes consumed and whether the blank line that
    /// ends the header block was reached (its CRLF is included in the
    /// count). A trailing partial line is left unconsumed; the caller passes
    /// it again, with more bytes appended, on the next call.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool), HeaderError> {
        let mut read = 0;

        loop {
            let Some(idx) = find_crlf(&data[read..]) else {
                return Ok((read, false));
            };

            if idx == 0 {
                return Ok((read + CRLF.len(), true));
            }

            let (name, value) = parse_field_line(&data[read..read + idx])?;
            self.set(name, value).map_err(|e| match e {
                HeaderError::InvalidHeaderValue => HeaderError::MalformedHeader,
                other => other,
            })?;
            read += idx + CRLF.len();
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.key.eq_ignore_ascii_case(name))
    }

    fn push(&mut self, name: &str, value: &str) {
        self.fields.push(Field {
            key: name.to_ascii_lowercase(),
            name: name.to_string(),
            value: value.to_string(),
        });
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Returns whether `s` is a non-empty HTTP token (`tchar`s only).
pub fn is_token(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_tchar)
}

fn is_tchar(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_'
                | b'`' | b'|' | b'~'
        )
}

fn validate_field(name: &str, value: &str) -> Result<(), HeaderError> {
    if !is_token(name) {
        return Err(HeaderError::MalformedHeaderName);
    }
    if value.bytes().any(|b| matches!(b, b'\r' | b'\n' | b'\0')) {
        return Err(HeaderError::InvalidHeaderValue);
    }
    Ok(())
}

pub(crate) fn find_crlf(data: &[u8]) -> Option<usize> {
    data.windows(CRLF.len()).position(|w| w == CRLF)
}

fn parse_field_line(line: &[u8]) -> Result<(&str, &str), HeaderError> {
    let colon = line
        .iter()
        .position(|&b| b == b':')
        .ok_or(HeaderError::MalformedHeader)?;
    let (name, value) = (&line[..colon], &line[colon + 1..]);

    // "Host : x" is rejected outright, leading space is tolerated
    if name.ends_with(b" ") {
        return Err(HeaderError::MalformedHeaderName);
    }

    let name = std::str::from_utf8(name)
        .map_err(|_| HeaderError::MalformedHeaderName)?
        .trim_matches(' ');
    if !is_token(name) {
        return Err(HeaderError::MalformedHeaderName);
    }

    let value = std::str::from_utf8(value)
        .map_err(|_| HeaderError::MalformedHeader)?
        .trim_matches(|c| c == ' ' || c == '\t');

    Ok((name, value))
}
