use thiserror::Error;

/// Largest bulk string accepted from a client (same cap as Redis)
const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

/// Largest number of array elements accepted from a client
const MAX_ARRAY_LEN: i64 = 1024 * 1024;

/// Commands are flat arrays; anything nested deeper than this is rejected
const MAX_DEPTH: usize = 8;

/// Longest header or inline line accepted without CRLF (same cap as Redis)
const MAX_LINE_LEN: usize = 64 * 1024;

/// Upper bound on array preallocation regardless of the announced count
const MAX_PREALLOC: usize = 1024;

/// RESP (REdis Serialization Protocol) data types
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  /// Simple strings, used for simple responses like "PONG"
  SimpleString(String),
  /// Errors
  Error(String),
  /// Integers
  Integer(i64),
  /// Bulk strings, used for binary-safe strings (can be null)
  BulkString(Option<Vec<u8>>),
  /// Arrays of other values (can be null)
  Array(Option<Vec<Value>>),
}

impl Value {
  /// Create an error response
  pub fn error(msg: impl Into<String>) -> Self {
    Value::Error(msg.into())
  }

  /// Create a non-null bulk string
  pub fn bulk(data: impl Into<Vec<u8>>) -> Self {
    Value::BulkString(Some(data.into()))
  }

  /// Text content of a string-like argument
  pub fn as_text(&self) -> Option<String> {
    match self {
      Value::BulkString(Some(data)) => Some(String::from_utf8_lossy(data).to_string()),
      Value::SimpleString(s) => Some(s.clone()),
      _ => None,
    }
  }

  /// Encode Value to RESP bytes
  pub fn encode(&self) -> Vec<u8> {
    let mut buf = Vec::new();
    self.encode_to(&mut buf);
    buf
  }

  fn encode_to(&self, buf: &mut Vec<u8>) {
    match self {
      Value::SimpleString(s) => write_line(buf, b'+', s.as_bytes()),
      Value::Error(e) => write_line(buf, b'-', e.as_bytes()),
      Value::Integer(i) => write_line(buf, b':', i.to_string().as_bytes()),
      Value::BulkString(None) => buf.extend_from_slice(b"$-1\r\n"),
      Value::BulkString(Some(data)) => {
        write_line(buf, b'$', data.len().to_string().as_bytes());
        buf.extend_from_slice(data);
        buf.extend_from_slice(b"\r\n");
      }
      Value::Array(None) => buf.extend_from_slice(b"*-1\r\n"),
      Value::Array(Some(items)) => {
        write_line(buf, b'*', items.len().to_string().as_bytes());
        for item in items {
          item.encode_to(buf);
        }
      }
    }
  }
}

fn write_line(buf: &mut Vec<u8>, marker: u8, body: &[u8]) {
  buf.push(marker);
  buf.extend_from_slice(body);
  buf.extend_from_slice(b"\r\n");
}

/// Malformed input that can never become a valid frame
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
  #[error("invalid {0} length")]
  InvalidLength(&'static str),
  #[error("invalid integer '{0}'")]
  InvalidInteger(String),
  #[error("bulk string not terminated by CRLF")]
  MissingTerminator,
  #[error("unexpected byte {0:#04x} where a type marker was expected")]
  UnexpectedByte(u8),
  #[error("arrays nested deeper than 8 levels")]
  TooDeep,
  #[error("line longer than 65536 bytes without CRLF")]
  LineTooLong,
}

/// Parser for RESP protocol
pub struct Parser;

impl Parser {
  /// Parse one frame from the front of `buffer`.
  ///
  /// Returns `Ok(None)` while the frame is still incomplete, otherwise the
  /// value and the number of bytes it occupied. Lines that do not start
  /// with a RESP type marker are read as inline commands.
  pub fn parse(buffer: &[u8]) -> Result<Option<(Value, usize)>, ParseError> {
    if buffer.is_empty() {
      return Ok(None);
    }

    let mut pos = 0;
    let result = match buffer[0] {
      b'+' | b'-' | b':' | b'$' | b'*' => Self::parse_value(buffer, &mut pos, 0)?,
      _ => Self::parse_inline(buffer, &mut pos)?,
    };
    Ok(result.map(|value| (value, pos)))
  }

  fn parse_value(
    buffer: &[u8],
    pos: &mut usize,
    depth: usize,
  ) -> Result<Option<Value>, ParseError> {
    if *pos >= buffer.len() {
      return Ok(None);
    }

    let type_byte = buffer[*pos];
    if !matches!(type_byte, b'+' | b'-' | b':' | b'$' | b'*') {
      return Err(ParseError::UnexpectedByte(type_byte));
    }
    *pos += 1;

    let Some(line) = Self::read_line(buffer, pos)? else {
      return Ok(None);
    };
    let text = String::from_utf8_lossy(line).to_string();

    match type_byte {
      b'+' => Ok(Some(Value::SimpleString(text))),
      b'-' => Ok(Some(Value::Error(text))),
      b':' => Ok(Some(Value::Integer(parse_int(&text)?))),
      b'$' => Self::parse_bulk_string(buffer, pos, parse_int(&text)?),
      _ => Self::parse_array(buffer, pos, parse_int(&text)?, depth),
    }
  }

  fn parse_bulk_string(
    buffer: &[u8],
    pos: &mut usize,
    len: i64,
  ) -> Result<Option<Value>, ParseError> {
    if len == -1 {
      return Ok(Some(Value::BulkString(None)));
    }
    if !(0..=MAX_BULK_LEN).contains(&len) {
      return Err(ParseError::InvalidLength("bulk"));
    }

    let len = len as usize;
    if *pos + len + 2 > buffer.len() {
      return Ok(None);
    }
    if &buffer[*pos + len..*pos + len + 2] != b"\r\n" {
      return Err(ParseError::MissingTerminator);
    }

    let data = buffer[*pos..*pos + len].to_vec();
    *pos += len + 2;

    Ok(Some(Value::BulkString(Some(data))))
  }

  fn parse_array(
    buffer: &[u8],
    pos: &mut usize,
    count: i64,
    depth: usize,
  ) -> Result<Option<Value>, ParseError> {
    if depth >= MAX_DEPTH {
      return Err(ParseError::TooDeep);
    }
    if count == -1 {
      return Ok(Some(Value::Array(None)));
    }
    if !(0..=MAX_ARRAY_LEN).contains(&count) {
      return Err(ParseError::InvalidLength("multibulk"));
    }

    let mut items = Vec::with_capacity((count as usize).min(MAX_PREALLOC));
    for _ in 0..count {
      match Self::parse_value(buffer, pos, depth + 1)? {
        Some(item) => items.push(item),
        None => return Ok(None),
      }
    }

    Ok(Some(Value::Array(Some(items))))
  }

  /// `PING hello\r\n` style command typed by a human
  fn parse_inline(buffer: &[u8], pos: &mut usize) -> Result<Option<Value>, ParseError> {
    let Some(line) = Self::read_line(buffer, pos)? else {
      return Ok(None);
    };
    let items = String::from_utf8_lossy(line)
      .split_whitespace()
      .map(|word| Value::bulk(word.as_bytes()))
      .collect();
    Ok(Some(Value::Array(Some(items))))
  }

  /// Next CRLF-terminated line, searched within `MAX_LINE_LEN` bytes
  fn read_line<'a>(buffer: &'a [u8], pos: &mut usize) -> Result<Option<&'a [u8]>, ParseError> {
    let start = *pos;
    let window = &buffer[start..buffer.len().min(start + MAX_LINE_LEN + 2)];
    match window.windows(2).position(|w| w == b"\r\n") {
      Some(offset) => {
        let end = start + offset;
        *pos = end + 2;
        Ok(Some(&buffer[start..end]))
      }
      None if window.len() >= MAX_LINE_LEN + 2 => Err(ParseError::LineTooLong),
      None => Ok(None),
    }
  }
}

fn parse_int(text: &str) -> Result<i64, ParseError> {
  text
    .parse::<i64>()
    .map_err(|_| ParseError::InvalidInteger(text.to_string()))
}
