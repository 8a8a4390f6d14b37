use bytes::{Buf, Bytes};

use super::SourceError;

/// The header of an EBML element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
	pub id: u32,

	/// The size of the body, or None when the writer didn't know it (live recordings).
	pub size: Option<u64>,
}

/// Walks EBML elements in a buffer.
///
/// Bodies are returned as slices of the original buffer, so payloads are never copied.
pub struct Reader {
	buf: Bytes,
}

impl Reader {
	pub fn new(buf: Bytes) -> Self {
		Self { buf }
	}

	pub fn is_empty(&self) -> bool {
		!self.buf.has_remaining()
	}

	/// The ID of the next element, without consuming it.
	pub fn peek_id(&self) -> Result<u32, SourceError> {
		let (id, _) = id(&self.buf)?;
		Ok(id)
	}

	pub fn header(&mut self) -> Result<Header, SourceError> {
		let (id, id_len) = id(&self.buf)?;
		let (size, size_len) = vint(&self.buf[id_len..])?;

		let unknown = size == (1 << (7 * size_len)) - 1;
		self.buf.advance(id_len + size_len);

		Ok(Header {
			id,
			size: (!unknown).then_some(size),
		})
	}

	/// The body of the element whose header was just read.
	///
	/// An unknown size extends to the end of the buffer.
	pub fn body(&mut self, size: Option<u64>) -> Result<Bytes, SourceError> {
		match size {
			Some(size) => self.take(size),
			None => Ok(self.buf.split_off(0)),
		}
	}

	/// The body of an element that must have a known size.
	pub fn data(&mut self, header: Header) -> Result<Bytes, SourceError> {
		let size = header
			.size
			.ok_or_else(|| SourceError::Invalid(format!("unknown size for element {:#x}", header.id)))?;
		self.take(size)
	}

	pub fn skip(&mut self, header: Header) -> Result<(), SourceError> {
		self.data(header).map(drop)
	}

	pub fn take(&mut self, size: u64) -> Result<Bytes, SourceError> {
		let size = usize::try_from(size).map_err(|_| SourceError::Truncated)?;
		if size > self.buf.remaining() {
			return Err(SourceError::Truncated);
		}

		Ok(self.buf.split_to(size))
	}
}

// Element IDs keep their length marker.
fn id(data: &[u8]) -> Result<(u32, usize), SourceError> {
	let first = *data.first().ok_or(SourceError::Truncated)?;
	let len = first.leading_zeros() as usize + 1;
	if len > 4 {
		return Err(SourceError::Invalid(format!("element id too long: {first:#04x}")));
	}

	let bytes = data.get(..len).ok_or(SourceError::Truncated)?;
	let id = bytes.iter().fold(0u32, |acc, b| (acc << 8) | *b as u32);

	Ok((id, len))
}

/// Decode a variable length integer with its length marker removed.
///
/// Returns the value and the number of bytes it occupied.
pub fn vint(data: &[u8]) -> Result<(u64, usize), SourceError> {
	let first = *data.first().ok_or(SourceError::Truncated)?;
	if first == 0 {
		return Err(SourceError::Invalid("variable length integer too long".to_string()));
	}

	let len = first.leading_zeros() as usize + 1;
	let bytes = data.get(1..len).ok_or(SourceError::Truncated)?;

	let value = bytes
		.iter()
		.fold(first as u64 & (0xff >> len), |acc, b| (acc << 8) | *b as u64);

	Ok((value, len))
}

/// An unsigned integer element; an empty body means zero.
pub fn uint(body: &[u8]) -> Result<u64, SourceError> {
	if body.len() > 8 {
		return Err(SourceError::Invalid(format!("integer too long: {} bytes", body.len())));
	}

	Ok(body.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64))
}

/// A string element, without the optional NUL padding.
pub fn string(body: &[u8]) -> Result<String, SourceError> {
	let end = body.iter().position(|b| *b == 0).unwrap_or(body.len());
	std::str::from_utf8(&body[..end])
		.map(str::to_string)
		.map_err(|_| SourceError::Invalid("string is not UTF-8".to_string()))
}
