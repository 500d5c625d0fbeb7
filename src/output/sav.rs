//! `.SAV` and RW18 binary container encoding (§6).

/// Encode a `.SAV` file: 4-byte header `{load_address:u16le, length:u16le}`
/// followed by the image bytes.
pub fn encode_sav(load_address: u16, image: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(4 + image.len());
	out.extend_from_slice(&load_address.to_le_bytes());
	out.extend_from_slice(&(image.len() as u16).to_le_bytes());
	out.extend_from_slice(image);
	out
}

/// Encode an Apple DOS 3.3 RWTS18 record: 6-byte header
/// `{type:u8, count:u8, address:u16le, length:u16le}` followed by the image.
pub fn encode_rw18(record_type: u8, count: u8, address: u16, image: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(6 + image.len());
	out.push(record_type);
	out.push(count);
	out.extend_from_slice(&address.to_le_bytes());
	out.extend_from_slice(&(image.len() as u16).to_le_bytes());
	out.extend_from_slice(image);
	out
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;

	#[test]
	fn sav_header_and_body() {
		let bytes = encode_sav(0x0800, &[0x00, 0xFF]);
		assert_eq!(bytes, vec![0x00, 0x08, 0x02, 0x00, 0x00, 0xFF]);
	}

	#[test]
	fn rw18_header_and_body() {
		let bytes = encode_rw18(1, 2, 0x0800, &[0xAB]);
		assert_eq!(bytes, vec![1, 2, 0x00, 0x08, 0x01, 0x00, 0xAB]);
	}

	proptest! {
		#[test]
		fn sav_header_round_trips(load_address: u16, image in prop::collection::vec(any::<u8>(), 0..64)) {
			let bytes = encode_sav(load_address, &image);
			prop_assert_eq!(&bytes[0..2], load_address.to_le_bytes());
			prop_assert_eq!(&bytes[2..4], (image.len() as u16).to_le_bytes());
			prop_assert_eq!(&bytes[4..], image.as_slice());
		}

		#[test]
		fn rw18_header_round_trips(record_type: u8, count: u8, address: u16, image in prop::collection::vec(any::<u8>(), 0..64)) {
			let bytes = encode_rw18(record_type, count, address, &image);
			prop_assert_eq!(bytes[0], record_type);
			prop_assert_eq!(bytes[1], count);
			prop_assert_eq!(&bytes[2..4], address.to_le_bytes());
			prop_assert_eq!(&bytes[4..6], (image.len() as u16).to_le_bytes());
			prop_assert_eq!(&bytes[6..], image.as_slice());
		}
	}
}
