//! Property-based tests for basic serialization primitives.

use std::io::Cursor;

use proptest::prelude::*;

use crate::serialization::{ReadElaExt, SerializationError, WriteElaExt};

proptest! {
    #[test]
    fn var_uint_write_then_read_round_trip(s in 0u64..0x2_0000u64) {
        ela_test::init();

        // Maximum encoding size of a varint is 9 bytes.
        let mut buf = [0u8; 8+1];
        Cursor::new(&mut buf[..]).write_var_uint(s).unwrap();
        let expect_s = Cursor::new(&buf[..]).read_var_uint().unwrap();
        prop_assert_eq!(s, expect_s);
    }

    #[test]
    fn var_uint_read_then_write_round_trip(bytes in prop::array::uniform9(0u8..)) {
        ela_test::init();

        // Only do the test if the bytes were valid.
        if let Ok(s) = Cursor::new(&bytes[..]).read_var_uint() {
            // The varint encoding is variable-length, so we may not even
            // read all of the input bytes. Overwrite a copy of the input with
            // the encoding of s, so that a different encoding is caught on
            // the part that's written.
            let mut expect_bytes = bytes;
            Cursor::new(&mut expect_bytes[..]).write_var_uint(s).unwrap();
            prop_assert_eq!(bytes, expect_bytes);
        }
    }
}

#[test]
fn non_canonical_var_uint_is_rejected() {
    ela_test::init();

    let err = Cursor::new(b"\xfd\x10\x00").read_var_uint().unwrap_err();
    assert!(matches!(err, SerializationError::Parse("non-canonical varint")));
}

#[test]
fn var_string_round_trip_and_invalid_utf8() {
    ela_test::init();

    let mut buf = Vec::new();
    buf.write_var_string("nickname").unwrap();
    assert_eq!(buf[0], 8);
    assert_eq!(Cursor::new(&buf).read_var_string().unwrap(), "nickname");

    let invalid = [2u8, 0xff, 0xfe];
    assert!(matches!(
        Cursor::new(&invalid[..]).read_var_string(),
        Err(SerializationError::Utf8(_))
    ));
}
