use std::{convert::TryInto, io};

use byteorder::{LittleEndian, ReadBytesExt};

use super::{SerializationError, MAX_PROTOCOL_MESSAGE_LEN};

/// Extends [`Read`] with methods for reading chain types.
///
/// [`Read`]: https://doc.rust-lang.org/std/io/trait.Read.html
pub trait ReadElaExt: io::Read {
    /// Reads a `u64` using the variable-length integer encoding.
    ///
    /// # Security
    ///
    /// Deserialized sizes must be validated before being used.
    ///
    /// Preallocating vectors using untrusted sizes allows memory denial of
    /// service attacks, so sizes greater than the protocol message length
    /// limit are rejected here. Non-canonical encodings are rejected too, so
    /// that every value has exactly one byte representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use ela_chain::serialization::ReadElaExt;
    ///
    /// use std::io::Cursor;
    /// assert_eq!(0x12, Cursor::new(b"\x12").read_var_uint().unwrap());
    /// assert_eq!(0xfd, Cursor::new(b"\xfd\xfd\x00").read_var_uint().unwrap());
    /// assert_eq!(0xaafd, Cursor::new(b"\xfd\xfd\xaa").read_var_uint().unwrap());
    /// ```
    ///
    /// Sizes greater than the maximum message length are invalid:
    /// ```
    /// # use ela_chain::serialization::ReadElaExt;
    /// # use std::io::Cursor;
    /// Cursor::new(b"\xfe\xfd\xaa\xbb\x00").read_var_uint().unwrap_err();
    /// ```
    #[inline]
    fn read_var_uint(&mut self) -> Result<u64, SerializationError> {
        use SerializationError::Parse;
        let flag_byte = self.read_u8()?;
        let size = match flag_byte {
            n @ 0x00..=0xfc => Ok(n as u64),
            0xfd => match self.read_u16::<LittleEndian>()? {
                n @ 0x0000_00fd..=0x0000_ffff => Ok(n as u64),
                _ => Err(Parse("non-canonical varint")),
            },
            0xfe => match self.read_u32::<LittleEndian>()? {
                n @ 0x0001_0000..=0xffff_ffff => Ok(n as u64),
                _ => Err(Parse("non-canonical varint")),
            },
            0xff => match self.read_u64::<LittleEndian>()? {
                n @ 0x1_0000_0000..=0xffff_ffff_ffff_ffff => Ok(n),
                _ => Err(Parse("non-canonical varint")),
            },
        }?;

        // # Security
        // Defence-in-depth for memory DoS via preallocation.
        if size
            > MAX_PROTOCOL_MESSAGE_LEN
                .try_into()
                .expect("usize fits in u64")
        {
            Err(Parse("varint larger than protocol message limit"))?;
        }

        Ok(size)
    }

    /// Reads a length-prefixed byte string.
    #[inline]
    fn read_var_bytes(&mut self) -> Result<Vec<u8>, SerializationError> {
        let len: usize = self.read_var_uint()?.try_into()?;
        let mut bytes = vec![0u8; len];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    /// Reads a length-prefixed UTF-8 string.
    #[inline]
    fn read_var_string(&mut self) -> Result<String, SerializationError> {
        Ok(String::from_utf8(self.read_var_bytes()?)?)
    }

    /// Convenience method to read a `[u8; 32]`.
    #[inline]
    fn read_32_bytes(&mut self) -> io::Result<[u8; 32]> {
        let mut bytes = [0; 32];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    /// Convenience method to read a `[u8; 21]`.
    #[inline]
    fn read_21_bytes(&mut self) -> io::Result<[u8; 21]> {
        let mut bytes = [0; 21];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}

/// Mark all types implementing `Read` as implementing the extension.
impl<R: io::Read + ?Sized> ReadElaExt for R {}
