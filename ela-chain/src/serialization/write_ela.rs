use std::io;

use byteorder::{LittleEndian, WriteBytesExt};

/// Extends [`Write`] with methods for writing chain types.
///
/// [`Write`]: https://doc.rust-lang.org/std/io/trait.Write.html
pub trait WriteElaExt: io::Write {
    /// Writes a `u64` using the variable-length integer encoding.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ela_chain::serialization::WriteElaExt;
    ///
    /// let mut buf = Vec::new();
    /// buf.write_var_uint(0x12).unwrap();
    /// assert_eq!(buf, b"\x12");
    ///
    /// let mut buf = Vec::new();
    /// buf.write_var_uint(0xfd).unwrap();
    /// assert_eq!(buf, b"\xfd\xfd\x00");
    ///
    /// let mut buf = Vec::new();
    /// buf.write_var_uint(0xaafd).unwrap();
    /// assert_eq!(buf, b"\xfd\xfd\xaa");
    /// ```
    #[inline]
    fn write_var_uint(&mut self, n: u64) -> io::Result<()> {
        match n {
            0x0000_0000..=0x0000_00fc => self.write_u8(n as u8),
            0x0000_00fd..=0x0000_ffff => {
                self.write_u8(0xfd)?;
                self.write_u16::<LittleEndian>(n as u16)
            }
            0x0001_0000..=0xffff_ffff => {
                self.write_u8(0xfe)?;
                self.write_u32::<LittleEndian>(n as u32)
            }
            _ => {
                self.write_u8(0xff)?;
                self.write_u64::<LittleEndian>(n)
            }
        }
    }

    /// Writes a length-prefixed byte string.
    #[inline]
    fn write_var_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.write_var_uint(bytes.len() as u64)?;
        self.write_all(bytes)
    }

    /// Writes a length-prefixed UTF-8 string.
    #[inline]
    fn write_var_string(&mut self, string: &str) -> io::Result<()> {
        self.write_var_bytes(string.as_bytes())
    }

    /// Convenience method to write exactly 32 u8's.
    #[inline]
    fn write_32_bytes(&mut self, bytes: &[u8; 32]) -> io::Result<()> {
        self.write_all(bytes)
    }
}

/// Mark all types implementing `Write` as implementing the extension.
impl<W: io::Write + ?Sized> WriteElaExt for W {}
