use std::io::{self, ErrorKind, Read};

/// Sequential byte reader over a caller-owned refill buffer.
///
/// The absolute offset is never carried incrementally: it is the number of
/// bytes in completed fills plus the read position inside the current fill,
/// recomputed by [`ByteCursor::offset`] whenever it is asked for. Short fills
/// (the last block of a file, or reads from a pipe) therefore cannot skew it.
pub struct ByteCursor<'a, R> {
    reader: R,
    buf: &'a mut [u8],
    pos: usize,
    end: usize,
    /// Bytes in all fills before the current one.
    filled_before: u64,
}

impl<'a, R: Read> ByteCursor<'a, R> {
    pub fn new(reader: R, buf: &'a mut [u8]) -> Self {
        assert!(!buf.is_empty(), "read buffer must not be empty");
        Self {
            reader,
            buf,
            pos: 0,
            end: 0,
            filled_before: 0,
        }
    }

    /// Next byte, or `None` once the reader is exhausted.
    #[inline(always)]
    pub fn try_next_byte(&mut self) -> io::Result<Option<u8>> {
        if self.pos >= self.end && !self.refill()? {
            return Ok(None);
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(Some(b))
    }

    /// Absolute offset of the next byte to be returned.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.filled_before + self.pos as u64
    }

    /// Drops bytes through the next `\n` or NUL. Returns `false` if the
    /// stream ended first.
    pub fn skip_line(&mut self) -> io::Result<bool> {
        loop {
            if let Some(i) = memchr::memchr2(b'\n', 0, &self.buf[self.pos..self.end]) {
                self.pos += i + 1;
                return Ok(true);
            }
            self.pos = self.end;
            if !self.refill()? {
                return Ok(false);
            }
        }
    }

    #[cold]
    fn refill(&mut self) -> io::Result<bool> {
        self.filled_before += self.end as u64;
        self.pos = 0;
        self.end = 0;
        loop {
            match self.reader.read(self.buf) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.end = n;
                    return Ok(true);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reader that hands out at most `step` bytes per call.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn yields_all_bytes_and_tracks_offset() {
        let data = b"0123456789abcdef";
        for cap in 1..=20 {
            let mut buf = vec![0u8; cap];
            let mut cursor = ByteCursor::new(&data[..], &mut buf);
            let mut out = Vec::new();
            assert_eq!(cursor.offset(), 0);
            while let Some(b) = cursor.try_next_byte().unwrap() {
                out.push(b);
                assert_eq!(cursor.offset(), out.len() as u64);
            }
            assert_eq!(out, data);
            assert_eq!(cursor.offset(), data.len() as u64);
        }
    }

    #[test]
    fn short_reads_do_not_skew_offset() {
        let data = b">id\nACDEFGHIKLMNPQRSTVWY\n";
        let mut buf = vec![0u8; 8];
        let mut cursor = ByteCursor::new(Trickle { data, step: 3 }, &mut buf);
        let mut n = 0u64;
        while cursor.try_next_byte().unwrap().is_some() {
            n += 1;
            assert_eq!(cursor.offset(), n);
        }
        assert_eq!(n, data.len() as u64);
    }

    #[test]
    fn skip_line_crosses_refills() {
        let data = b"a long line that spans buffers\nnext";
        let mut buf = vec![0u8; 4];
        let mut cursor = ByteCursor::new(&data[..], &mut buf);
        assert!(cursor.skip_line().unwrap());
        assert_eq!(cursor.offset(), 31);
        assert_eq!(cursor.try_next_byte().unwrap(), Some(b'n'));
        assert!(!cursor.skip_line().unwrap());
        assert_eq!(cursor.offset(), data.len() as u64);
        assert_eq!(cursor.try_next_byte().unwrap(), None);
    }

    #[test]
    fn skip_line_stops_at_nul() {
        let data = b"abc\0def";
        let mut buf = vec![0u8; 16];
        let mut cursor = ByteCursor::new(&data[..], &mut buf);
        assert!(cursor.skip_line().unwrap());
        assert_eq!(cursor.try_next_byte().unwrap(), Some(b'd'));
    }
}
