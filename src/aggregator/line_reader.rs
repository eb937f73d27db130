use std::io::{self, BufRead};

/// Read the next `\n`-terminated line into `line`, without the terminator
///
/// Returns `Ok(false)` at end of input. A final line without a terminator is
/// still returned. Lines longer than `limit` bytes fail with
/// [`io::ErrorKind::InvalidData`] instead of being truncated.
pub fn read_line_bounded<R: BufRead + ?Sized>(reader: &mut R, line: &mut Vec<u8>, limit: usize) -> io::Result<bool> {
    line.clear();

    loop {
        let (used, done) = {
            let available = match reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            if available.is_empty() {
                return Ok(!line.is_empty());
            }

            let (chunk, done) = match available.iter().position(|&b| b == b'\n') {
                Some(end) => (&available[..end], true),
                None => (available, false),
            };

            if line.len() + chunk.len() > limit {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("line is longer than the {limit} byte buffer"),
                ));
            }

            line.extend_from_slice(chunk);
            (chunk.len() + usize::from(done), done)
        };

        reader.consume(used);
        if done {
            return Ok(true);
        }
    }
}
