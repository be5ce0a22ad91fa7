// LogRoute - platform/fs.rs
//
// Incremental input reader for the CLI. Lines with invalid UTF-8 are
// converted lossily rather than dropped, so line numbers stay aligned with
// the source.
//
// Input is consumed in bounded chunks so memory stays flat on unbounded
// streams (e.g. `tail -f app.log | logroute`). A chunk ends early as soon as
// the next line is not yet buffered, so lines already read are handed on
// instead of waiting for more input.

use std::io::{self, BufRead, BufReader, Read};

/// Iterator over bounded chunks of lines from a reader.
///
/// Each item holds at least one line and at most `max_lines`. Line endings
/// (`\n` or `\r\n`) are stripped. A final line without a newline is still
/// yielded. After an I/O error the iterator is exhausted.
pub struct LineChunks<R> {
    reader: BufReader<R>,
    max_lines: usize,
    buf: Vec<u8>,
    done: bool,
}

impl<R: Read> LineChunks<R> {
    pub fn new(reader: R, max_lines: usize) -> Self {
        Self {
            reader: BufReader::new(reader),
            max_lines: max_lines.max(1),
            buf: Vec::new(),
            done: false,
        }
    }

    /// True when a complete line is already buffered and can be read
    /// without blocking.
    fn line_buffered(&self) -> bool {
        self.reader.buffer().contains(&b'\n')
    }
}

impl<R: Read> Iterator for LineChunks<R> {
    type Item = io::Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut lines = Vec::new();
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    break;
                }
                Ok(_) => lines.push(trim_line_ending(&self.buf)),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
            if lines.len() >= self.max_lines || !self.line_buffered() {
                break;
            }
        }

        if lines.is_empty() {
            None
        } else {
            Some(Ok(lines))
        }
    }
}

fn trim_line_ending(line: &[u8]) -> String {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}
