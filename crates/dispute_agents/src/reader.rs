use std::io::Read;

const CHUNK_BYTES: usize = 8192;

#[derive(Debug)]
pub(crate) enum BoundedLine {
    Line {
        line_number: usize,
        bytes: Vec<u8>,
    },
    TooLong {
        line_number: usize,
        observed_bytes: usize,
        max_line_bytes: usize,
    },
    IoError {
        line_number: usize,
    },
}

/// Splits a byte stream on `\n` without ever holding more than
/// `max_line_bytes` of a single line. Oversized lines are skipped and reported.
pub(crate) struct BoundedLineReader<R: Read> {
    inner: R,
    max_line_bytes: usize,
    chunk: Box<[u8; CHUNK_BYTES]>,
    pos: usize,
    len: usize,
    line: Vec<u8>,
    observed: usize,
    overflowed: bool,
    line_number: usize,
    finished: bool,
}

impl<R: Read> BoundedLineReader<R> {
    pub(crate) fn new(inner: R, max_line_bytes: usize) -> Self {
        Self {
            inner,
            max_line_bytes,
            chunk: Box::new([0u8; CHUNK_BYTES]),
            pos: 0,
            len: 0,
            line: Vec::new(),
            observed: 0,
            overflowed: false,
            line_number: 0,
            finished: false,
        }
    }

    fn refill(&mut self) -> std::io::Result<usize> {
        self.pos = 0;
        self.len = loop {
            match self.inner.read(&mut self.chunk[..]) {
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                other => break other?,
            }
        };
        Ok(self.len)
    }

    fn take_line(&mut self) -> BoundedLine {
        self.line_number += 1;
        let line_number = self.line_number;
        let outcome = if self.overflowed {
            BoundedLine::TooLong {
                line_number,
                observed_bytes: self.observed,
                max_line_bytes: self.max_line_bytes,
            }
        } else {
            BoundedLine::Line {
                line_number,
                bytes: std::mem::take(&mut self.line),
            }
        };
        self.line.clear();
        self.observed = 0;
        self.overflowed = false;
        outcome
    }

    fn accept(&mut self, start: usize, end: usize) {
        self.observed = self.observed.saturating_add(end - start);
        if self.observed > self.max_line_bytes {
            self.overflowed = true;
            self.line.clear();
        }
        if !self.overflowed {
            self.line.extend_from_slice(&self.chunk[start..end]);
        }
    }
}

impl<R: Read> Iterator for BoundedLineReader<R> {
    type Item = BoundedLine;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            if self.pos >= self.len {
                match self.refill() {
                    Ok(0) => {
                        self.finished = true;
                        return (self.overflowed || !self.line.is_empty())
                            .then(|| self.take_line());
                    }
                    Ok(_) => {}
                    Err(_) => {
                        self.finished = true;
                        self.line_number += 1;
                        return Some(BoundedLine::IoError {
                            line_number: self.line_number,
                        });
                    }
                }
            }

            let start = self.pos;
            match self.chunk[start..self.len].iter().position(|b| *b == b'\n') {
                Some(offset) => {
                    self.accept(start, start + offset);
                    self.pos = start + offset + 1;
                    return Some(self.take_line());
                }
                None => {
                    self.accept(start, self.len);
                    self.pos = self.len;
                }
            }
        }
    }
}
