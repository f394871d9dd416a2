//! Newline framing over a TCP byte stream
//!
//! The protocol has no length prefix. Bytes are accumulated until a `\n`
//! arrives; anything after the last newline stays buffered for the next read.
//! A partial line that outgrows the limit is dropped through its newline, so
//! no fragment of it is ever framed as a line of its own.

/// Result of feeding one chunk into a [`LineBuffer`]
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Frames {
    /// Complete lines, newline (and a trailing `\r`) removed, empty lines skipped
    pub lines: Vec<String>,
    /// Bytes of an over-long partial line that were thrown away
    pub discarded: usize,
}

/// Accumulates stream bytes and yields complete lines
#[derive(Debug)]
pub struct LineBuffer {
    buf: Vec<u8>,
    max_line_bytes: usize,
    /// Skipping the rest of an over-long line until its newline
    discarding: bool,
}

impl LineBuffer {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_line_bytes,
            discarding: false,
        }
    }

    /// Bytes of the partial line waiting for its newline
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }

    /// Append a chunk and extract every complete line
    pub fn push(&mut self, mut chunk: &[u8]) -> Frames {
        let mut frames = Frames::default();

        if self.discarding {
            match chunk.iter().position(|&b| b == b'\n') {
                Some(end) => {
                    frames.discarded = end + 1;
                    chunk = &chunk[end + 1..];
                    self.discarding = false;
                }
                None => {
                    frames.discarded = chunk.len();
                    return frames;
                }
            }
        }

        self.buf.extend_from_slice(chunk);

        let mut start = 0;
        while let Some(offset) = self.buf[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let mut line = &self.buf[start..end];
            if let [rest @ .., b'\r'] = line {
                line = rest;
            }
            if !line.is_empty() {
                frames.lines.push(String::from_utf8_lossy(line).into_owned());
            }
            start = end + 1;
        }
        self.buf.drain(..start);

        if self.buf.len() > self.max_line_bytes {
            frames.discarded += self.buf.len();
            self.buf.clear();
            self.discarding = true;
        }

        frames
    }
}
