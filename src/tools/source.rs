//! Buffered, forward-only line source with pushback.
//!
//! Sources are read once. Lines a consumer looked at but did not keep are
//! pushed back to the front of the queue instead of re-reading the input,
//! which keeps standard input single-pass.

use std::collections::VecDeque;
use std::io::{self, BufRead};

use crate::types::{SourceId, SourceLine};

/// A numbered line reader over any `BufRead`.
pub struct LineSource {
    id: SourceId,
    reader: Box<dyn BufRead>,
    pending: VecDeque<SourceLine>,
    next_number: usize,
    exhausted: bool,
}

impl LineSource {
    pub fn new(id: SourceId, reader: Box<dyn BufRead>) -> Self {
        Self {
            id,
            reader,
            pending: VecDeque::new(),
            next_number: 1,
            exhausted: false,
        }
    }

    /// Build a source over in-memory text.
    pub fn from_text(id: SourceId, text: &str) -> Self {
        Self::new(id, Box::new(io::Cursor::new(text.to_string().into_bytes())))
    }

    pub fn id(&self) -> &SourceId {
        &self.id
    }

    /// Read one more line from the underlying reader.
    fn read_line(&mut self) -> io::Result<Option<SourceLine>> {
        if self.exhausted {
            return Ok(None);
        }
        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            self.exhausted = true;
            return Ok(None);
        }
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        let line = SourceLine::new(self.next_number, buf);
        self.next_number += 1;
        Ok(Some(line))
    }

    /// Take the next line, pending lines first.
    pub fn next_line(&mut self) -> io::Result<Option<SourceLine>> {
        match self.pending.pop_front() {
            Some(line) => Ok(Some(line)),
            None => self.read_line(),
        }
    }

    /// Look at the next line without consuming it.
    pub fn peek(&mut self) -> io::Result<Option<&SourceLine>> {
        self.fill(1)?;
        Ok(self.pending.front())
    }

    /// Buffer up to `count` lines ahead; returns how many are buffered.
    pub fn fill(&mut self, count: usize) -> io::Result<usize> {
        while self.pending.len() < count {
            match self.read_line()? {
                Some(line) => self.pending.push_back(line),
                None => break,
            }
        }
        Ok(self.pending.len())
    }

    /// Lines currently buffered, in order.
    pub fn buffered(&self) -> impl Iterator<Item = &SourceLine> {
        self.pending.iter()
    }

    /// Put a single line back so it is read next.
    pub fn unread(&mut self, line: SourceLine) {
        self.pending.push_front(line);
    }

    /// Put lines back, in order, ahead of anything already pending.
    pub fn unread_all(&mut self, lines: Vec<SourceLine>) {
        for line in lines.into_iter().rev() {
            self.pending.push_front(line);
        }
    }
}
