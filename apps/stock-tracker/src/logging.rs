use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

pub type SharedLogBuffer = Arc<Mutex<LogBuffer>>;

/// Bounded ring of formatted log lines, drawn in the Logs panel.
pub struct LogBuffer {
    lines: VecDeque<String>,
    max_lines: usize,
    pushed: u64,
}

impl LogBuffer {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.max(1),
            pushed: 0,
        }
    }

    pub fn shared(max_lines: usize) -> SharedLogBuffer {
        Arc::new(Mutex::new(Self::new(max_lines)))
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        if line.is_empty() {
            return;
        }
        self.lines.push_back(line);
        self.pushed += 1;
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total lines ever accepted; changes whenever the buffer does.
    pub fn generation(&self) -> u64 {
        self.pushed
    }

    /// Up to `count` lines ending `skip_from_end` lines before the newest, oldest first.
    pub fn tail(&self, count: usize, skip_from_end: usize) -> Vec<String> {
        let skip = skip_from_end.min(self.lines.len());
        let mut visible: Vec<String> = self
            .lines
            .iter()
            .rev()
            .skip(skip)
            .take(count)
            .cloned()
            .collect();
        visible.reverse();
        visible
    }
}

#[derive(Clone)]
pub struct LogMakeWriter {
    buffer: SharedLogBuffer,
}

impl LogMakeWriter {
    pub fn new(buffer: SharedLogBuffer) -> Self {
        Self { buffer }
    }
}

impl<'a> MakeWriter<'a> for LogMakeWriter {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogWriter {
            buffer: self.buffer.clone(),
            partial: String::new(),
        }
    }
}

/// Splits writes into lines; a trailing fragment is flushed on drop.
pub struct LogWriter {
    buffer: SharedLogBuffer,
    partial: String,
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(idx) = self.partial.find('\n') {
            let line = self.partial[..idx].trim_end_matches('\r').to_string();
            self.partial.drain(..=idx);
            self.buffer.lock().push_line(line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let line = self.partial.trim();
        if !line.is_empty() {
            self.buffer.lock().push_line(line.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LogBuffer, LogMakeWriter};
    use std::io::Write;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn buffer_drops_oldest_lines() {
        let mut buffer = LogBuffer::new(2);
        buffer.push_line("a");
        buffer.push_line("");
        buffer.push_line("b");
        buffer.push_line("c");
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.generation(), 3);
        assert_eq!(buffer.tail(10, 0), vec!["b", "c"]);
    }

    #[test]
    fn tail_skips_from_the_newest_end() {
        let mut buffer = LogBuffer::new(10);
        for line in ["1", "2", "3", "4"] {
            buffer.push_line(line);
        }
        assert_eq!(buffer.tail(2, 0), vec!["3", "4"]);
        assert_eq!(buffer.tail(2, 1), vec!["2", "3"]);
        assert!(buffer.tail(2, 99).is_empty());
    }

    #[test]
    fn writer_splits_lines_and_flushes_fragment_on_drop() {
        let buffer = LogBuffer::shared(10);
        let make = LogMakeWriter::new(buffer.clone());
        {
            let mut writer = make.make_writer();
            writer.write_all(b"first\r\nsec").expect("write");
            writer.write_all(b"ond\ntail").expect("write");
        }
        assert_eq!(buffer.lock().tail(10, 0), vec!["first", "second", "tail"]);
    }
}
