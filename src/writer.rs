use std::io::Write;

use crossterm::cursor::{Hide, MoveUp, Show};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use crate::logger::Output;

/// In-memory frame that counts the lines it spans.
///
/// Everything for one redraw is queued here and handed to the output in a
/// single write, so a frame never reaches the terminal half drawn.
#[derive(Debug, Default)]
pub(crate) struct FrameWriter {
    buf: Vec<u8>,
    frame_lines: usize,
}

impl FrameWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn frame_lines(&self) -> usize {
        self.frame_lines
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// `ESC[2K` then carriage return.
    pub(crate) fn erase_line(&mut self) {
        let _ = queue!(self.buf, Clear(ClearType::CurrentLine));
        self.buf.push(b'\r');
    }

    /// `ESC[nA`. Zero is a no-op (many terminals treat `ESC[0A` as one line).
    pub(crate) fn cursor_up(&mut self, lines: usize) {
        if lines > 0 {
            let n = u16::try_from(lines).unwrap_or(u16::MAX);
            let _ = queue!(self.buf, MoveUp(n));
        }
    }

    pub(crate) fn erase_below(&mut self) {
        let _ = queue!(self.buf, Clear(ClearType::FromCursorDown));
    }

    pub(crate) fn hide_cursor(&mut self) {
        let _ = queue!(self.buf, Hide);
    }

    pub(crate) fn show_cursor(&mut self) {
        let _ = queue!(self.buf, Show);
    }
}

impl Write for FrameWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.frame_lines += buf.iter().filter(|&&b| b == b'\n').count();
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// The render loop's exclusive view of the terminal.
///
/// Remembers how many lines the previous block used so the next redraw can
/// move back over it. The cursor is restored on drop, which covers every
/// exit path including unwinding.
pub(crate) struct Terminal {
    output: Output,
    lines: usize,
    cursor_hidden: bool,
}

impl Terminal {
    pub(crate) fn new(output: Output) -> Self {
        Self {
            output,
            lines: 0,
            cursor_hidden: false,
        }
    }

    pub(crate) fn hide_cursor(&mut self) {
        let mut frame = FrameWriter::new();
        frame.hide_cursor();
        self.flush(frame);
        self.cursor_hidden = true;
    }

    /// Overwrites the current line in place. No newline is written.
    pub(crate) fn draw_line(&mut self, line: &str) {
        let mut frame = FrameWriter::new();
        frame.erase_line();
        let _ = frame.write_all(line.as_bytes());
        self.flush(frame);
    }

    pub(crate) fn erase_line(&mut self) {
        let mut frame = FrameWriter::new();
        frame.erase_line();
        self.flush(frame);
    }

    /// Redraws a block of lines over the previous block.
    ///
    /// Each line must fit in one terminal row; the row count is taken from
    /// the newlines written.
    pub(crate) fn draw_block<S: AsRef<str>>(&mut self, lines: &[S]) {
        let mut frame = FrameWriter::new();
        frame.cursor_up(self.lines);
        for line in lines {
            frame.erase_line();
            let _ = writeln!(frame, "{}", line.as_ref());
        }
        // Rows left over from a taller previous block.
        frame.erase_below();
        self.lines = frame.frame_lines();
        self.flush(frame);
    }

    /// Clears the whole previous block and leaves the cursor where it began.
    pub(crate) fn erase_block(&mut self) {
        let mut frame = FrameWriter::new();
        frame.cursor_up(self.lines);
        frame.erase_line();
        frame.erase_below();
        self.lines = 0;
        self.flush(frame);
    }

    fn flush(&mut self, frame: FrameWriter) {
        self.output.write_all(&frame.into_bytes());
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.cursor_hidden {
            let mut frame = FrameWriter::new();
            frame.show_cursor();
            self.flush(frame);
        }
    }
}
