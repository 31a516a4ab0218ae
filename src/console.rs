//! Output sinks for shell messages
//!
//! Job announcements, listings and history go to `out`; diagnostics go to
//! `err`. Child processes always write to the real descriptors 1 and 2.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

pub struct Console {
    out: Box<dyn Write>,
    err: Box<dyn Write>,
}

impl Console {
    pub fn new(out: Box<dyn Write>, err: Box<dyn Write>) -> Self {
        Console { out, err }
    }

    /// Console bound to the process's standard output and error
    pub fn stdio() -> Self {
        Console::new(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Console writing into memory, plus handles to read what was written
    pub fn captured() -> (Self, Captured) {
        let (out, out_buf) = MemWriter::with_handle();
        let (err, err_buf) = MemWriter::with_handle();
        let console = Console::new(Box::new(out), Box::new(err));
        (
            console,
            Captured {
                out: out_buf,
                err: err_buf,
            },
        )
    }

    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    pub fn err(&mut self) -> &mut dyn Write {
        &mut *self.err
    }

    /// Flush both sinks; must happen before forking so buffered text is
    /// not emitted after the child's output
    pub fn flush(&mut self) {
        let _ = self.out.flush();
        let _ = self.err.flush();
    }
}

/// Memory-backed writer shared with a reader handle
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    /// Create a writer and return it with a handle to its buffer
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let buf = Rc::new(RefCell::new(Vec::new()));
        (MemWriter { buf: Rc::clone(&buf) }, buf)
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Read side of a captured console
#[derive(Clone)]
pub struct Captured {
    out: Rc<RefCell<Vec<u8>>>,
    err: Rc<RefCell<Vec<u8>>>,
}

impl Captured {
    pub fn out_text(&self) -> String {
        String::from_utf8_lossy(&self.out.borrow()).into_owned()
    }

    pub fn err_text(&self) -> String {
        String::from_utf8_lossy(&self.err.borrow()).into_owned()
    }

    /// Forget everything captured so far
    pub fn clear(&self) {
        self.out.borrow_mut().clear();
        self.err.borrow_mut().clear();
    }
}
