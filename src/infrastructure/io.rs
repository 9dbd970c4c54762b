//! Standard stream routing: real terminal or headless capture

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

type Buffer = Arc<Mutex<Vec<u8>>>;

/// Buffers collecting stdout/stderr in headless mode.
#[derive(Debug, Clone, Default)]
pub struct Capture {
    stdout: Buffer,
    stderr: Buffer,
}

/// Where the runtime, its logger and the scripts write their output.
#[derive(Debug, Clone)]
pub enum Io {
    /// Inherit the process's stdin/stdout/stderr
    Terminal,
    /// Capture everything for tests and embedding callers
    Headless(Capture),
}

impl Io {
    pub fn terminal() -> Self {
        Io::Terminal
    }

    pub fn headless() -> Self {
        Io::Headless(Capture::default())
    }

    pub fn is_headless(&self) -> bool {
        matches!(self, Io::Headless(_))
    }

    pub fn stdout(&self) -> StreamWriter {
        match self {
            Io::Terminal => StreamWriter::Stdout(io::stdout()),
            Io::Headless(c) => StreamWriter::Buffer(Arc::clone(&c.stdout)),
        }
    }

    pub fn stderr(&self) -> StreamWriter {
        match self {
            Io::Terminal => StreamWriter::Stderr(io::stderr()),
            Io::Headless(c) => StreamWriter::Buffer(Arc::clone(&c.stderr)),
        }
    }

    /// Everything written to stdout so far (headless only).
    pub fn captured_stdout(&self) -> Option<String> {
        match self {
            Io::Terminal => None,
            Io::Headless(c) => Some(read_buffer(&c.stdout)),
        }
    }

    /// Everything written to stderr so far (headless only).
    pub fn captured_stderr(&self) -> Option<String> {
        match self {
            Io::Terminal => None,
            Io::Headless(c) => Some(read_buffer(&c.stderr)),
        }
    }
}

fn read_buffer(buffer: &Buffer) -> String {
    let bytes = buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Writer handed out by [`Io`].
pub enum StreamWriter {
    Stdout(io::Stdout),
    Stderr(io::Stderr),
    Buffer(Buffer),
}

impl Write for StreamWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            StreamWriter::Stdout(w) => w.write(buf),
            StreamWriter::Stderr(w) => w.write(buf),
            StreamWriter::Buffer(b) => {
                let mut bytes = b
                    .lock()
                    .map_err(|_| io::Error::other("capture buffer poisoned"))?;
                bytes.extend_from_slice(buf);
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            StreamWriter::Stdout(w) => w.flush(),
            StreamWriter::Stderr(w) => w.flush(),
            StreamWriter::Buffer(_) => Ok(()),
        }
    }
}

/// Log output goes to stderr.
impl<'a> MakeWriter<'a> for Io {
    type Writer = StreamWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.stderr()
    }
}
