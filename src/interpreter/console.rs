use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// Where `,` reads from and `.` writes to
pub trait Console {
    /// One line without its terminator, `None` once the input is exhausted
    fn read_line(&mut self) -> io::Result<Option<String>>;

    fn write_char(&mut self, c: char) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// [`Console`] over any line reader and writer
#[derive(Debug)]
pub struct StreamConsole<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StreamConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output_mut(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl StreamConsole<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console for StreamConsole<R, W> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        // whatever was written so far may be a prompt
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    fn write_char(&mut self, c: char) -> io::Result<()> {
        let mut buf = [0; 4];
        self.output.write_all(c.encode_utf8(&mut buf).as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}
