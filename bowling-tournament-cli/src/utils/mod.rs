use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Prompt<'a> {
    msg: &'a str,
}

impl<'a> Prompt<'a> {
    #[inline]
    pub fn new(msg: &'a str) -> Self {
        Self { msg }
    }

    /// Reads a single line and parses it into `T`. The outer error is returned if stdin is
    /// closed or unreadable.
    pub fn read<T>(&self) -> io::Result<Result<T, T::Err>>
    where
        T: FromStr,
    {
        let mut writer = io::stdout();
        writer.write_all(self.msg.as_bytes())?;
        writer.write_all(b": ")?;
        writer.flush()?;

        let line = read_line(io::stdin().lock())?;
        Ok(T::from_str(&line))
    }

    /// Read until a valid element is input.
    pub fn read_valid<T>(&self) -> io::Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        loop {
            match self.read()? {
                Ok(val) => return Ok(val),
                Err(err) => println!("Failed to parse input: {}", err),
            }
        }
    }
}

fn read_line<R>(mut reader: R) -> io::Result<String>
where
    R: BufRead,
{
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }

    let len = line.trim_end_matches(&['\r', '\n'][..]).len();
    line.truncate(len);
    Ok(line)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, ErrorKind};

    use super::read_line;

    #[test]
    fn test_read_line() {
        assert_eq!(read_line(Cursor::new("Spring Open\r\n")).unwrap(), "Spring Open");
        assert_eq!(read_line(Cursor::new("2026-10-16")).unwrap(), "2026-10-16");
        assert_eq!(read_line(Cursor::new("\n")).unwrap(), "");
        assert_eq!(
            read_line(Cursor::new("")).unwrap_err().kind(),
            ErrorKind::UnexpectedEof
        );
    }
}
