//! Line-by-line record iteration over captured command output.

use std::iter::FusedIterator;
use std::str::SplitInclusive;

use crate::ParseError;

/// Lazily parses one record per line of `buffer`.
///
/// Each line is handed to the parser with its terminator still attached.
/// The first line the parser rejects is yielded as `Err` and ends the
/// iteration; later lines are never looked at.
pub struct LineIterator<'a, P> {
    lines: SplitInclusive<'a, char>,
    parser: P,
    done: bool,
}

impl<'a, R, P> LineIterator<'a, P>
where
    P: FnMut(&str) -> Result<R, ParseError>,
{
    pub fn new(buffer: &'a str, parser: P) -> Self {
        Self {
            lines: buffer.split_inclusive('\n'),
            parser,
            done: false,
        }
    }
}

impl<R, P> Iterator for LineIterator<'_, P>
where
    P: FnMut(&str) -> Result<R, ParseError>,
{
    type Item = Result<R, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let Some(line) = self.lines.next() else {
            self.done = true;
            return None;
        };
        match (self.parser)(line) {
            Ok(record) => Some(Ok(record)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R, P> FusedIterator for LineIterator<'_, P> where P: FnMut(&str) -> Result<R, ParseError> {}

/// Drop a report's preamble.
///
/// Leading blank lines go first, then `header_lines` lines, then any blank
/// lines separating the header from the data.
pub fn skip_preamble(output: &str, header_lines: usize) -> &str {
    let mut rest = output;
    rest = skip_blank_lines(rest);
    for _ in 0..header_lines {
        rest = match rest.split_once('\n') {
            Some((_, tail)) => tail,
            None => "",
        };
    }
    skip_blank_lines(rest)
}

fn skip_blank_lines(mut s: &str) -> &str {
    while let Some((line, tail)) = s.split_once('\n') {
        if !line.trim().is_empty() {
            break;
        }
        s = tail;
    }
    s
}
