/// Forward-only scanner over one command line.
///
/// Every method either consumes what it matched and returns it, or leaves the
/// cursor where it was and returns `None`/`false`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    pub(crate) fn skip_whitespace(&mut self) {
        self.rest = self.rest.trim_start();
    }

    /// Optional sign followed by ASCII digits, after optional leading
    /// whitespace. Values that do not fit an `i64` are not matched.
    pub(crate) fn integer(&mut self) -> Option<i64> {
        let s = self.rest.trim_start();
        let b = s.as_bytes();
        let sign_len = usize::from(matches!(b.first(), Some(b'+' | b'-')));
        let digits = b[sign_len..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count();
        if digits == 0 {
            return None;
        }
        let end = sign_len + digits;
        let value = s[..end].parse().ok()?;
        self.rest = &s[end..];
        Some(value)
    }

    /// Everything up to (not including) `stop`. Fails on an empty match or if
    /// `stop` never occurs.
    pub(crate) fn until(&mut self, stop: char) -> Option<&'a str> {
        let end = self.rest.find(stop)?;
        if end == 0 {
            return None;
        }
        let taken = &self.rest[..end];
        self.rest = &self.rest[end..];
        Some(taken)
    }

    pub(crate) fn literal(&mut self, expected: char) -> bool {
        match self.rest.strip_prefix(expected) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    /// The unconsumed remainder of the line.
    pub(crate) fn rest(&self) -> &'a str {
        self.rest
    }
}
