//! String tokenization: strtok (stateful) and strtok_r (reentrant).
//!
//! Corresponds to `strtok` and `strtok_r` from `<string.h>`.
//!
//! In this safe Rust model, tokenizing replaces the delimiter byte that ends
//! each token with NUL and returns token boundaries as [`Token`] values. The
//! position C keeps in a hidden static (or in `strtok_r`'s `saveptr`) is an
//! explicit [`TokenCursor`] owned by the caller, so independent tokenizations
//! never share state.

use std::ops::Range;

use super::str::ByteSet;

/// Where the next tokenizing call resumes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCursor {
    /// No string is being tokenized; continuation calls yield nothing.
    #[default]
    Idle,
    /// Scanning resumes at byte offset `pos` of the anchored buffer.
    Scanning { pos: usize },
}

impl TokenCursor {
    /// Cursor positioned at the start of a newly supplied string.
    #[must_use]
    pub const fn anchored() -> Self {
        Self::Scanning { pos: 0 }
    }

    #[must_use]
    pub const fn is_scanning(self) -> bool {
        matches!(self, Self::Scanning { .. })
    }
}

/// A token found inside the tokenized buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    /// Offset of the first token byte.
    pub start: usize,
    /// Token length, excluding the NUL written after it.
    pub len: usize,
}

impl Token {
    #[must_use]
    pub const fn end(self) -> usize {
        self.start + self.len
    }

    #[must_use]
    pub const fn range(self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Reentrant string tokenizer.
///
/// POSIX `strtok_r`. `cursor` plays the part of `saveptr`: start a new string
/// with [`TokenCursor::anchored`] and pass the same cursor back to continue.
///
/// Leading delimiters are skipped. The token extends to the next delimiter
/// or the end of the string; a delimiter that ends a token is overwritten with
/// NUL and scanning resumes just past it. The delimiter set is the bytes of
/// `delimiters` before its first NUL; an empty set makes the whole remaining
/// string one token.
///
/// Returns `None` once the string is exhausted, leaving the cursor idle.
pub fn strtok_r(s: &mut [u8], delimiters: &[u8], cursor: &mut TokenCursor) -> Option<Token> {
    let TokenCursor::Scanning { pos } = *cursor else {
        return None;
    };
    let delims = ByteSet::from_terminated(delimiters);
    let len = s.len();
    let mut pos = pos;

    // Skip leading delimiters
    while pos < len && s[pos] != 0 && delims.contains(s[pos]) {
        pos += 1;
    }

    if pos >= len || s[pos] == 0 {
        *cursor = TokenCursor::Idle;
        return None;
    }

    let start = pos;
    while pos < len && s[pos] != 0 && !delims.contains(s[pos]) {
        pos += 1;
    }
    let token = Token {
        start,
        len: pos - start,
    };

    if pos < len && s[pos] != 0 {
        s[pos] = 0;
        *cursor = TokenCursor::Scanning { pos: pos + 1 };
    } else {
        *cursor = TokenCursor::Idle;
    }
    Some(token)
}

/// Stateful tokenizer with C `strtok` calling conventions.
///
/// Passing `Some(buffer)` anchors a new string and returns its first token;
/// passing `None` continues the string anchored last. Each `Tokenizer` owns
/// its own state, so there is no hidden process-wide static.
#[derive(Debug, Default)]
pub struct Tokenizer<'a> {
    buf: Option<&'a mut [u8]>,
    cursor: TokenCursor,
}

impl<'a> Tokenizer<'a> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: None,
            cursor: TokenCursor::Idle,
        }
    }

    /// Equivalent to C `strtok`.
    ///
    /// A `None` continuation with nothing anchored yields `None`.
    pub fn strtok(&mut self, s: Option<&'a mut [u8]>, delimiters: &[u8]) -> Option<Token> {
        if let Some(buf) = s {
            self.buf = Some(buf);
            self.cursor = TokenCursor::anchored();
        }
        let Self { buf, cursor } = self;
        let buf = buf.as_deref_mut()?;
        strtok_r(buf, delimiters, cursor)
    }

    #[must_use]
    pub const fn cursor(&self) -> TokenCursor {
        self.cursor
    }

    /// The anchored buffer, including the NULs written so far.
    #[must_use]
    pub fn buffer(&self) -> Option<&[u8]> {
        self.buf.as_deref()
    }

    /// Bytes of `token` within the anchored buffer.
    #[must_use]
    pub fn token_bytes(&self, token: Token) -> &[u8] {
        self.buf
            .as_deref()
            .and_then(|buf| buf.get(token.range()))
            .unwrap_or_default()
    }

    /// Gives the anchored buffer back, ending the tokenization.
    pub fn release(self) -> Option<&'a mut [u8]> {
        self.buf
    }
}

/// Tokenizes `s` to completion, yielding each token's bytes.
///
/// Iterating has the same effect on `s` as repeated [`strtok_r`] calls; tokens
/// already yielded are split off and stay readable.
pub fn tokens<'a>(s: &'a mut [u8], delimiters: &'a [u8]) -> Tokens<'a> {
    Tokens {
        rest: s,
        delimiters,
    }
}

/// Iterator returned by [`tokens`].
#[derive(Debug)]
pub struct Tokens<'a> {
    rest: &'a mut [u8],
    delimiters: &'a [u8],
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let rest = std::mem::take(&mut self.rest);
        let mut cursor = TokenCursor::anchored();
        let token = strtok_r(rest, self.delimiters, &mut cursor)?;
        let split = match cursor {
            TokenCursor::Scanning { pos } => pos,
            TokenCursor::Idle => rest.len(),
        };
        let (head, tail) = rest.split_at_mut(split);
        self.rest = tail;
        let head: &'a [u8] = head;
        Some(&head[token.range()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(input: &[u8], delims: &[u8]) -> Vec<Vec<u8>> {
        let mut buf = input.to_vec();
        buf.push(0);
        tokens(&mut buf, delims).map(<[u8]>::to_vec).collect()
    }

    #[test]
    fn test_strtok_r_basic() {
        let mut buf = *b"hello world foo\0";
        let delim = b" \0";
        let mut cursor = TokenCursor::anchored();

        let token = strtok_r(&mut buf, delim, &mut cursor).unwrap();
        assert_eq!(&buf[token.range()], b"hello");

        let token = strtok_r(&mut buf, delim, &mut cursor).unwrap();
        assert_eq!(&buf[token.range()], b"world");

        let token = strtok_r(&mut buf, delim, &mut cursor).unwrap();
        assert_eq!(&buf[token.range()], b"foo");

        assert!(strtok_r(&mut buf, delim, &mut cursor).is_none());
        assert_eq!(cursor, TokenCursor::Idle);
        assert_eq!(&buf, b"hello\0world\0foo\0");
    }

    #[test]
    fn test_strtok_r_multiple_delims() {
        let mut buf = *b"a,,b,c\0";
        let delim = b",\0";
        let mut cursor = TokenCursor::anchored();

        let token = strtok_r(&mut buf, delim, &mut cursor).unwrap();
        assert_eq!(token, Token { start: 0, len: 1 });
        assert_eq!(cursor, TokenCursor::Scanning { pos: 2 });

        let token = strtok_r(&mut buf, delim, &mut cursor).unwrap();
        assert_eq!(&buf[token.range()], b"b");

        let token = strtok_r(&mut buf, delim, &mut cursor).unwrap();
        assert_eq!(&buf[token.range()], b"c");

        assert!(strtok_r(&mut buf, delim, &mut cursor).is_none());
        // Only the delimiter right after each token is overwritten.
        assert_eq!(&buf, b"a\0,b\0c\0");
    }

    #[test]
    fn test_strtok_r_leading_delims() {
        let mut buf = *b"  hello\0";
        let mut cursor = TokenCursor::anchored();
        let token = strtok_r(&mut buf, b" \0", &mut cursor).unwrap();
        assert_eq!(token, Token { start: 2, len: 5 });
        assert_eq!(cursor, TokenCursor::Idle);
    }

    #[test]
    fn test_strtok_r_empty() {
        let mut buf = *b"\0";
        let mut cursor = TokenCursor::anchored();
        assert!(strtok_r(&mut buf, b" \0", &mut cursor).is_none());
        assert!(!cursor.is_scanning());
    }

    #[test]
    fn test_strtok_r_all_delims() {
        let mut buf = *b"   \0";
        let mut cursor = TokenCursor::anchored();
        assert!(strtok_r(&mut buf, b" \0", &mut cursor).is_none());
        assert_eq!(&buf, b"   \0");
    }

    #[test]
    fn test_strtok_r_idle_cursor_yields_nothing() {
        let mut buf = *b"abc\0";
        let mut cursor = TokenCursor::Idle;
        assert!(strtok_r(&mut buf, b",\0", &mut cursor).is_none());
    }

    #[test]
    fn test_strtok_r_unterminated_slice_ends_at_slice_end() {
        let mut buf = *b"ab,cd";
        let mut cursor = TokenCursor::anchored();
        strtok_r(&mut buf, b",\0", &mut cursor).unwrap();
        let token = strtok_r(&mut buf, b",\0", &mut cursor).unwrap();
        assert_eq!(&buf[token.range()], b"cd");
        assert!(strtok_r(&mut buf, b",\0", &mut cursor).is_none());
    }

    #[test]
    fn test_independent_cursors_interleave() {
        let mut first = *b"a b c\0";
        let mut second = *b"x,y\0";
        let mut c1 = TokenCursor::anchored();
        let mut c2 = TokenCursor::anchored();

        let t = strtok_r(&mut first, b" \0", &mut c1).unwrap();
        assert_eq!(&first[t.range()], b"a");
        let t = strtok_r(&mut second, b",\0", &mut c2).unwrap();
        assert_eq!(&second[t.range()], b"x");
        let t = strtok_r(&mut first, b" \0", &mut c1).unwrap();
        assert_eq!(&first[t.range()], b"b");
        let t = strtok_r(&mut second, b",\0", &mut c2).unwrap();
        assert_eq!(&second[t.range()], b"y");
        let t = strtok_r(&mut first, b" \0", &mut c1).unwrap();
        assert_eq!(&first[t.range()], b"c");
    }

    #[test]
    fn test_strtok_basic() {
        let mut buf = *b"a-b-c\0";
        let mut tok = Tokenizer::new();

        let token = tok.strtok(Some(&mut buf), b"-\0").unwrap();
        assert_eq!(tok.token_bytes(token), b"a");
        let token = tok.strtok(None, b"-\0").unwrap();
        assert_eq!(tok.token_bytes(token), b"b");
        let token = tok.strtok(None, b"-\0").unwrap();
        assert_eq!(tok.token_bytes(token), b"c");
        assert!(tok.strtok(None, b"-\0").is_none());
        assert!(tok.strtok(None, b"-\0").is_none());
        assert_eq!(tok.release().unwrap(), b"a\0b\0c\0");
    }

    #[test]
    fn test_strtok_continuation_without_anchor() {
        let mut tok = Tokenizer::new();
        assert!(tok.strtok(None, b",\0").is_none());
        assert_eq!(tok.cursor(), TokenCursor::Idle);
        assert!(tok.buffer().is_none());
    }

    #[test]
    fn test_strtok_delimiters_may_change_between_calls() {
        let mut buf = *b"a,b;c\0";
        let mut tok = Tokenizer::new();
        let t = tok.strtok(Some(&mut buf), b",\0").unwrap();
        assert_eq!(tok.token_bytes(t), b"a");
        let t = tok.strtok(None, b";\0").unwrap();
        assert_eq!(tok.token_bytes(t), b"b");
        let t = tok.strtok(None, b";\0").unwrap();
        assert_eq!(tok.token_bytes(t), b"c");
    }

    #[test]
    fn test_strtok_reanchor_discards_previous_string() {
        let mut first = *b"a,b\0";
        let mut second = *b"z\0";
        let mut tok = Tokenizer::new();
        tok.strtok(Some(&mut first), b",\0").unwrap();
        let t = tok.strtok(Some(&mut second), b",\0").unwrap();
        assert_eq!(tok.token_bytes(t), b"z");
        assert!(tok.strtok(None, b",\0").is_none());
    }

    #[test]
    fn test_tokens_iterator_basic_sequences() {
        assert_eq!(collect(b"a,,b,,c", b",\0"), vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
        assert_eq!(collect(b" a b\tc\n", b" \t\n\0"), vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
        assert_eq!(collect(b"123abc456", b"abc\0"), vec![b"123".to_vec(), b"456".to_vec()]);
        assert_eq!(collect(b"aaabaaa", b"aaa\0"), vec![b"b".to_vec()]);
    }

    #[test]
    fn test_tokens_iterator_no_tokens() {
        assert!(collect(b"", b",\0").is_empty());
        assert!(collect(b",,,,", b",\0").is_empty());
        assert!(collect(b"abcabcabc", b"abc\0").is_empty());
    }

    #[test]
    fn test_empty_delimiter_set_yields_whole_string() {
        assert_eq!(collect(b"abc", b"\0"), vec![b"abc".to_vec()]);
        assert_eq!(collect(b"a,b", b""), vec![b"a,b".to_vec()]);
    }
}
