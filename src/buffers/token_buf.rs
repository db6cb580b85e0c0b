/// Growable text buffer with delimiter-based tokenization.
///
/// Splitting honors a configurable "protector" escape character: a protected
/// delimiter is taken literally and the protector itself is dropped. A
/// protector in front of anything else stays in place, so single backslashes
/// survive in tokens; a doubled protector collapses to one.
pub struct TokenBuf {
    data: String,
    delimiters: String,
    protector: Option<char>,
    cursor: usize,
    token_start: usize,
}

impl TokenBuf {
    pub fn new() -> Self {
        Self {
            data: String::new(),
            // Default splits on whitespace, newlines and left-over MSDOS
            // carriage returns, which callers rarely want to see.
            delimiters: " \t\r\n".to_string(),
            protector: None,
            cursor: 0,
            token_start: 0,
        }
    }

    pub fn from_text(text: &str) -> Self {
        let mut buf = Self::new();
        buf.data.push_str(text);
        buf
    }

    /// Reset the contents to empty without touching the configuration.
    pub fn clear(&mut self) {
        self.data.clear();
        self.cursor = 0;
        self.token_start = 0;
    }

    pub fn append_str(&mut self, text: &str) {
        self.data.push_str(text);
    }

    pub fn append_char(&mut self, c: char) {
        self.data.push(c);
    }

    /// An empty delimiter set disables splitting entirely, so the remainder
    /// of the buffer becomes a single token.
    pub fn set_delimiters(&mut self, delimiters: &str) {
        self.delimiters = delimiters.to_string();
    }

    pub fn set_protector(&mut self, protector: Option<char>) {
        self.protector = protector;
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn text(&self) -> &str {
        &self.data
    }

    /// Raw remainder of the buffer starting at the most recent token,
    /// delimiters and escapes untouched. Used for sentence arguments.
    pub fn rest(&self) -> &str {
        &self.data[self.token_start..]
    }

    /// Mark the whole remainder as consumed.
    pub fn consume_rest(&mut self) {
        self.cursor = self.data.len();
        self.token_start = self.cursor;
    }

    pub fn first_token(&mut self) -> Option<String> {
        self.cursor = 0;
        self.next_token()
    }

    /// Next token, skipping any run of delimiters first. Never yields empty
    /// tokens; returns None when the buffer is exhausted.
    pub fn next_token(&mut self) -> Option<String> {
        self.skip_delimiters();
        if self.cursor >= self.data.len() {
            self.token_start = self.cursor;
            return None;
        }
        self.token_start = self.cursor;
        Some(self.take_token())
    }

    pub fn first_single_token(&mut self) -> Option<String> {
        self.cursor = 0;
        self.next_single_token()
    }

    /// Like `next_token`, but adjacent delimiters yield empty tokens. Needed
    /// when empty lines must be counted, as in script parsing.
    pub fn next_single_token(&mut self) -> Option<String> {
        if self.cursor >= self.data.len() {
            self.token_start = self.cursor;
            return None;
        }
        self.token_start = self.cursor;
        Some(self.take_token())
    }

    pub fn count_tokens(&mut self) -> usize {
        self.cursor = 0;
        let mut count = 0;
        while self.next_token().is_some() {
            count += 1;
        }
        count
    }

    fn is_delimiter(&self, c: char) -> bool {
        self.delimiters.contains(c)
    }

    fn skip_delimiters(&mut self) {
        while let Some(c) = self.data[self.cursor..].chars().next() {
            if !self.is_delimiter(c) {
                break;
            }
            self.cursor += c.len_utf8();
        }
    }

    /// Transfer characters up to the next unprotected delimiter, consuming
    /// that delimiter.
    fn take_token(&mut self) -> String {
        let mut out = String::new();
        let mut escape = false;
        while let Some(c) = self.data[self.cursor..].chars().next() {
            if !escape && self.is_delimiter(c) {
                self.cursor += c.len_utf8();
                break;
            }
            if let Some(p) = self.protector {
                if c == p {
                    self.cursor += c.len_utf8();
                    if escape {
                        // Doubled protector: emit it once.
                        escape = false;
                        out.push(c);
                    } else {
                        escape = true;
                    }
                    continue;
                }
                if escape {
                    // Only delimiters are protected; keep the protector in
                    // front of anything else.
                    if !self.is_delimiter(c) {
                        out.push(p);
                    }
                    escape = false;
                }
            }
            out.push(c);
            self.cursor += c.len_utf8();
        }
        out
    }
}

impl Default for TokenBuf {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        let mut buf = TokenBuf::from_text("alpha  beta\tgamma");
        assert_eq!(buf.first_token().as_deref(), Some("alpha"));
        assert_eq!(buf.next_token().as_deref(), Some("beta"));
        assert_eq!(buf.next_token().as_deref(), Some("gamma"));
        assert_eq!(buf.next_token(), None);
    }

    #[test]
    fn protected_delimiter_is_literal() {
        let mut buf = TokenBuf::from_text(r"one\ token two");
        buf.set_protector(Some('\\'));
        assert_eq!(buf.first_token().as_deref(), Some("one token"));
        assert_eq!(buf.next_token().as_deref(), Some("two"));
    }

    #[test]
    fn single_backslash_survives() {
        let mut buf = TokenBuf::from_text(r"a\b c\\d");
        buf.set_protector(Some('\\'));
        assert_eq!(buf.first_token().as_deref(), Some(r"a\b"));
        assert_eq!(buf.next_token().as_deref(), Some(r"c\d"));
    }

    #[test]
    fn single_tokens_count_empty_lines() {
        let mut buf = TokenBuf::from_text("first\n\nthird\n");
        buf.set_delimiters("\n");
        assert_eq!(buf.first_single_token().as_deref(), Some("first"));
        assert_eq!(buf.next_single_token().as_deref(), Some(""));
        assert_eq!(buf.next_single_token().as_deref(), Some("third"));
        assert_eq!(buf.next_single_token(), None);
    }

    #[test]
    fn empty_delimiters_disable_splitting() {
        let mut buf = TokenBuf::from_text("all of this is one token");
        buf.set_delimiters("");
        assert_eq!(
            buf.first_token().as_deref(),
            Some("all of this is one token")
        );
        assert_eq!(buf.next_token(), None);
    }

    #[test]
    fn rest_is_verbatim_from_token_start() {
        let mut buf = TokenBuf::from_text("head tail with  spacing");
        assert_eq!(buf.first_token().as_deref(), Some("head"));
        assert_eq!(buf.next_token().as_deref(), Some("tail"));
        assert_eq!(buf.rest(), "tail with  spacing");
    }

    #[test]
    fn empty_input_has_no_tokens() {
        let mut buf = TokenBuf::new();
        assert_eq!(buf.first_token(), None);
        buf.append_str("  \t ");
        assert_eq!(buf.first_token(), None);
    }
}
