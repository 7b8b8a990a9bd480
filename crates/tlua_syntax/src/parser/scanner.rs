/// Scanner-level helpers.
///
/// This chunk contains the low-level primitives used throughout parsing:
/// - Whitespace and comment skipping (`trim`), which also records comments
/// - Matching literal text, keywords, and names against the source
/// - Long-bracket detection shared by strings and comments
///
/// ## Notes
/// - Every `eat*` helper trims first and leaves the position right after the skipped whitespace when it fails,
///   so a failed match never needs to be undone.
impl<'a> Parser<'a> {
    fn rest(&self) -> &str {
        &self.source[self.pos..]
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(offset).copied()
    }

    fn peek_byte(&self) -> Option<u8> {
        self.byte_at(self.pos)
    }

    /// Skip whitespace and comments; return the offset of the next significant character.
    ///
    /// ## Errors
    /// - An unterminated long comment (`--[==[ ...`).
    fn trim(&mut self) -> ParseResult<usize> {
        loop {
            while self.peek_byte().is_some_and(|b| b.is_ascii_whitespace()) {
                self.pos += 1;
            }
            if !self.rest().starts_with("--") {
                return Ok(self.pos);
            }
            let start = self.pos;
            self.pos += 2;
            if let Some(level) = self.long_bracket_level() {
                let body = self.pos + level + 2;
                let closer = format!("]{}]", "=".repeat(level));
                let Some(length) = self.source[body..].find(&closer) else {
                    let line = self.lines.line(start);
                    return Err(self.error_at(start, format!("Unfinished long comment starting at line {line}")));
                };
                let text = self.source[body..body + length].to_string();
                self.pos = body + length + closer.len();
                self.record_comment(start, text, Some(level));
            } else {
                let end = self.rest().find('\n').map_or(self.source.len(), |i| self.pos + i);
                let text = self.source[self.pos..end].to_string();
                self.pos = end;
                self.record_comment(start, text, None);
            }
        }
    }

    fn record_comment(&mut self, index: usize, text: String, level: Option<usize>) {
        let comment = self.ast.alloc(index, ExprKind::Comment(Comment { text, level }));
        self.comment_links.push((self.last, comment));
        self.last = comment;
    }

    /// If the position is at a long-bracket opener (`[`, any number of `=`, `[`), return the number of `=`.
    fn long_bracket_level(&self) -> Option<usize> {
        let bytes = self.rest().as_bytes();
        if bytes.first() != Some(&b'[') {
            return None;
        }
        let level = bytes[1..].iter().take_while(|&&b| b == b'=').count();
        (bytes.get(level + 1) == Some(&b'[')).then_some(level)
    }

    /// Consume `text` at the current position without trimming.
    fn eat_raw(&mut self, text: &str) -> bool {
        if self.rest().starts_with(text) {
            self.pos += text.len();
            true
        } else {
            false
        }
    }

    /// Trim, then consume `text` if it comes next.
    fn eat(&mut self, text: &str) -> ParseResult<bool> {
        self.trim()?;
        Ok(self.eat_raw(text))
    }

    /// Trim, then consume a lone `=` (not the start of `==` or `=>`).
    fn eat_assign(&mut self) -> ParseResult<bool> {
        self.trim()?;
        let rest = self.rest().as_bytes();
        if rest.first() == Some(&b'=') && !matches!(rest.get(1), Some(b'=') | Some(b'>')) {
            self.pos += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, text: &str, message: impl Into<String>) -> ParseResult<()> {
        if self.eat(text)? { Ok(()) } else { self.fail(message) }
    }

    /// Length of the identifier-shaped word at the current position (0 when there is none).
    fn word_len(&self) -> usize {
        let bytes = self.rest().as_bytes();
        match bytes.first() {
            Some(b) if b.is_ascii_alphabetic() || *b == b'_' => bytes
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
                .count(),
            _ => 0,
        }
    }

    fn word(&self) -> &str {
        &self.rest()[..self.word_len()]
    }

    /// Trim, then return the keyword that comes next without consuming it.
    fn peek_keyword(&mut self) -> ParseResult<Option<KeywordId>> {
        self.trim()?;
        Ok(keywords::from_str(self.word()))
    }

    fn eat_keyword(&mut self, id: KeywordId) -> ParseResult<bool> {
        self.trim()?;
        let spelling = keywords::as_str(id);
        if self.word() == spelling {
            self.pos += spelling.len();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect_keyword(&mut self, id: KeywordId, message: impl Into<String>) -> ParseResult<()> {
        if self.eat_keyword(id)? { Ok(()) } else { self.fail(message) }
    }

    /// Trim, consume the closing keyword `id` and return its offset.
    fn close(&mut self, id: KeywordId, message: impl Into<String>) -> ParseResult<usize> {
        let index = self.trim()?;
        self.expect_keyword(id, message)?;
        Ok(index)
    }

    /// Trim, then consume a name (an identifier that is not a keyword).
    fn name(&mut self) -> ParseResult<Option<String>> {
        self.trim()?;
        let word = self.word();
        if word.is_empty() || keywords::is_keyword(word) {
            return Ok(None);
        }
        let name = word.to_string();
        self.pos += name.len();
        Ok(Some(name))
    }

    fn expect_name(&mut self) -> ParseResult<String> {
        match self.name()? {
            Some(name) => Ok(name),
            None => self.fail("Expected a name"),
        }
    }

    /// Trim, then consume a name and return it with its offset.
    fn located_name(&mut self) -> ParseResult<Option<(String, usize)>> {
        let index = self.trim()?;
        Ok(self.name()?.map(|name| (name, index)))
    }
}
