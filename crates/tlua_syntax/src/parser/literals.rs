/// Literal values and table constructors.
///
/// ## Notes
/// - Numbers: decimal with optional fraction and exponent, a leading-dot fraction (`.5`), or `0x` hexadecimal.
/// - Quoted strings support `\a \b \f \n \r \t \v \\ \" \'`, a backslash before a newline, and decimal byte
///   escapes `\ddd` up to 255. Long strings (`[==[ ... ]==]`) need a closer with the same number of `=` and drop
///   a newline directly after the opener.
impl<'a> Parser<'a> {
    /// `nil`, `true` or `false`.
    fn keyword_constant(&mut self) -> ParseResult<Option<ConstantValue>> {
        let value = match self.peek_keyword()? {
            Some(KeywordId::Nil) => ConstantValue::Nil,
            Some(KeywordId::True) => ConstantValue::Boolean(true),
            Some(KeywordId::False) => ConstantValue::Boolean(false),
            _ => return Ok(None),
        };
        self.pos += self.word_len();
        Ok(Some(value))
    }

    /// A number or string literal at the current (trimmed) position.
    fn literal(&mut self) -> ParseResult<Option<ConstantValue>> {
        if let Some(number) = self.number()? {
            return Ok(Some(ConstantValue::Number(number)));
        }
        Ok(self.string_literal()?.map(ConstantValue::String))
    }

    /// Any literal, including `nil`, `true` and `false` (used by type annotations).
    fn constant(&mut self) -> ParseResult<Option<ConstantValue>> {
        self.trim()?;
        match self.literal()? {
            Some(value) => Ok(Some(value)),
            None => self.keyword_constant(),
        }
    }

    fn number(&mut self) -> ParseResult<Option<f64>> {
        let start = self.pos;
        let rest = self.rest();
        if rest.starts_with("0x") || rest.starts_with("0X") {
            self.pos += 2;
            let digits = self.rest()[..self.word_len_from_digits()].to_string();
            self.pos += digits.len();
            return match u64::from_str_radix(&digits, 16) {
                Ok(value) => Ok(Some(value as f64)),
                Err(_) => Err(self.error_at(start, "Malformed number")),
            };
        }

        let integral = self.digits();
        if integral == 0 && !(self.peek_byte() == Some(b'.') && self.byte_at(self.pos + 1).is_some_and(|b| b.is_ascii_digit()))
        {
            return Ok(None);
        }
        self.pos += integral;
        if self.eat_raw(".") {
            let fraction = self.digits();
            if fraction == 0 {
                return Err(self.error_at(start, "Malformed number"));
            }
            self.pos += fraction;
        }
        if matches!(self.peek_byte(), Some(b'e') | Some(b'E')) {
            self.pos += 1;
            if matches!(self.peek_byte(), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            let exponent = self.digits();
            if exponent == 0 {
                return Err(self.error_at(start, "Malformed number"));
            }
            self.pos += exponent;
        }

        match self.source[start..self.pos].parse::<f64>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => Err(self.error_at(start, "Malformed number")),
        }
    }

    fn digits(&self) -> usize {
        self.rest().bytes().take_while(u8::is_ascii_digit).count()
    }

    /// Length of the alphanumeric run at the current position (hex digits plus anything that would make them
    /// malformed).
    fn word_len_from_digits(&self) -> usize {
        self.rest()
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
            .count()
    }

    /// A quoted or long-bracket string at the current (trimmed) position.
    fn string_literal(&mut self) -> ParseResult<Option<String>> {
        match self.peek_byte() {
            Some(quote @ (b'"' | b'\'')) => self.quoted_string(quote as char).map(Some),
            Some(b'[') => match self.long_bracket_level() {
                Some(level) => self.long_string(level).map(Some),
                None => Ok(None),
            },
            _ => Ok(None),
        }
    }

    fn quoted_string(&mut self, quote: char) -> ParseResult<String> {
        let start = self.pos;
        let body = start + 1;
        let mut value = String::new();
        let mut chars = self.source[body..].char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            if c == quote {
                self.pos = body + offset + 1;
                return Ok(value);
            }
            if c != '\\' {
                value.push(c);
                continue;
            }
            let Some((escape_offset, escaped)) = chars.next() else {
                break;
            };
            match escaped {
                'a' => value.push('\x07'),
                'b' => value.push('\x08'),
                'f' => value.push('\x0c'),
                'n' | '\n' => value.push('\n'),
                'r' => value.push('\r'),
                't' => value.push('\t'),
                'v' => value.push('\x0b'),
                d if d.is_ascii_digit() => {
                    let mut code = d.to_digit(10).unwrap_or(0);
                    for _ in 0..2 {
                        match chars.peek() {
                            Some(&(_, next)) if next.is_ascii_digit() => {
                                code = code * 10 + next.to_digit(10).unwrap_or(0);
                                chars.next();
                            }
                            _ => break,
                        }
                    }
                    if code > 255 {
                        return Err(self.error_at(body + escape_offset - 1, "Escape sequence too large"));
                    }
                    // Codes above 127 become the scalar of the same number.
                    value.push(char::from(code as u8));
                }
                // `\\`, `\"`, `\'` and unknown escapes keep the escaped character.
                other => value.push(other),
            }
        }
        Err(self.error_at(start, "Unfinished string"))
    }

    fn long_string(&mut self, level: usize) -> ParseResult<String> {
        let start = self.pos;
        let mut body = start + level + 2;
        if self.byte_at(body) == Some(b'\n') {
            body += 1;
        }
        let closer = format!("]{}]", "=".repeat(level));
        let Some(length) = self.source[body..].find(&closer) else {
            return Err(self.error_at(start, "Unfinished string"));
        };
        let value = self.source[body..body + length].to_string();
        self.pos = body + length + closer.len();
        Ok(value)
    }

    /// A table constructor at the current (trimmed) position.
    fn table(&mut self) -> ParseResult<Option<ExprId>> {
        let index = self.pos;
        if !self.eat_raw("{") {
            return Ok(None);
        }
        let line = self.line();
        let mut entries = Vec::new();
        while let Some(entry) = self.table_entry()? {
            entries.push(entry);
            if self.eat(",")? || self.eat(";")? {
                continue;
            }
            self.trim()?;
            if self.peek_byte() != Some(b'}') {
                return self.fail("Expected `,` or `;`");
            }
            break;
        }
        self.expect("}", format!("Expected `}}` to close `{{` (line {line})"))?;
        Ok(Some(self.node(index, ExprKind::Table(Table { entries }))))
    }

    fn table_entry(&mut self) -> ParseResult<Option<TableEntry>> {
        let index = self.trim()?;

        if self.peek_byte() == Some(b'[') && self.long_bracket_level().is_none() {
            self.pos += 1;
            let line = self.line();
            let key = self.expect_expression()?;
            self.expect("]", format!("Expected `]` to close `[` (line {line})"))?;
            if !self.eat_assign()? {
                return self.fail("Expected `=`");
            }
            let value = self.expect_expression()?;
            return Ok(Some(TableEntry {
                key: Some(key),
                value,
                named: false,
            }));
        }

        let checkpoint = self.checkpoint();
        if let Some(name) = self.name()? {
            if self.eat_assign()? {
                let key = self.ast.alloc(index, ExprKind::Constant(ConstantValue::String(name)));
                let value = self.expect_expression()?;
                return Ok(Some(TableEntry {
                    key: Some(key),
                    value,
                    named: true,
                }));
            }
            self.restore(checkpoint);
        }

        Ok(self.expression()?.map(|value| TableEntry {
            key: None,
            value,
            named: false,
        }))
    }
}
