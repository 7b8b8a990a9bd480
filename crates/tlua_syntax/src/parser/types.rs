/// Type annotation parsing.
///
/// Grammar (loosest first):
/// - typing       := intersection { `|` intersection }
/// - intersection := postfix { `&` postfix }
/// - postfix      := primary { `[` `]` }
/// - primary      := lambda-typing | `(` `)` | `(` type-list `)` | constant | name
/// - lambda-typing:= `(` [param {, param}] [, `...` [: typing]] `)` `=>` type-tuple | name `=>` type-tuple
///
/// ## Notes
/// - `&` binds tighter than `|`, so `A | B & C` is `A | (B & C)`.
/// - A parenthesized list of two or more typings (or one ending in `...T`) is a tuple; a single parenthesized
///   typing is just that typing.
impl<'a> Parser<'a> {
    /// `: typing` after a declared name, if present.
    fn annotation(&mut self) -> ParseResult<Option<ParsedTyping>> {
        if self.eat(":")? { self.expect_typing().map(Some) } else { Ok(None) }
    }

    fn expect_typing(&mut self) -> ParseResult<ParsedTyping> {
        match self.typing()? {
            Some(typing) => Ok(typing),
            None => self.fail("Expected a typing"),
        }
    }

    fn typing(&mut self) -> ParseResult<Option<ParsedTyping>> {
        let Some(first) = self.intersection_typing()? else {
            return Ok(None);
        };
        let mut members = vec![first];
        while self.eat("|")? {
            match self.intersection_typing()? {
                Some(member) => members.push(member),
                None => return self.fail("Expected a typing"),
            }
        }
        Ok(Some(combine(members, ParsedTyping::Union)))
    }

    fn intersection_typing(&mut self) -> ParseResult<Option<ParsedTyping>> {
        let Some(first) = self.postfix_typing()? else {
            return Ok(None);
        };
        let mut members = vec![first];
        while self.eat("&")? {
            match self.postfix_typing()? {
                Some(member) => members.push(member),
                None => return self.fail("Expected a typing"),
            }
        }
        Ok(Some(combine(members, ParsedTyping::Intersection)))
    }

    fn postfix_typing(&mut self) -> ParseResult<Option<ParsedTyping>> {
        let Some(mut typing) = self.primary_typing()? else {
            return Ok(None);
        };
        loop {
            let checkpoint = self.checkpoint();
            if self.eat("[")? && self.eat("]")? {
                typing = ParsedTyping::Array(Box::new(typing));
            } else {
                self.restore(checkpoint);
                return Ok(Some(typing));
            }
        }
    }

    fn primary_typing(&mut self) -> ParseResult<Option<ParsedTyping>> {
        self.trim()?;
        if let Some(function) = self.lambda_typing()? {
            return Ok(Some(ParsedTyping::Function(function)));
        }
        if self.eat_raw("(") {
            if self.eat(")")? {
                return Ok(Some(ParsedTyping::Tuple(Vec::new())));
            }
            let mut elements = self.type_list()?;
            self.expect(")", "Expected `)`")?;
            if let [single] = elements.as_slice() {
                if !matches!(single, ParsedTyping::Vararg(_)) {
                    return Ok(elements.pop());
                }
            }
            return Ok(Some(ParsedTyping::Tuple(elements)));
        }
        if let Some(value) = self.constant()? {
            return Ok(Some(ParsedTyping::Constant(value)));
        }
        Ok(self.name()?.map(ParsedTyping::Name))
    }

    /// `typing {, typing} [, ...typing]` (at least one element).
    fn type_list(&mut self) -> ParseResult<Vec<ParsedTyping>> {
        let mut list = Vec::new();
        loop {
            if self.eat("...")? {
                list.push(ParsedTyping::Vararg(Box::new(self.expect_typing()?)));
                return Ok(list);
            }
            list.push(self.expect_typing()?);
            if !self.eat(",")? {
                return Ok(list);
            }
        }
    }

    /// Return typings: `()`, `(A, B)`, or a bare list `A, B`.
    fn type_tuple(&mut self) -> ParseResult<Vec<ParsedTyping>> {
        let mut list = self.type_list()?;
        if let [ParsedTyping::Tuple(_)] = list.as_slice() {
            if let Some(ParsedTyping::Tuple(elements)) = list.pop() {
                return Ok(elements);
            }
        }
        Ok(list)
    }

    fn lambda_typing(&mut self) -> ParseResult<Option<ParsedFunctionTyping>> {
        let checkpoint = self.checkpoint();
        match self.lambda_typing_header() {
            Ok(Some(mut function)) => {
                function.returns = self.type_tuple()?;
                Ok(Some(function))
            }
            Ok(None) | Err(_) => {
                self.restore(checkpoint);
                Ok(None)
            }
        }
    }

    fn lambda_typing_header(&mut self) -> ParseResult<Option<ParsedFunctionTyping>> {
        let mut function = ParsedFunctionTyping::default();
        if self.eat_raw("(") {
            loop {
                if self.eat("...")? {
                    function.variadic = true;
                    function.vararg = self.annotation()?.map(Box::new);
                    break;
                }
                let Some(name) = self.name()? else {
                    if function.parameters.is_empty() {
                        break;
                    }
                    return Ok(None);
                };
                // `rest...: T`
                if self.eat("...")? {
                    function.variadic = true;
                    function.vararg = self.annotation()?.map(Box::new);
                    break;
                }
                let typing = self.annotation()?;
                function.parameters.push(ParsedParameter { name, typing });
                if !self.eat(",")? {
                    break;
                }
            }
            if !self.eat(")")? {
                return Ok(None);
            }
        } else if let Some(name) = self.name()? {
            function.parameters.push(ParsedParameter { name, typing: None });
        } else {
            return Ok(None);
        }

        if !self.eat("=>")? {
            return Ok(None);
        }
        Ok(Some(function))
    }
}

/// Collapse a one-element member list, otherwise wrap it.
fn combine(mut members: Vec<ParsedTyping>, wrap: fn(Vec<ParsedTyping>) -> ParsedTyping) -> ParsedTyping {
    if members.len() == 1 {
        if let Some(single) = members.pop() {
            return single;
        }
    }
    wrap(members)
}
