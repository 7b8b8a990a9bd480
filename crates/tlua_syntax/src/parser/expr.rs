/// Expression parsing.
///
/// An expression is a primary expression followed by a postfix loop (`post_expression`) that consumes indexing,
/// field access, method calls, call arguments and, finally, a binary operator with its right operand.
///
/// ## Notes
/// - Binary operators are parsed right-recursively and fixed up immediately by `rebalance`, which rotates the new
///   node below its right operand whenever that operand binds looser (or equally, for left-associative
///   operators). Unary operators go through the same rotation against their operand.
/// - Only prefix expressions (variables, fields, calls, parenthesized expressions) accept postfix syntax.
impl<'a> Parser<'a> {
    /// Parse an expression, or return `None` if nothing expression-shaped comes next.
    fn expression(&mut self) -> ParseResult<Option<ExprId>> {
        let index = self.trim()?;
        let line = self.line();
        if let Some(lambda) = self.lambda(index)? {
            return Ok(Some(lambda));
        }

        let primary = if self.eat_raw("(") {
            let inner = self.expect_expression()?;
            self.expect(")", format!("Expected `)` to close `(` (line {line})"))?;
            self.node(index, ExprKind::Brackets(inner))
        } else if self.eat_raw("...") {
            self.node(index, ExprKind::Vararg)
        } else if self.eat_keyword(KeywordId::Function)? {
            self.function_body(
                index,
                FunctionHead {
                    form: FunctionForm::Expression,
                    name: None,
                    local: false,
                    method: false,
                },
            )?
        } else if let Some(operator) = self.unary_operator() {
            let operand = self.expect_expression()?;
            let unary = self.node(index, ExprKind::UnaryOp(UnaryOp { operator, operand }));
            return Ok(Some(self.rebalance(unary)));
        } else if let Some(constant) = self.keyword_constant()? {
            self.node(index, ExprKind::Constant(constant))
        } else if let Some(table) = self.table()? {
            table
        } else if let Some(constant) = self.literal()? {
            self.node(index, ExprKind::Constant(constant))
        } else if let Some(name) = self.name()? {
            let var = self.scopes.resolve(self.scope, &name);
            self.node(
                index,
                ExprKind::Variable(Variable {
                    name,
                    var,
                    declaration: false,
                }),
            )
        } else {
            return Ok(None);
        };

        self.post_expression(primary).map(Some)
    }

    fn expect_expression(&mut self) -> ParseResult<ExprId> {
        match self.expression()? {
            Some(expr) => Ok(expr),
            None => self.fail("Expected an expression"),
        }
    }

    /// Parse `expr {, expr}`.
    fn expression_list(&mut self) -> ParseResult<Option<Vec<ExprId>>> {
        let Some(first) = self.expression()? else {
            return Ok(None);
        };
        let mut list = vec![first];
        while self.eat(",")? {
            match self.expression()? {
                Some(expr) => list.push(expr),
                None => return self.fail("Unexpected `,`"),
            }
        }
        Ok(Some(list))
    }

    fn expect_expression_list(&mut self) -> ParseResult<Vec<ExprId>> {
        match self.expression_list()? {
            Some(list) => Ok(list),
            None => self.fail("Expected an expression"),
        }
    }

    fn post_expression(&mut self, mut expr: ExprId) -> ParseResult<ExprId> {
        loop {
            let index = self.trim()?;
            if let Some(operator) = self.binary_operator() {
                let right = self.expect_expression()?;
                let binary = self.node(
                    index,
                    ExprKind::BinaryOp(BinaryOp {
                        operator,
                        left: expr,
                        right,
                    }),
                );
                return Ok(self.rebalance(binary));
            }

            let prefix = self.ast.kind(expr).is_prefix();
            if self.peek_byte() == Some(b'[') && self.long_bracket_level().is_none() {
                if !prefix {
                    return self.fail("Unexpected symbol `[`");
                }
                self.pos += 1;
                let line = self.line();
                let key = self.expect_expression()?;
                self.expect("]", format!("Expected `]` to close `[` (line {line})"))?;
                expr = self.node(
                    index,
                    ExprKind::Field(Field {
                        base: expr,
                        member: Member::Index(key),
                    }),
                );
            } else if self.eat_raw(".") {
                if !prefix {
                    return self.fail("Unexpected symbol `.`");
                }
                let name = self.expect_name()?;
                expr = self.node(
                    index,
                    ExprKind::Field(Field {
                        base: expr,
                        member: Member::Name(name),
                    }),
                );
            } else if self.eat_raw(":") {
                if !prefix {
                    return self.fail("Unexpected symbol `:`");
                }
                let name = self.expect_name()?;
                let Some(arguments) = self.arguments()? else {
                    return self.fail("Expected function arguments");
                };
                expr = self.node(
                    index,
                    ExprKind::FunctionSelfCall(FunctionSelfCall {
                        base: expr,
                        name,
                        arguments,
                    }),
                );
            } else if let Some(arguments) = self.arguments()? {
                if !prefix {
                    return Err(self.error_at(index, "Unexpected symbol"));
                }
                expr = self.node(
                    index,
                    ExprKind::FunctionCall(FunctionCall {
                        target: expr,
                        arguments,
                    }),
                );
            } else {
                return Ok(expr);
            }
        }
    }

    /// Call arguments: a string literal, a table constructor, or a parenthesized expression list.
    fn arguments(&mut self) -> ParseResult<Option<Vec<ExprId>>> {
        let index = self.trim()?;
        if let Some(string) = self.string_literal()? {
            return Ok(Some(vec![self.node(index, ExprKind::Constant(ConstantValue::String(string)))]));
        }
        if let Some(table) = self.table()? {
            return Ok(Some(vec![table]));
        }
        if !self.eat_raw("(") {
            return Ok(None);
        }
        let line = self.line();
        let arguments = self.expression_list()?.unwrap_or_default();
        self.expect(")", format!("Expected `)` to close `(` (line {line})"))?;
        Ok(Some(arguments))
    }

    /// Match a binary operator at the current (already trimmed) position.
    fn binary_operator(&mut self) -> Option<OperatorId> {
        self.operator(Fixity::Infix)
    }

    fn unary_operator(&mut self) -> Option<OperatorId> {
        self.operator(Fixity::Prefix)
    }

    fn operator(&mut self, fixity: Fixity) -> Option<OperatorId> {
        let word = self.word();
        let info = operators::by_longest_spelling(fixity).find(|info| {
            if info.is_keyword_spelling {
                word == info.spelling
            } else {
                self.rest().starts_with(info.spelling)
            }
        })?;
        self.pos += info.spelling.len();
        Some(info.id)
    }

    /// Restore operator priorities after a right-recursive parse.
    ///
    /// `a * b + c` is first built as `a * (b + c)`; since `+` binds looser than `*`, the outer node is rotated
    /// down: `(a * b) + c`. The rotated-down node is rebalanced again so long chains associate correctly.
    fn rebalance(&mut self, id: ExprId) -> ExprId {
        let (outer, right) = match self.ast.kind(id) {
            ExprKind::BinaryOp(op) => (op.operator, op.right),
            ExprKind::UnaryOp(op) => (op.operator, op.operand),
            _ => return id,
        };
        let (inner, inner_left) = match self.ast.kind(right) {
            ExprKind::BinaryOp(op) => (op.operator, op.left),
            _ => return id,
        };
        if !operators::should_rotate(outer, inner) {
            return id;
        }

        match &mut self.ast[id].kind {
            ExprKind::BinaryOp(op) => op.right = inner_left,
            ExprKind::UnaryOp(op) => op.operand = inner_left,
            _ => return id,
        }
        let lowered = self.rebalance(id);
        if let ExprKind::BinaryOp(op) = &mut self.ast[right].kind {
            op.left = lowered;
        }
        right
    }
}
