/// Blocks and statements.
///
/// This chunk parses statement sequences (`block_in`) and every statement form: keyword-led statements, function
/// declarations, `local` declarations, call statements and assignments.
///
/// ## Notes
/// - Declarations create their variables *after* the initializer is parsed, so `local x = x` reads the outer `x`.
/// - `local function f` declares `f` before its body so the body can call itself.
/// - Loop variables live in the loop body's scope.
impl<'a> Parser<'a> {
    /// Parse a block in `scope`: statements, then an optional `break` or `return`.
    fn block_in(&mut self, scope: ScopeId) -> ParseResult<Block> {
        self.in_scope(scope, |p| p.statements())
    }

    /// Parse a block in a fresh child scope.
    fn block(&mut self) -> ParseResult<Block> {
        let scope = self.open_scope();
        self.block_in(scope)
    }

    fn statements(&mut self) -> ParseResult<Block> {
        let mut block = Vec::new();
        loop {
            if self.eat(";")? {
                continue;
            }
            match self.statement()? {
                Some(statement) => block.push(statement),
                None => break,
            }
        }

        let index = self.trim()?;
        if self.eat_keyword(KeywordId::Break)? {
            block.push(self.node(index, ExprKind::Break));
            self.eat(";")?;
        } else if self.eat_keyword(KeywordId::Return)? {
            let expressions = self.expression_list()?.unwrap_or_default();
            block.push(self.node(index, ExprKind::Return(Return { expressions })));
            self.eat(";")?;
        }
        Ok(block)
    }

    /// Parse one statement, or return `None` when nothing statement-shaped comes next.
    fn statement(&mut self) -> ParseResult<Option<ExprId>> {
        let index = self.trim()?;
        let line = self.line();
        let Some(keyword) = self.peek_keyword()? else {
            return self.expression_statement(index);
        };
        if !keywords::info_for(keyword).starts_statement {
            return Ok(None);
        }
        self.pos += keywords::as_str(keyword).len();

        let statement = match keyword {
            KeywordId::Do => {
                let block = self.block()?;
                let end_index = self.close(KeywordId::End, format!("Expected `end` to close `do` (line {line})"))?;
                self.node(index, ExprKind::Do(Do { block, end_index }))
            }
            KeywordId::While => {
                let condition = self.expect_expression()?;
                self.expect_keyword(KeywordId::Do, "Expected `do`")?;
                let block = self.block()?;
                let end_index = self.close(KeywordId::End, format!("Expected `end` to close `while` (line {line})"))?;
                self.node(
                    index,
                    ExprKind::While(While {
                        condition,
                        block,
                        end_index,
                    }),
                )
            }
            KeywordId::Repeat => {
                // The condition sees the body's locals.
                let scope = self.open_scope();
                let block = self.block_in(scope)?;
                let until_index =
                    self.close(KeywordId::Until, format!("Expected `until` to close `repeat` (line {line})"))?;
                let condition = self.in_scope(scope, |p| p.expect_expression())?;
                self.node(
                    index,
                    ExprKind::Repeat(Repeat {
                        block,
                        condition,
                        until_index,
                    }),
                )
            }
            KeywordId::If => self.if_statement(index, line)?,
            KeywordId::For => self.for_statement(index, line)?,
            KeywordId::Function => {
                let name = self.function_name()?;
                let method = matches!(self.ast.kind(name), ExprKind::Method(_));
                self.function_body(
                    index,
                    FunctionHead {
                        form: FunctionForm::Declaration,
                        name: Some(name),
                        local: false,
                        method,
                    },
                )?
            }
            KeywordId::Local => self.local_statement(index)?,
            _ => return Ok(None),
        };
        Ok(Some(statement))
    }

    fn if_statement(&mut self, index: usize, line: usize) -> ParseResult<ExprId> {
        let condition = self.expect_expression()?;
        self.expect_keyword(KeywordId::Then, "Expected `then`")?;
        let block = self.block()?;
        let mut branches = vec![IfBranch {
            condition,
            block,
            index,
        }];

        loop {
            let branch_index = self.trim()?;
            if !self.eat_keyword(KeywordId::Elseif)? {
                break;
            }
            let condition = self.expect_expression()?;
            self.expect_keyword(KeywordId::Then, "Expected `then`")?;
            let block = self.block()?;
            branches.push(IfBranch {
                condition,
                block,
                index: branch_index,
            });
        }

        let else_index = self.trim()?;
        let (otherwise, else_index) = if self.eat_keyword(KeywordId::Else)? {
            (Some(self.block()?), Some(else_index))
        } else {
            (None, None)
        };
        let closing = if branches.len() == 1 { "if" } else { "elseif" };
        let end_index = self.close(KeywordId::End, format!("Expected `end` to close `{closing}` (line {line})"))?;
        Ok(self.node(
            index,
            ExprKind::If(If {
                branches,
                otherwise,
                else_index,
                end_index,
            }),
        ))
    }

    fn for_statement(&mut self, index: usize, line: usize) -> ParseResult<ExprId> {
        let names = self.name_list()?;
        if names.is_empty() {
            return self.fail("Expected a name");
        }
        let end_message = format!("Expected `end` to close `for` (line {line})");

        if names.len() == 1 && self.eat_assign()? {
            let start = self.expect_expression()?;
            self.expect(",", "Expected a `,`")?;
            let limit = self.expect_expression()?;
            let step = if self.eat(",")? { Some(self.expect_expression()?) } else { None };
            self.expect_keyword(KeywordId::Do, "Expected `do`")?;
            let scope = self.open_scope();
            let mut variables = self.declare_loop_variables(scope, names);
            let variable = variables.remove(0);
            let block = self.block_in(scope)?;
            let end_index = self.close(KeywordId::End, end_message)?;
            return Ok(self.node(
                index,
                ExprKind::NumericFor(NumericFor {
                    variable,
                    start,
                    limit,
                    step,
                    block,
                    end_index,
                }),
            ));
        }

        self.expect_keyword(KeywordId::In, "Expected `in`")?;
        let expressions = self.expect_expression_list()?;
        self.expect_keyword(KeywordId::Do, "Expected `do`")?;
        let scope = self.open_scope();
        let variables = self.declare_loop_variables(scope, names);
        let block = self.block_in(scope)?;
        let end_index = self.close(KeywordId::End, end_message)?;
        Ok(self.node(
            index,
            ExprKind::GenericFor(GenericFor {
                variables,
                expressions,
                block,
                end_index,
            }),
        ))
    }

    fn declare_loop_variables(&mut self, scope: ScopeId, names: Vec<(String, usize)>) -> Vec<ExprId> {
        let mut variables = Vec::with_capacity(names.len());
        for (name, index) in names {
            let var = self.scopes.declare(scope, &name, index);
            // Not a completed node in reading order, so it never owns a trailing comment.
            variables.push(self.ast.alloc(
                index,
                ExprKind::Variable(Variable {
                    name,
                    var,
                    declaration: true,
                }),
            ));
        }
        variables
    }

    fn local_statement(&mut self, index: usize) -> ParseResult<ExprId> {
        if self.eat_keyword(KeywordId::Function)? {
            let Some((name, name_index)) = self.located_name()? else {
                return self.fail("Expected a name");
            };
            let var = self.scopes.declare(self.scope, &name, name_index);
            let name = self.node(
                name_index,
                ExprKind::Variable(Variable {
                    name,
                    var,
                    declaration: true,
                }),
            );
            return self.function_body(
                index,
                FunctionHead {
                    form: FunctionForm::Declaration,
                    name: Some(name),
                    local: true,
                    method: false,
                },
            );
        }

        let names = self.typed_name_list()?;
        if names.is_empty() {
            return self.fail("Expected a name");
        }
        let expressions = if self.eat_assign()? {
            self.expect_expression_list()?
        } else {
            Vec::new()
        };

        let mut variables = Vec::with_capacity(names.len());
        for (name, name_index, parsed_typing) in names {
            let var = self.scopes.declare(self.scope, &name, name_index);
            let id = self.ast.alloc(
                name_index,
                ExprKind::Variable(Variable {
                    name,
                    var,
                    declaration: true,
                }),
            );
            self.ast[id].parsed_typing = parsed_typing;
            variables.push(id);
        }
        Ok(self.node(
            index,
            ExprKind::Assignment(Assignment {
                variables,
                expressions,
                local: true,
            }),
        ))
    }

    /// A statement that does not start with a keyword: a call, or an assignment.
    fn expression_statement(&mut self, index: usize) -> ParseResult<Option<ExprId>> {
        let Some(first) = self.expression()? else {
            return Ok(None);
        };
        match self.ast.kind(first) {
            ExprKind::FunctionCall(_) | ExprKind::FunctionSelfCall(_) => return Ok(Some(first)),
            ExprKind::Variable(_) | ExprKind::Field(_) => {}
            _ => return Err(self.error_at(index, "Unexpected symbol")),
        }

        let mut variables = vec![first];
        while self.eat(",")? {
            let target = self.expression()?;
            match target {
                Some(target) if matches!(self.ast.kind(target), ExprKind::Variable(_) | ExprKind::Field(_)) => {
                    variables.push(target)
                }
                _ => return self.fail("Expected a variable/field"),
            }
        }
        if !self.eat_assign()? {
            return self.fail("Expected `=`");
        }
        let expressions = self.expect_expression_list()?;
        Ok(Some(self.node(
            index,
            ExprKind::Assignment(Assignment {
                variables,
                expressions,
                local: false,
            }),
        )))
    }

    /// `name {. name} [: name]` after the `function` keyword.
    fn function_name(&mut self) -> ParseResult<ExprId> {
        let Some((name, index)) = self.located_name()? else {
            return self.fail("Expected a name");
        };
        let var = self.scopes.resolve(self.scope, &name);
        let mut expr = self.node(
            index,
            ExprKind::Variable(Variable {
                name,
                var,
                declaration: false,
            }),
        );
        while self.eat(".")? {
            let index = self.trim()?;
            let name = self.expect_name()?;
            expr = self.node(
                index,
                ExprKind::Field(Field {
                    base: expr,
                    member: Member::Name(name),
                }),
            );
        }
        if self.eat(":")? {
            let index = self.trim()?;
            let name = self.expect_name()?;
            expr = self.node(index, ExprKind::Method(Method { base: expr, name }));
        }
        Ok(expr)
    }

    fn name_list(&mut self) -> ParseResult<Vec<(String, usize)>> {
        let mut names = Vec::new();
        let Some(first) = self.located_name()? else {
            return Ok(names);
        };
        names.push(first);
        while self.eat(",")? {
            match self.located_name()? {
                Some(name) => names.push(name),
                None => return self.fail("Expected a name"),
            }
        }
        Ok(names)
    }

    /// `name [: typing] {, name [: typing]}` of a `local` statement.
    fn typed_name_list(&mut self) -> ParseResult<Vec<(String, usize, Option<ParsedTyping>)>> {
        let mut names = Vec::new();
        loop {
            let Some((name, index)) = self.located_name()? else {
                if names.is_empty() {
                    return Ok(names);
                }
                return self.fail("Expected a name");
            };
            let typing = self.annotation()?;
            names.push((name, index, typing));
            if !self.eat(",")? {
                return Ok(names);
            }
        }
    }
}
