/// Functions and lambdas.
///
/// ## Notes
/// - Every function body gets a fresh scope holding (in order) the implicit `self` of a method declaration and
///   the declared parameters.
/// - A lambda is recognised speculatively: its header (`(params) =>` or `name =>`) is parsed under a checkpoint
///   and any failure there restores the scanner so the text can be re-read as an ordinary expression.
struct FunctionHead {
    form: FunctionForm,
    name: Option<ExprId>,
    local: bool,
    method: bool,
}

/// A parsed parameter list, before its names are declared.
#[derive(Default)]
struct ParameterList {
    names: Vec<(String, usize, Option<ParsedTyping>)>,
    variadic: bool,
    vararg_annotation: Option<ParsedTyping>,
}

impl<'a> Parser<'a> {
    /// `( params ) [: returns] block end`, starting at the opening parenthesis.
    fn function_body(&mut self, index: usize, head: FunctionHead) -> ParseResult<ExprId> {
        self.expect("(", "Expected `(`")?;
        let list = self.parameter_list()?;
        self.expect(")", "Expected `)`")?;
        let returns_annotation = if self.eat(":")? { Some(self.type_tuple()?) } else { None };

        let line = self.line();
        let scope = self.open_scope();
        let self_var = head.method.then(|| self.scopes.declare(scope, "self", index));
        let parameters = self.declare_parameters(scope, list.names);
        let block = self.block_in(scope)?;
        let end_index = self.close(KeywordId::End, format!("Expected `end` for function (line {line})"))?;

        Ok(self.node(
            index,
            ExprKind::Function(Function {
                form: head.form,
                name: head.name,
                local: head.local,
                self_var,
                parameters,
                variadic: list.variadic,
                vararg_annotation: list.vararg_annotation,
                returns_annotation,
                chunk: Chunk { block, scope },
                end_index,
                vararg_typing: None,
            }),
        ))
    }

    /// `name [: typing] {, name [: typing]} [, ... [: typing]]` up to, not including, the closing parenthesis.
    fn parameter_list(&mut self) -> ParseResult<ParameterList> {
        let mut list = ParameterList::default();
        loop {
            if self.eat("...")? {
                list.variadic = true;
                list.vararg_annotation = self.annotation()?;
                return Ok(list);
            }
            let Some((name, index)) = self.located_name()? else {
                if list.names.is_empty() {
                    return Ok(list);
                }
                return self.fail("Expected a name");
            };
            let typing = self.annotation()?;
            list.names.push((name, index, typing));
            if !self.eat(",")? {
                return Ok(list);
            }
        }
    }

    fn declare_parameters(
        &mut self,
        scope: ScopeId,
        names: Vec<(String, usize, Option<ParsedTyping>)>,
    ) -> Vec<Parameter> {
        names
            .into_iter()
            .map(|(name, index, parsed_typing)| {
                let var: VarId = self.scopes.declare(scope, &name, index);
                Parameter {
                    name,
                    var,
                    index,
                    parsed_typing,
                    typing: None,
                }
            })
            .collect()
    }

    /// Try to parse a lambda starting at `index`.
    ///
    /// Bodies:
    /// - `(params) => { block }`
    /// - `(params) => do block end`
    /// - `(params) => expr, ...` (an implicit `return`), optionally parenthesized: `x => (a, b)`
    fn lambda(&mut self, index: usize) -> ParseResult<Option<ExprId>> {
        let checkpoint = self.checkpoint();
        let list = match self.lambda_header() {
            Ok(Some(list)) => list,
            Ok(None) | Err(_) => {
                self.restore(checkpoint);
                return Ok(None);
            }
        };

        let scope = self.open_scope();
        let parameters = self.declare_parameters(scope, list.names);
        let (block, end_index) = if self.eat("{")? {
            let line = self.line();
            let block = self.block_in(scope)?;
            let end_index = self.trim()?;
            self.expect("}", format!("Expected `}}` for lambda (line {line})"))?;
            (block, end_index)
        } else if self.eat_keyword(KeywordId::Do)? {
            let line = self.line();
            let block = self.block_in(scope)?;
            let end_index = self.close(KeywordId::End, format!("Expected `end` for lambda (line {line})"))?;
            (block, end_index)
        } else {
            let body_index = self.trim()?;
            let expressions = self.in_scope(scope, |p| p.lambda_results())?;
            let block = if expressions.is_empty() {
                Vec::new()
            } else {
                vec![self.ast.alloc(body_index, ExprKind::Return(Return { expressions }))]
            };
            (block, body_index)
        };

        Ok(Some(self.node(
            index,
            ExprKind::Function(Function {
                form: FunctionForm::Lambda,
                name: None,
                local: false,
                self_var: None,
                parameters,
                variadic: list.variadic,
                vararg_annotation: list.vararg_annotation,
                returns_annotation: None,
                chunk: Chunk { block, scope },
                end_index,
                vararg_typing: None,
            }),
        )))
    }

    fn lambda_header(&mut self) -> ParseResult<Option<ParameterList>> {
        let list = if self.eat_raw("(") {
            let list = self.parameter_list()?;
            if !self.eat(")")? {
                return Ok(None);
            }
            list
        } else {
            let Some((name, index)) = self.located_name()? else {
                return Ok(None);
            };
            ParameterList {
                names: vec![(name, index, None)],
                ..ParameterList::default()
            }
        };
        if !self.eat("=>")? {
            return Ok(None);
        }
        Ok(Some(list))
    }

    /// The implicit return list of an expression-bodied lambda.
    fn lambda_results(&mut self) -> ParseResult<Vec<ExprId>> {
        let checkpoint = self.checkpoint();
        let failure = match self.expression_list() {
            Ok(Some(expressions)) => return Ok(expressions),
            Ok(None) => self.error("Expected an expression"),
            Err(err) => err,
        };

        // `x => (a, b)` and `x => ()` are not expressions; retry as a parenthesized result list.
        self.restore(checkpoint);
        if !self.eat_raw("(") {
            return Err(failure);
        }
        let expressions = self.expression_list()?.unwrap_or_default();
        self.expect(")", "Expected `)`")?;
        Ok(expressions)
    }
}
