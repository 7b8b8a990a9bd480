#[cfg(test)]
/// Parser unit tests.
///
/// These tests cover the syntactic forms, operator rebalancing, scope resolution while parsing, comment capture,
/// and the exact wording of the fatal errors.
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> MainChunk {
        parse(source).unwrap_or_else(|e| panic!("parse failed for {source:?}: {e}"))
    }

    fn parse_err(source: &str) -> ParseError {
        parse(source).expect_err("expected a parse error")
    }

    fn stmt(chunk: &MainChunk, i: usize) -> &ExprKind {
        chunk.ast.kind(chunk.block()[i])
    }

    fn assignment(chunk: &MainChunk, i: usize) -> &Assignment {
        match stmt(chunk, i) {
            ExprKind::Assignment(a) => a,
            other => panic!("expected assignment, got {}", other.name()),
        }
    }

    /// The first value of the `i`-th statement, which must be an assignment.
    fn value(chunk: &MainChunk, i: usize) -> ExprId {
        assignment(chunk, i).expressions[0]
    }

    fn var_of(chunk: &MainChunk, id: ExprId) -> VarId {
        match chunk.ast.kind(id) {
            ExprKind::Variable(v) => v.var,
            other => panic!("expected variable, got {}", other.name()),
        }
    }

    fn function(chunk: &MainChunk, id: ExprId) -> &Function {
        match chunk.ast.kind(id) {
            ExprKind::Function(f) => f,
            other => panic!("expected function, got {}", other.name()),
        }
    }

    /// Fully parenthesized rendering of an expression tree.
    fn render(chunk: &MainChunk, id: ExprId) -> String {
        match chunk.ast.kind(id) {
            ExprKind::Constant(value) => value.to_source(),
            ExprKind::Variable(v) => v.name.clone(),
            ExprKind::BinaryOp(op) => format!(
                "({} {} {})",
                render(chunk, op.left),
                op.operator,
                render(chunk, op.right)
            ),
            ExprKind::UnaryOp(op) => format!("({} {})", op.operator, render(chunk, op.operand)),
            ExprKind::Brackets(inner) => format!("<{}>", render(chunk, *inner)),
            ExprKind::Vararg => "...".to_string(),
            other => other.name().to_string(),
        }
    }

    fn render_value(source: &str) -> String {
        let chunk = parse_ok(source);
        render(&chunk, value(&chunk, 0))
    }

    #[test]
    fn test_parse_statements() {
        let chunk = parse_ok("local x = 1\nprint(x)\n");
        assert_eq!(chunk.block().len(), 2);
        assert!(assignment(&chunk, 0).local);
        assert!(matches!(stmt(&chunk, 1), ExprKind::FunctionCall(_)));
    }

    #[test]
    fn test_empty_statements_are_skipped() {
        let chunk = parse_ok(";;local x = 1;;; x = 2;");
        assert_eq!(chunk.block().len(), 2);
    }

    #[test]
    fn test_binary_precedence() {
        assert_eq!(render_value("local v = 1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(render_value("local v = 1 * 2 + 3"), "((1 * 2) + 3)");
        assert_eq!(render_value("local v = a or b and c"), "(a or (b and c))");
        assert_eq!(render_value("local v = a and b or c"), "((a and b) or c)");
        assert_eq!(render_value("local v = a + b .. c"), "((a + b) .. c)");
        assert_eq!(render_value("local v = (a + b) * c"), "(<(a + b)> * c)");
    }

    #[test]
    fn test_associativity() {
        assert_eq!(render_value("local v = a - b - c - d"), "(((a - b) - c) - d)");
        assert_eq!(render_value("local v = a < b == c"), "((a < b) == c)");
        assert_eq!(render_value("local v = a ^ b ^ c"), "(a ^ (b ^ c))");
        assert_eq!(render_value("local v = a .. b .. c"), "(a .. (b .. c))");
    }

    #[test]
    fn test_unary_precedence() {
        assert_eq!(render_value("local v = -a ^ b"), "(- (a ^ b))");
        assert_eq!(render_value("local v = -a + b"), "((- a) + b)");
        assert_eq!(render_value("local v = not a == b"), "((not a) == b)");
        assert_eq!(render_value("local v = 2 ^ -3"), "(2 ^ (- 3))");
        assert_eq!(render_value("local v = #t * 2"), "((# t) * 2)");
    }

    #[test]
    fn test_redeclaration_creates_new_variable() {
        let chunk = parse_ok("local x = 1\nlocal x = 2\nprint(x)");
        let first = var_of(&chunk, assignment(&chunk, 0).variables[0]);
        let second = var_of(&chunk, assignment(&chunk, 1).variables[0]);
        let ExprKind::FunctionCall(call) = stmt(&chunk, 2) else {
            panic!("expected call");
        };
        let used = var_of(&chunk, call.arguments[0]);
        assert_ne!(first, second);
        assert_eq!(used, second);
    }

    #[test]
    fn test_local_initializer_cannot_see_itself() {
        let chunk = parse_ok("local x = x");
        assert!(!var_of(&chunk, value(&chunk, 0)).is_local());
        assert!(var_of(&chunk, assignment(&chunk, 0).variables[0]).is_local());
    }

    #[test]
    fn test_globals_share_identity() {
        let chunk = parse_ok("print(1)\nprint(2)");
        let target = |i: usize| match stmt(&chunk, i) {
            ExprKind::FunctionCall(call) => var_of(&chunk, call.target),
            _ => panic!("expected call"),
        };
        assert_eq!(target(0), target(1));
        assert!(!target(0).is_local());
    }

    #[test]
    fn test_local_function_sees_itself() {
        let chunk = parse_ok("local function f() return f() end");
        let f = function(&chunk, chunk.block()[0]);
        assert!(f.local);
        let declared = var_of(&chunk, f.name.expect("name"));
        let ExprKind::Return(ret) = chunk.ast.kind(f.chunk.block[0]) else {
            panic!("expected return");
        };
        let ExprKind::FunctionCall(call) = chunk.ast.kind(ret.expressions[0]) else {
            panic!("expected call");
        };
        assert_eq!(var_of(&chunk, call.target), declared);
    }

    #[test]
    fn test_method_declaration_declares_self() {
        let chunk = parse_ok("function a.b:c(x) return self end");
        let f = function(&chunk, chunk.block()[0]);
        let self_var = f.self_var.expect("self");
        assert_eq!(f.parameters.len(), 1);
        let ExprKind::Return(ret) = chunk.ast.kind(f.chunk.block[0]) else {
            panic!("expected return");
        };
        assert_eq!(var_of(&chunk, ret.expressions[0]), self_var);

        let ExprKind::Method(method) = chunk.ast.kind(f.name.expect("name")) else {
            panic!("expected method name");
        };
        assert_eq!(method.name, "c");
        let ExprKind::Field(field) = chunk.ast.kind(method.base) else {
            panic!("expected field");
        };
        assert_eq!(field.member, Member::Name("b".to_string()));
    }

    #[test]
    fn test_loop_variables_are_declared_in_body() {
        let chunk = parse_ok("for i = 1, 10, 2 do print(i) end\nfor k, v in pairs(t) do end");
        let ExprKind::NumericFor(numeric) = stmt(&chunk, 0) else {
            panic!("expected numeric for");
        };
        assert!(numeric.step.is_some());
        let ExprKind::FunctionCall(call) = chunk.ast.kind(numeric.block[0]) else {
            panic!("expected call");
        };
        assert_eq!(var_of(&chunk, call.arguments[0]), var_of(&chunk, numeric.variable));

        let ExprKind::GenericFor(generic) = stmt(&chunk, 1) else {
            panic!("expected generic for");
        };
        assert_eq!(generic.variables.len(), 2);
        assert_eq!(generic.expressions.len(), 1);
    }

    #[test]
    fn test_repeat_condition_sees_body_locals() {
        let chunk = parse_ok("repeat local done = true until done");
        let ExprKind::Repeat(repeat) = stmt(&chunk, 0) else {
            panic!("expected repeat");
        };
        let ExprKind::Assignment(local) = chunk.ast.kind(repeat.block[0]) else {
            panic!("expected local");
        };
        assert_eq!(var_of(&chunk, repeat.condition), var_of(&chunk, local.variables[0]));
    }

    #[test]
    fn test_if_branches_and_offsets() {
        let source = "if a then x = 1 elseif b then x = 2 else x = 3 end";
        let chunk = parse_ok(source);
        let ExprKind::If(node) = stmt(&chunk, 0) else {
            panic!("expected if");
        };
        assert_eq!(node.branches.len(), 2);
        assert_eq!(node.branches[1].index, source.find("elseif").expect("elseif"));
        assert_eq!(node.else_index, source.find("else "));
        assert_eq!(node.end_index, source.rfind("end").expect("end"));
        assert!(node.otherwise.is_some());
    }

    #[test]
    fn test_fields_and_calls() {
        let chunk = parse_ok("t.a[1] = 2\nobj:m(1)\nprint \"hi\"\nf{1}\nf[[s]]");
        let target = assignment(&chunk, 0).variables[0];
        let ExprKind::Field(outer) = chunk.ast.kind(target) else {
            panic!("expected field");
        };
        assert!(matches!(outer.member, Member::Index(_)));
        assert!(matches!(chunk.ast.kind(outer.base), ExprKind::Field(_)));

        let ExprKind::FunctionSelfCall(call) = stmt(&chunk, 1) else {
            panic!("expected self call");
        };
        assert_eq!(call.name, "m");
        assert_eq!(call.arguments.len(), 1);

        for i in 2..5 {
            let ExprKind::FunctionCall(call) = stmt(&chunk, i) else {
                panic!("expected call at {i}");
            };
            assert_eq!(call.arguments.len(), 1);
        }
    }

    #[test]
    fn test_table_constructor() {
        let chunk = parse_ok("local t = { 1, x = 2, [3] = 4; 'five' }");
        let ExprKind::Table(table) = chunk.ast.kind(value(&chunk, 0)) else {
            panic!("expected table");
        };
        assert_eq!(table.entries.len(), 4);
        assert!(table.entries[0].key.is_none());
        assert!(table.entries[1].named);
        assert_eq!(
            chunk.ast.kind(table.entries[1].key.expect("key")),
            &ExprKind::Constant(ConstantValue::String("x".to_string()))
        );
        assert!(!table.entries[2].named);
        assert!(table.entries[2].key.is_some());
        assert!(table.entries[3].key.is_none());
    }

    #[test]
    fn test_numbers() {
        let chunk = parse_ok("local a, b, c, d = 0x1F, 1e3, .5, 3.25");
        let values: Vec<_> = assignment(&chunk, 0)
            .expressions
            .iter()
            .map(|&id| chunk.ast.kind(id).clone())
            .collect();
        assert_eq!(
            values,
            vec![
                ExprKind::Constant(ConstantValue::Number(31.0)),
                ExprKind::Constant(ConstantValue::Number(1000.0)),
                ExprKind::Constant(ConstantValue::Number(0.5)),
                ExprKind::Constant(ConstantValue::Number(3.25)),
            ]
        );
        assert_eq!(parse_err("local a = 3.").message, "Malformed number");
        assert_eq!(parse_err("local a = 0xZZ").message, "Malformed number");
        assert_eq!(parse_err("local a = 1e").message, "Malformed number");
    }

    #[test]
    fn test_strings() {
        let chunk = parse_ok(r#"local s = "a\65\n\"q\"\\""#);
        assert_eq!(
            chunk.ast.kind(value(&chunk, 0)),
            &ExprKind::Constant(ConstantValue::String("aA\n\"q\"\\".to_string()))
        );

        let chunk = parse_ok("local s = [[\nhello]]\nlocal t = [==[a]]b]==]");
        assert_eq!(
            chunk.ast.kind(value(&chunk, 0)),
            &ExprKind::Constant(ConstantValue::String("hello".to_string()))
        );
        assert_eq!(
            chunk.ast.kind(value(&chunk, 1)),
            &ExprKind::Constant(ConstantValue::String("a]]b".to_string()))
        );

        // Decimal escapes above 127 name the scalar value with that number.
        let chunk = parse_ok(r#"local s = "\200\255""#);
        assert_eq!(
            chunk.ast.kind(value(&chunk, 0)),
            &ExprKind::Constant(ConstantValue::String("\u{c8}\u{ff}".to_string()))
        );

        assert_eq!(parse_err(r#"local s = "\300""#).message, "Escape sequence too large");
        assert_eq!(parse_err("local s = \"abc").message, "Unfinished string");
        assert_eq!(parse_err("local s = [=[abc]]").message, "Unfinished string");
    }

    #[test]
    fn test_comments_attach_to_previous_node() {
        let chunk = parse_ok("-- header\nlocal x = 1 -- trailing\n");
        let start = chunk.start_comment.expect("leading comment");
        assert_eq!(
            chunk.ast.kind(start),
            &ExprKind::Comment(Comment {
                text: " header".to_string(),
                level: None
            })
        );
        let trailing: Vec<_> = chunk.ast.comments(value(&chunk, 0)).map(|(_, c)| c.text.clone()).collect();
        assert_eq!(trailing, vec![" trailing".to_string()]);
    }

    #[test]
    fn test_adjacent_comments_chain() {
        let chunk = parse_ok("f() -- one\n-- two\n--[==[ three ]==]\n");
        let comments: Vec<_> = chunk
            .ast
            .comments(chunk.block()[0])
            .map(|(_, c)| (c.text.clone(), c.level))
            .collect();
        assert_eq!(
            comments,
            vec![
                (" one".to_string(), None),
                (" two".to_string(), None),
                (" three ".to_string(), Some(2)),
            ]
        );
    }

    #[test]
    fn test_comment_inside_abandoned_lambda_header_is_kept_once() {
        let chunk = parse_ok("local v = (a --[[ note ]] + b)");
        let count = chunk
            .ast
            .iter()
            .filter(|(_, e)| matches!(&e.kind, ExprKind::Comment(c) if c.text == " note "))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_unfinished_long_comment() {
        let err = parse_err("local x = 1\n--[[ never closed");
        assert_eq!(err.message, "Unfinished long comment starting at line 2");
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_block_errors_name_the_opening_line() {
        assert_eq!(
            parse_err("while true do\nx = 1\n").message,
            "Expected `end` to close `while` (line 1)"
        );
        assert_eq!(parse_err("if a then\nelseif b then\n").message, "Expected `end` to close `elseif` (line 1)");
        assert_eq!(parse_err("\nrepeat x = 1").message, "Expected `until` to close `repeat` (line 2)");
        assert_eq!(parse_err("function f()\n").message, "Expected `end` for function (line 1)");
    }

    #[test]
    fn test_statement_errors() {
        assert_eq!(parse_err("x").message, "Expected `=`");
        assert_eq!(parse_err("1 + 1").message, "Unexpected symbol");
        assert_eq!(parse_err("local x = 1 )").message, "Unexpected symbol");
        assert_eq!(parse_err("obj:method").message, "Expected function arguments");
        assert_eq!(parse_err("a, 1 = 2").message, "Expected a variable/field");
        assert_eq!(parse_err("local t = { 1 2 }").message, "Expected `,` or `;`");
        assert_eq!(parse_err("local = 1").message, "Expected a name");
    }

    #[test]
    fn test_lambdas() {
        let chunk = parse_ok("local f = (a: number, b) => a + b");
        let f = function(&chunk, value(&chunk, 0));
        assert_eq!(f.form, FunctionForm::Lambda);
        assert_eq!(f.parameters.len(), 2);
        assert_eq!(f.parameters[0].parsed_typing, Some(ParsedTyping::Name("number".to_string())));
        let ExprKind::Return(ret) = chunk.ast.kind(f.chunk.block[0]) else {
            panic!("expected implicit return");
        };
        assert_eq!(render(&chunk, ret.expressions[0]), "(a + b)");
        let ExprKind::BinaryOp(sum) = chunk.ast.kind(ret.expressions[0]) else {
            panic!("expected sum");
        };
        assert_eq!(var_of(&chunk, sum.left), f.parameters[0].var);
    }

    #[test]
    fn test_lambda_bodies() {
        let chunk = parse_ok("local g = x => (x, 1)\nlocal h = () => do return 1 end\nlocal k = (n) => { return n }");
        let g = function(&chunk, value(&chunk, 0));
        let ExprKind::Return(ret) = chunk.ast.kind(g.chunk.block[0]) else {
            panic!("expected implicit return");
        };
        assert_eq!(ret.expressions.len(), 2);

        let h = function(&chunk, value(&chunk, 1));
        assert!(h.parameters.is_empty());
        assert_eq!(h.chunk.block.len(), 1);

        let k = function(&chunk, value(&chunk, 2));
        assert_eq!(k.parameters.len(), 1);
    }

    #[test]
    fn test_parenthesized_name_is_not_a_lambda() {
        let chunk = parse_ok("local v = (a)");
        assert!(matches!(chunk.ast.kind(value(&chunk, 0)), ExprKind::Brackets(_)));
    }

    #[test]
    fn test_annotation_precedence() {
        let chunk = parse_ok("local x: number | string & boolean = 1");
        let target = assignment(&chunk, 0).variables[0];
        let name = |n: &str| ParsedTyping::Name(n.to_string());
        assert_eq!(
            chunk.ast[target].parsed_typing,
            Some(ParsedTyping::Union(vec![
                name("number"),
                ParsedTyping::Intersection(vec![name("string"), name("boolean")]),
            ]))
        );

        let chunk = parse_ok("local a: (number | nil)[]");
        let target = assignment(&chunk, 0).variables[0];
        assert_eq!(
            chunk.ast[target].parsed_typing,
            Some(ParsedTyping::Array(Box::new(ParsedTyping::Union(vec![
                name("number"),
                ParsedTyping::Constant(ConstantValue::Nil),
            ]))))
        );
    }

    #[test]
    fn test_function_annotations() {
        let chunk = parse_ok("function f(a: number, ...: string): (number, string) end");
        let f = function(&chunk, chunk.block()[0]);
        assert_eq!(f.parameters[0].parsed_typing, Some(ParsedTyping::Name("number".to_string())));
        assert!(f.variadic);
        assert_eq!(f.vararg_annotation, Some(ParsedTyping::Name("string".to_string())));
        assert_eq!(
            f.returns_annotation,
            Some(vec![
                ParsedTyping::Name("number".to_string()),
                ParsedTyping::Name("string".to_string()),
            ])
        );
    }

    #[test]
    fn test_lambda_typing() {
        let typing = parse_typing("(x: number, rest...: string) => boolean").expect("typing");
        let ParsedTyping::Function(function) = typing else {
            panic!("expected function typing");
        };
        assert_eq!(function.parameters.len(), 1);
        assert!(function.variadic);
        assert_eq!(function.vararg.as_deref(), Some(&ParsedTyping::Name("string".to_string())));
        assert_eq!(function.returns, vec![ParsedTyping::Name("boolean".to_string())]);

        let empty = parse_typing("() => ()").expect("typing");
        assert_eq!(empty, ParsedTyping::Function(ParsedFunctionTyping::default()));
        assert_eq!(parse_typing("number number").expect_err("leftover").message, "Unexpected symbol");
    }

    #[test]
    fn test_vararg_function() {
        let chunk = parse_ok("function f(...) return ... end");
        let f = function(&chunk, chunk.block()[0]);
        assert!(f.variadic);
        assert!(f.parameters.is_empty());
        let ExprKind::Return(ret) = chunk.ast.kind(f.chunk.block[0]) else {
            panic!("expected return");
        };
        assert_eq!(chunk.ast.kind(ret.expressions[0]), &ExprKind::Vararg);
    }

    #[test]
    fn test_line_endings_are_normalized() {
        let chunk = parse_ok("a()\r\nb()\rc()");
        assert_eq!(chunk.lines.line_count(), 3);
        assert_eq!(chunk.line(chunk.ast[chunk.block()[1]].index), 2);
        assert_eq!(chunk.line(chunk.ast[chunk.block()[2]].index), 3);
    }

    #[test]
    fn test_statement_offsets_are_ordered() {
        let chunk = parse_ok("local a = 1\nb = 2\nprint(a, b)\ndo end\n");
        let offsets: Vec<_> = chunk.block().iter().map(|&id| chunk.ast[id].index).collect();
        assert!(offsets.windows(2).all(|w| w[0] <= w[1]), "{offsets:?}");
    }
}
