//! Tree walker base.
//!
//! [`Walker`] is a visitor with one method per [`ExprKind`] variant. Every method defaults to walking the node's
//! children in document order, so an implementation overrides only the variants it cares about and calls
//! [`walk_children`] (or the walker's own `walk`) to keep descending.
//!
//! ## Notes
//! - Dispatch is an exhaustive `match` in [`dispatch`]; adding a variant is a compile error until every walker
//!   handles it.
//! - Walkers address nodes by [`ExprId`] and reach the arena through [`Walker::ast`], so an implementation that
//!   owns the tree mutably (the analyzer writes typings back) can still use the default traversal.
//!
//! ## Examples
//! ```rust
//! use tlua_syntax::ast::{Ast, ExprId};
//! use tlua_syntax::walker::Walker;
//!
//! struct CountVariables<'a> {
//!     ast: &'a Ast,
//!     count: usize,
//! }
//!
//! impl Walker for CountVariables<'_> {
//!     fn ast(&self) -> &Ast {
//!         self.ast
//!     }
//!
//!     fn walk_variable(&mut self, _id: ExprId) {
//!         self.count += 1;
//!     }
//! }
//!
//! let chunk = tlua_syntax::parser::parse("local a = b + c").unwrap();
//! let mut counter = CountVariables { ast: &chunk.ast, count: 0 };
//! counter.walk_block(chunk.block());
//! assert_eq!(counter.count, 3);
//! ```

use crate::ast::{Ast, ExprId, ExprKind, Member};

/// Visitor over syntax nodes.
pub trait Walker {
    /// The arena the walked ids belong to.
    fn ast(&self) -> &Ast;

    /// Visit one node through its variant method.
    fn walk(&mut self, id: ExprId) {
        dispatch(self, id);
    }

    /// Visit every statement of a block in order.
    fn walk_block(&mut self, block: &[ExprId]) {
        for &statement in block {
            self.walk(statement);
        }
    }

    fn walk_vararg(&mut self, _id: ExprId) {}

    fn walk_break(&mut self, _id: ExprId) {}

    fn walk_return(&mut self, id: ExprId) {
        walk_children(self, id);
    }

    fn walk_variable(&mut self, _id: ExprId) {}

    fn walk_field(&mut self, id: ExprId) {
        walk_children(self, id);
    }

    fn walk_method(&mut self, id: ExprId) {
        walk_children(self, id);
    }

    fn walk_do(&mut self, id: ExprId) {
        walk_children(self, id);
    }

    fn walk_while(&mut self, id: ExprId) {
        walk_children(self, id);
    }

    fn walk_repeat(&mut self, id: ExprId) {
        walk_children(self, id);
    }

    fn walk_if(&mut self, id: ExprId) {
        walk_children(self, id);
    }

    fn walk_numeric_for(&mut self, id: ExprId) {
        walk_children(self, id);
    }

    fn walk_generic_for(&mut self, id: ExprId) {
        walk_children(self, id);
    }

    fn walk_assignment(&mut self, id: ExprId) {
        walk_children(self, id);
    }

    fn walk_unary_op(&mut self, id: ExprId) {
        walk_children(self, id);
    }

    fn walk_binary_op(&mut self, id: ExprId) {
        walk_children(self, id);
    }

    fn walk_function_call(&mut self, id: ExprId) {
        walk_children(self, id);
    }

    fn walk_function_self_call(&mut self, id: ExprId) {
        walk_children(self, id);
    }

    fn walk_brackets(&mut self, id: ExprId) {
        walk_children(self, id);
    }

    fn walk_constant(&mut self, _id: ExprId) {}

    fn walk_table(&mut self, id: ExprId) {
        walk_children(self, id);
    }

    fn walk_function(&mut self, id: ExprId) {
        walk_children(self, id);
    }

    fn walk_comment(&mut self, _id: ExprId) {}
}

/// Route `id` to the walker method for its variant.
pub fn dispatch<W: Walker + ?Sized>(walker: &mut W, id: ExprId) {
    match walker.ast().kind(id) {
        ExprKind::Vararg => walker.walk_vararg(id),
        ExprKind::Break => walker.walk_break(id),
        ExprKind::Return(_) => walker.walk_return(id),
        ExprKind::Variable(_) => walker.walk_variable(id),
        ExprKind::Field(_) => walker.walk_field(id),
        ExprKind::Method(_) => walker.walk_method(id),
        ExprKind::Do(_) => walker.walk_do(id),
        ExprKind::While(_) => walker.walk_while(id),
        ExprKind::Repeat(_) => walker.walk_repeat(id),
        ExprKind::If(_) => walker.walk_if(id),
        ExprKind::NumericFor(_) => walker.walk_numeric_for(id),
        ExprKind::GenericFor(_) => walker.walk_generic_for(id),
        ExprKind::Assignment(_) => walker.walk_assignment(id),
        ExprKind::UnaryOp(_) => walker.walk_unary_op(id),
        ExprKind::BinaryOp(_) => walker.walk_binary_op(id),
        ExprKind::FunctionCall(_) => walker.walk_function_call(id),
        ExprKind::FunctionSelfCall(_) => walker.walk_function_self_call(id),
        ExprKind::Brackets(_) => walker.walk_brackets(id),
        ExprKind::Constant(_) => walker.walk_constant(id),
        ExprKind::Table(_) => walker.walk_table(id),
        ExprKind::Function(_) => walker.walk_function(id),
        ExprKind::Comment(_) => walker.walk_comment(id),
    }
}

/// Walk every child of `id` in document order.
pub fn walk_children<W: Walker + ?Sized>(walker: &mut W, id: ExprId) {
    for child in children(walker.ast(), id) {
        walker.walk(child);
    }
}

/// Direct children of a node, in document order.
///
/// ## Notes
/// - Comments are not children; they hang off [`crate::ast::Expr::comment`].
/// - A function's declared name comes before its body statements; parameters are not nodes.
pub fn children(ast: &Ast, id: ExprId) -> Vec<ExprId> {
    let mut out = Vec::new();
    match ast.kind(id) {
        ExprKind::Vararg | ExprKind::Break | ExprKind::Variable(_) | ExprKind::Constant(_) | ExprKind::Comment(_) => {}
        ExprKind::Return(ret) => out.extend(&ret.expressions),
        ExprKind::Field(field) => {
            out.push(field.base);
            if let Member::Index(key) = field.member {
                out.push(key);
            }
        }
        ExprKind::Method(method) => out.push(method.base),
        ExprKind::Do(node) => out.extend(&node.block),
        ExprKind::While(node) => {
            out.push(node.condition);
            out.extend(&node.block);
        }
        ExprKind::Repeat(node) => {
            out.extend(&node.block);
            out.push(node.condition);
        }
        ExprKind::If(node) => {
            for branch in &node.branches {
                out.push(branch.condition);
                out.extend(&branch.block);
            }
            if let Some(otherwise) = &node.otherwise {
                out.extend(otherwise);
            }
        }
        ExprKind::NumericFor(node) => {
            out.extend([node.variable, node.start, node.limit]);
            out.extend(node.step);
            out.extend(&node.block);
        }
        ExprKind::GenericFor(node) => {
            out.extend(&node.variables);
            out.extend(&node.expressions);
            out.extend(&node.block);
        }
        ExprKind::Assignment(node) => {
            out.extend(&node.variables);
            out.extend(&node.expressions);
        }
        ExprKind::UnaryOp(op) => out.push(op.operand),
        ExprKind::BinaryOp(op) => out.extend([op.left, op.right]),
        ExprKind::FunctionCall(call) => {
            out.push(call.target);
            out.extend(&call.arguments);
        }
        ExprKind::FunctionSelfCall(call) => {
            out.push(call.base);
            out.extend(&call.arguments);
        }
        ExprKind::Brackets(inner) => out.push(*inner),
        ExprKind::Table(table) => {
            for entry in &table.entries {
                out.extend(entry.key);
                out.push(entry.value);
            }
        }
        ExprKind::Function(function) => {
            out.extend(function.name);
            out.extend(&function.chunk.block);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    /// Records the variant name of every visited node.
    struct Trace<'a> {
        ast: &'a Ast,
        seen: Vec<&'static str>,
    }

    impl Walker for Trace<'_> {
        fn ast(&self) -> &Ast {
            self.ast
        }

        fn walk(&mut self, id: ExprId) {
            self.seen.push(self.ast.kind(id).name());
            dispatch(self, id);
        }
    }

    fn trace(source: &str) -> Vec<&'static str> {
        let chunk = parser::parse(source).expect("parse");
        let mut walker = Trace {
            ast: &chunk.ast,
            seen: Vec::new(),
        };
        walker.walk_block(chunk.block());
        walker.seen
    }

    #[test]
    fn test_document_order() {
        assert_eq!(
            trace("x = f(1) + 2"),
            vec!["Assignment", "Variable", "BinaryOp", "FunctionCall", "Variable", "Constant", "Constant"]
        );
    }

    #[test]
    fn test_loops_and_functions() {
        assert_eq!(
            trace("for i = 1, 2 do end\nlocal function g(a) return a end"),
            vec!["NumericFor", "Variable", "Constant", "Constant", "Function", "Variable", "Return", "Variable"]
        );
    }

    #[test]
    fn test_override_stops_descent() {
        struct Shallow<'a> {
            ast: &'a Ast,
            functions: usize,
            constants: usize,
        }

        impl Walker for Shallow<'_> {
            fn ast(&self) -> &Ast {
                self.ast
            }

            fn walk_function(&mut self, _id: ExprId) {
                self.functions += 1;
            }

            fn walk_constant(&mut self, _id: ExprId) {
                self.constants += 1;
            }
        }

        let chunk = parser::parse("local f = function() return 1 end\nlocal n = 2").expect("parse");
        let mut walker = Shallow {
            ast: &chunk.ast,
            functions: 0,
            constants: 0,
        };
        walker.walk_block(chunk.block());
        assert_eq!((walker.functions, walker.constants), (1, 1));
    }

    #[test]
    fn test_children_of_table_and_if() {
        let chunk = parser::parse("local t = { 1, k = 2 }\nif a then elseif b then else end").expect("parse");
        let ExprKind::Assignment(local) = chunk.ast.kind(chunk.block()[0]) else {
            panic!("expected assignment");
        };
        assert_eq!(children(&chunk.ast, local.expressions[0]).len(), 3);
        assert_eq!(children(&chunk.ast, chunk.block()[1]).len(), 2);
    }
}
