//! Loops.
//!
//! Loop variables are registered before the loop's children are walked, so the variable nodes find them in the
//! flow instead of stealing. `while`, `repeat`, `if` and `do` need nothing beyond the default traversal.

use tlua_core::{Typing, TypingHolder};
use tlua_syntax::ast::{ExprId, ExprKind};
use tlua_syntax::walker;

use super::Analyzer;

impl Analyzer<'_> {
    pub(crate) fn analyze_numeric_for(&mut self, id: ExprId) {
        let ExprKind::NumericFor(node) = self.chunk.ast.kind(id) else {
            return;
        };
        if let ExprKind::Variable(variable) = self.chunk.ast.kind(node.variable) {
            let var = variable.var;
            self.flow.assign(var, TypingHolder::explicit(Typing::number()));
        }
        walker::walk_children(self, id);
    }

    /// Generic-for variables are `any`; iterator protocols are not modelled.
    pub(crate) fn analyze_generic_for(&mut self, id: ExprId) {
        let ExprKind::GenericFor(node) = self.chunk.ast.kind(id) else {
            return;
        };
        let vars: Vec<_> = node
            .variables
            .iter()
            .filter_map(|&v| match self.chunk.ast.kind(v) {
                ExprKind::Variable(variable) => Some(variable.var),
                _ => None,
            })
            .collect();
        for var in vars {
            self.flow.assign(var, TypingHolder::unknown());
        }
        walker::walk_children(self, id);
    }
}
