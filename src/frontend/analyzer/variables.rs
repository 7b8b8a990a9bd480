//! Variables and assignments.
//!
//! ## Notes
//! - An assignment walks its values before its targets, so an unannotated target can take ("steal") the typing of
//!   the value it receives.
//! - Stolen typings are widened (`true` becomes `boolean`); a stolen `nil` carries no information and becomes a
//!   non-explicit `any` that later assignments may refine.

use std::collections::BTreeMap;

use tlua_core::{Typing, TypingHolder};
use tlua_syntax::ast::{ExprId, ExprKind, Member};
use tlua_syntax::scope::VarId;
use tlua_syntax::walker::Walker;

use super::Analyzer;
use crate::frontend::diagnostics::errors;

impl Analyzer<'_> {
    pub(crate) fn analyze_variable(&mut self, id: ExprId) {
        let expr = &self.chunk.ast[id];
        let ExprKind::Variable(variable) = &expr.kind else {
            return;
        };
        let (var, declaration, index) = (variable.var, variable.declaration, expr.index);
        let annotation = expr.parsed_typing.clone();

        if declaration {
            if let Some(parsed) = annotation {
                let typing = TypingHolder::explicit(self.resolve_annotation(&parsed, index));
                self.flow.declare(var, typing.clone());
                self.set_typing(id, typing);
                return;
            }
        }

        // Loop variables and function names are registered before their node is walked.
        if let Some(known) = self.flow.variable(var) {
            let known = known.clone();
            self.set_typing(id, known);
            return;
        }

        if let Some(stolen) = self.steal(id) {
            self.set_typing(id, stolen);
            return;
        }

        let name = self.chunk.variable_name(var).to_string();
        self.report(errors::implicit_variable(&name, index));
        self.set_typing(id, TypingHolder::unknown());
    }

    /// The typing an unannotated variable node takes from the construct it is declared by.
    fn steal(&self, id: ExprId) -> Option<TypingHolder> {
        let parent = self.parent_segment()?;
        let parent_id = parent.node?;
        match self.chunk.ast.kind(parent_id) {
            ExprKind::Assignment(assignment) => {
                let position = assignment.variables.iter().position(|&v| v == id)?;
                self.value_at(&assignment.expressions, position).map(stolen)
            }
            ExprKind::Function(function) if function.name == Some(id) => {
                parent.function.as_ref().map(|frame| frame.typing.clone())
            }
            _ => None,
        }
    }

    pub(crate) fn analyze_assignment(&mut self, id: ExprId) {
        let ExprKind::Assignment(assignment) = self.chunk.ast.kind(id) else {
            return;
        };
        let (variables, expressions) = (assignment.variables.clone(), assignment.expressions.clone());

        for &expr in &expressions {
            self.walk(expr);
        }
        for &target in &variables {
            self.walk(target);
        }

        for (position, &target) in variables.iter().enumerate() {
            let value = self.value_at(&expressions, position);
            let value_index = expressions
                .get(position)
                .or(expressions.last())
                .map(|&e| self.chunk.ast[e].index)
                .unwrap_or(self.chunk.ast[target].index);

            match self.chunk.ast.kind(target) {
                ExprKind::Variable(variable) => {
                    let (var, declaration) = (variable.var, variable.declaration);
                    match value {
                        Some(value) => self.assign_variable(target, var, declaration, value, value_index),
                        None => {
                            let typing = self.typing_of(target);
                            self.flow.assign(var, typing);
                        }
                    }
                }
                ExprKind::Field(_) => {
                    if let Some(value) = value {
                        self.extend_record(target, &value);
                    }
                }
                _ => {}
            }
        }
    }

    fn assign_variable(&mut self, target: ExprId, var: VarId, declaration: bool, value: TypingHolder, index: usize) {
        let declared = self.flow.declared(var).cloned();
        let target_typing = declared.clone().unwrap_or_else(|| self.typing_of(target));

        if target_typing.explicit && !target_typing.typing.can_cast_from(&value.typing) {
            self.report(errors::cannot_cast(
                &target_typing.typing.to_string(),
                &value.typing.to_string(),
                index,
            ));
        }

        let current = if declared.is_some() {
            value
        } else if declaration {
            // Same typing the declaration node stole.
            target_typing
        } else {
            let widened = stolen(value);
            TypingHolder::new(widened.typing, widened.explicit && target_typing.explicit)
        };
        self.flow.assign(var, current);
    }

    /// Record a new member on a local table whose typing is an anonymous record.
    ///
    /// `target` is a field assignment target (`t.name = ...`) or a member function name (`function t.name()`,
    /// `function t:name()`). Members already present keep their typing.
    pub(crate) fn extend_record(&mut self, target: ExprId, value: &TypingHolder) {
        let (base, name) = match self.chunk.ast.kind(target) {
            ExprKind::Field(field) => match &field.member {
                Member::Name(name) => (field.base, name.clone()),
                Member::Index(_) => return,
            },
            ExprKind::Method(method) => (method.base, method.name.clone()),
            _ => return,
        };
        let ExprKind::Variable(variable) = self.chunk.ast.kind(base) else {
            return;
        };
        let var = variable.var;
        if !var.is_local() {
            return;
        }
        let Some(current) = self.flow.variable(var) else {
            return;
        };
        let Typing::Interface(record) = &current.typing else {
            return;
        };
        if record.name.is_some() || record.fields.contains_key(&name) {
            return;
        }

        let mut fields: BTreeMap<String, Typing> = record.fields.clone();
        fields.insert(name.clone(), stolen(value.clone()).typing);
        let extended = TypingHolder::new(Typing::interface(None, fields), current.explicit);
        tracing::trace!(member = %name, "extend record");
        self.flow.assign(var, extended);
    }
}

/// Widen a value typing for storage in an unannotated variable.
pub(crate) fn stolen(value: TypingHolder) -> TypingHolder {
    if value.typing == Typing::nil() {
        return TypingHolder::unknown();
    }
    TypingHolder::new(value.typing.widened(), value.explicit)
}
