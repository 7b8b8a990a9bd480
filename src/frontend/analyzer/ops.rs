//! Literals, operators and table constructors.

use std::collections::BTreeMap;

use tlua_core::lang::operators::OperatorId;
use tlua_core::typing::Truthiness;
use tlua_core::{ConstantValue, Typing, TypingHolder};
use tlua_syntax::ast::{ExprId, ExprKind};
use tlua_syntax::walker;

use super::Analyzer;
use crate::frontend::diagnostics::errors;

impl Analyzer<'_> {
    pub(crate) fn analyze_constant(&mut self, id: ExprId) {
        let ExprKind::Constant(value) = self.chunk.ast.kind(id) else {
            return;
        };
        let typing = match value {
            ConstantValue::Nil | ConstantValue::Boolean(_) => Typing::Constant(value.clone()),
            ConstantValue::Number(_) => Typing::number(),
            ConstantValue::String(_) => Typing::string(),
        };
        self.set_typing(id, TypingHolder::explicit(typing));
    }

    pub(crate) fn analyze_binary_op(&mut self, id: ExprId) {
        walker::walk_children(self, id);
        let index = self.chunk.ast[id].index;
        let ExprKind::BinaryOp(op) = self.chunk.ast.kind(id) else {
            return;
        };
        let (operator, left, right) = (op.operator, op.left, op.right);
        let (left, right) = (self.scalar(left), self.scalar(right));

        let typing = match operator {
            OperatorId::And | OperatorId::Or => logical(operator, left, right),
            OperatorId::Concat => TypingHolder::explicit(Typing::string()),
            OperatorId::Eq | OperatorId::NotEq => TypingHolder::explicit(Typing::boolean()),
            _ if operator.is_arithmetic() && left.typing.is_number() && right.typing.is_number() => {
                TypingHolder::explicit(Typing::number())
            }
            _ if operator.is_comparison()
                && ((left.typing.is_number() && right.typing.is_number())
                    || (left.typing.is_string() && right.typing.is_string())) =>
            {
                TypingHolder::explicit(Typing::boolean())
            }
            _ => {
                self.report(errors::unknown_binary_op(
                    &left.typing.to_string(),
                    operator.as_str(),
                    &right.typing.to_string(),
                    index,
                ));
                TypingHolder::unknown()
            }
        };
        self.set_typing(id, typing);
    }

    pub(crate) fn analyze_unary_op(&mut self, id: ExprId) {
        walker::walk_children(self, id);
        let ExprKind::UnaryOp(op) = self.chunk.ast.kind(id) else {
            return;
        };
        let (operator, operand) = (op.operator, op.operand);
        let typing = match operator {
            OperatorId::Not => TypingHolder::explicit(Typing::boolean()),
            OperatorId::Len => TypingHolder::explicit(Typing::number()),
            OperatorId::Neg if self.scalar(operand).typing.is_number() => TypingHolder::explicit(Typing::number()),
            _ => TypingHolder::unknown(),
        };
        self.set_typing(id, typing);
    }

    /// `{ ... }`: an array when every entry is positional, otherwise a record of its string keys.
    pub(crate) fn analyze_table(&mut self, id: ExprId) {
        walker::walk_children(self, id);
        let ExprKind::Table(table) = self.chunk.ast.kind(id) else {
            return;
        };
        let entries = table.entries.clone();

        let typing = if !entries.is_empty() && entries.iter().all(|entry| entry.key.is_none()) {
            let elements: Vec<Typing> = entries
                .iter()
                .map(|entry| self.scalar(entry.value).typing.widened())
                .collect();
            Typing::array(Typing::union(elements))
        } else {
            let mut fields = BTreeMap::new();
            for entry in &entries {
                let Some(key) = entry.key else {
                    continue;
                };
                if let ExprKind::Constant(ConstantValue::String(name)) = self.chunk.ast.kind(key) {
                    fields.insert(name.clone(), self.scalar(entry.value).typing.widened());
                }
            }
            Typing::interface(None, fields)
        };
        self.set_typing(id, TypingHolder::explicit(typing));
    }
}

/// `and`/`or` pick an operand by the left side's truthiness.
fn logical(operator: OperatorId, left: TypingHolder, right: TypingHolder) -> TypingHolder {
    let is_and = operator == OperatorId::And;
    match left.typing.truthiness() {
        Truthiness::AlwaysFalsy => {
            if is_and {
                left
            } else {
                right
            }
        }
        Truthiness::AlwaysTruthy => {
            if is_and {
                right
            } else {
                left
            }
        }
        Truthiness::MaybeFalsy => TypingHolder::new(
            Typing::union([left.typing, right.typing]),
            left.explicit && right.explicit,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explicit(typing: Typing) -> TypingHolder {
        TypingHolder::explicit(typing)
    }

    #[test]
    fn test_logical_by_truthiness() {
        let nil = explicit(Typing::nil());
        let num = explicit(Typing::number());
        assert_eq!(logical(OperatorId::And, nil.clone(), num.clone()).typing, Typing::nil());
        assert_eq!(logical(OperatorId::Or, nil, num.clone()).typing, Typing::number());
        assert_eq!(logical(OperatorId::And, num.clone(), explicit(Typing::string())).typing, Typing::string());
        assert_eq!(logical(OperatorId::Or, num, explicit(Typing::string())).typing, Typing::number());
    }

    #[test]
    fn test_logical_maybe_falsy_unions() {
        let flag = explicit(Typing::boolean());
        let result = logical(OperatorId::Or, flag, explicit(Typing::number()));
        assert_eq!(result.typing, Typing::union([Typing::boolean(), Typing::number()]));
        assert!(result.explicit);
    }
}
