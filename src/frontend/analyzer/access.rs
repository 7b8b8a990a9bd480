//! Member access (`t.name`, `t[key]`, and the `t:name` part of a method declaration).

use tlua_core::{ConstantValue, FieldKey, Typing, TypingHolder};
use tlua_syntax::ast::{ExprId, ExprKind, Member};
use tlua_syntax::walker;

use super::Analyzer;

impl Analyzer<'_> {
    pub(crate) fn analyze_field(&mut self, id: ExprId) {
        walker::walk_children(self, id);
        let ExprKind::Field(field) = self.chunk.ast.kind(id) else {
            return;
        };
        let base = self.scalar(field.base);
        let found = match &field.member {
            Member::Name(name) => base.typing.field(FieldKey::Name(name)),
            Member::Index(key) => {
                let key = self.scalar(*key).typing;
                match &key {
                    Typing::Constant(ConstantValue::String(name)) => base.typing.field(FieldKey::Name(name)),
                    other => base.typing.field(FieldKey::Typing(other)),
                }
            }
        };
        self.set_member_typing(id, &base, found);
    }

    pub(crate) fn analyze_method(&mut self, id: ExprId) {
        walker::walk_children(self, id);
        let ExprKind::Method(method) = self.chunk.ast.kind(id) else {
            return;
        };
        let base = self.scalar(method.base);
        let found = base.typing.field(FieldKey::Name(&method.name));
        self.set_member_typing(id, &base, found);
    }

    /// A missing member is `any` without a finding; whoever uses it reports.
    fn set_member_typing(&mut self, id: ExprId, base: &TypingHolder, found: Option<Typing>) {
        let typing = match found {
            Some(typing) => TypingHolder::new(typing, base.explicit),
            None => TypingHolder::unknown(),
        };
        self.set_typing(id, typing);
    }
}
