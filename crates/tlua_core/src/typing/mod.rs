//! Structural type model.
//!
//! A [`Typing`] is an immutable value describing what a tlua expression may evaluate to. Typings are compared
//! structurally through [`Typing::can_cast_from`], queried for members through [`Typing::field`], and rendered to
//! a canonical string through `Display`.
//!
//! ## Notes
//! - Composite payloads are shared via `Rc`, so cloning a typing is cheap and never deep-copies an interface or
//!   function signature.
//! - Constructors normalize: [`Typing::union`] flattens nested unions, drops duplicates, collapses a union of one
//!   to its member, and absorbs everything into `any` when `any` is a member.
//! - A [`TypingHolder`] pairs a typing with an `explicit` flag: `true` when it came from an annotation or is
//!   otherwise certain (literals, call results), `false` when it was guessed.

mod cast;
mod display;
mod fields;

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::constant::ConstantValue;

pub use fields::FieldKey;

/// A structural type.
#[derive(Debug, Clone, PartialEq)]
pub enum Typing {
    /// Dynamic top type: casts to and from everything.
    Any,
    /// Nominal class (`number`, `string`, `boolean`, or a declared class).
    Class(Rc<ClassTyping>),
    /// A single literal value (`nil`, `true`, `false`, `1`, `"a"`).
    Constant(ConstantValue),
    /// Homogeneous sequence.
    Array(Box<Typing>),
    /// Fixed sequence of values; the last element may be a [`Typing::Vararg`].
    Tuple(Vec<Typing>),
    /// Repeated tail of values.
    Vararg(Box<Typing>),
    /// Accepts whatever any member accepts.
    Union(Vec<Typing>),
    /// Accepts only what every member accepts.
    Intersection(Vec<Typing>),
    /// Structural record of named fields.
    Interface(Rc<InterfaceTyping>),
    /// Named, transparent reference to another typing.
    Alias(Rc<AliasTyping>),
    /// Callable signature.
    Function(Rc<FunctionTyping>),
}

/// Payload of [`Typing::Class`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassTyping {
    pub name: String,
    /// Instance fields.
    pub fields: BTreeMap<String, Typing>,
    /// Fields reachable on the class value itself.
    pub class_fields: BTreeMap<String, Typing>,
}

/// Payload of [`Typing::Interface`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InterfaceTyping {
    pub name: Option<String>,
    pub fields: BTreeMap<String, Typing>,
}

/// Payload of [`Typing::Alias`].
#[derive(Debug, Clone, PartialEq)]
pub struct AliasTyping {
    pub name: String,
    pub target: Typing,
}

/// A named function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub typing: TypingHolder,
}

impl Parameter {
    pub fn new(name: impl Into<String>, typing: TypingHolder) -> Self {
        Self {
            name: name.into(),
            typing,
        }
    }
}

/// Payload of [`Typing::Function`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionTyping {
    pub parameters: Vec<Parameter>,
    /// Element typing of the trailing `...` parameter, if the function is variadic.
    pub vararg: Option<Typing>,
    /// Return tuple elements (the last one may be a [`Typing::Vararg`]).
    pub returns: Vec<Typing>,
}

impl FunctionTyping {
    /// The return values as a [`Typing::Tuple`].
    pub fn returns_tuple(&self) -> Typing {
        Typing::Tuple(self.returns.clone())
    }
}

/// A typing plus whether it is certain.
#[derive(Debug, Clone, PartialEq)]
pub struct TypingHolder {
    pub typing: Typing,
    pub explicit: bool,
}

impl TypingHolder {
    pub fn new(typing: Typing, explicit: bool) -> Self {
        Self { typing, explicit }
    }

    /// A typing that came from an annotation or is otherwise certain.
    pub fn explicit(typing: Typing) -> Self {
        Self::new(typing, true)
    }

    /// A typing the analyzer had to guess.
    pub fn implicit(typing: Typing) -> Self {
        Self::new(typing, false)
    }

    /// The non-explicit `any` every unresolved expression falls back to.
    pub fn unknown() -> Self {
        Self::implicit(Typing::Any)
    }
}

/// How an expression behaves in a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truthiness {
    AlwaysFalsy,
    MaybeFalsy,
    AlwaysTruthy,
}

impl Typing {
    // ========================================================================
    // Constructors
    // ========================================================================

    pub fn class(name: impl Into<String>) -> Typing {
        Typing::Class(Rc::new(ClassTyping {
            name: name.into(),
            ..ClassTyping::default()
        }))
    }

    pub fn number() -> Typing {
        Typing::class("number")
    }

    pub fn string() -> Typing {
        Typing::class("string")
    }

    pub fn boolean() -> Typing {
        Typing::class("boolean")
    }

    pub fn nil() -> Typing {
        Typing::Constant(ConstantValue::Nil)
    }

    pub fn constant_bool(value: bool) -> Typing {
        Typing::Constant(ConstantValue::Boolean(value))
    }

    pub fn array(element: Typing) -> Typing {
        Typing::Array(Box::new(element))
    }

    pub fn vararg(element: Typing) -> Typing {
        Typing::Vararg(Box::new(element))
    }

    pub fn interface(name: Option<String>, fields: BTreeMap<String, Typing>) -> Typing {
        Typing::Interface(Rc::new(InterfaceTyping { name, fields }))
    }

    pub fn alias(name: impl Into<String>, target: Typing) -> Typing {
        Typing::Alias(Rc::new(AliasTyping {
            name: name.into(),
            target,
        }))
    }

    pub fn function(function: FunctionTyping) -> Typing {
        Typing::Function(Rc::new(function))
    }

    /// Build a normalized union.
    ///
    /// ## Notes
    /// - Nested unions are flattened and duplicates dropped (first occurrence wins, order is preserved).
    /// - A union containing `any` is `any`; a union of one member is that member.
    pub fn union(members: impl IntoIterator<Item = Typing>) -> Typing {
        let mut flat: Vec<Typing> = Vec::new();
        for member in members {
            match member {
                Typing::Any => return Typing::Any,
                Typing::Union(inner) => {
                    for m in inner {
                        push_unique(&mut flat, m);
                    }
                }
                other => push_unique(&mut flat, other),
            }
        }
        if flat.len() == 1 {
            flat.pop().unwrap_or(Typing::Any)
        } else {
            Typing::Union(flat)
        }
    }

    /// Build a normalized intersection (flattened, deduplicated, one member collapses).
    pub fn intersection(members: impl IntoIterator<Item = Typing>) -> Typing {
        let mut flat: Vec<Typing> = Vec::new();
        for member in members {
            match member {
                Typing::Intersection(inner) => {
                    for m in inner {
                        push_unique(&mut flat, m);
                    }
                }
                other => push_unique(&mut flat, other),
            }
        }
        if flat.len() == 1 {
            flat.pop().unwrap_or(Typing::Any)
        } else {
            Typing::Intersection(flat)
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Follow alias links down to the first non-alias typing.
    pub fn resolved(&self) -> &Typing {
        let mut current = self;
        while let Typing::Alias(alias) = current {
            current = &alias.target;
        }
        current
    }

    /// Reduce a multi-value typing down to the single value it yields in a scalar position.
    ///
    /// ## Notes
    /// - A tuple yields its first element (or `nil` when empty); a vararg yields its element typing.
    /// - A union of one member yields the member.
    pub fn collapse(&self) -> Typing {
        match self {
            Typing::Tuple(elements) => match elements.first() {
                Some(first) => first.collapse(),
                None => Typing::nil(),
            },
            Typing::Vararg(element) => element.collapse(),
            Typing::Union(members) if members.len() == 1 => members[0].collapse(),
            other => other.clone(),
        }
    }

    /// Whether the typing is the class or a literal of the given primitive kind.
    pub fn is_class_named(&self, name: &str) -> bool {
        matches!(self.resolved(), Typing::Class(c) if c.name == name)
    }

    pub fn is_number(&self) -> bool {
        match self.resolved() {
            Typing::Constant(ConstantValue::Number(_)) => true,
            other => other.is_class_named("number"),
        }
    }

    pub fn is_string(&self) -> bool {
        match self.resolved() {
            Typing::Constant(ConstantValue::String(_)) => true,
            other => other.is_class_named("string"),
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self.resolved(), Typing::Any)
    }

    /// Classify how the value behaves in a condition.
    pub fn truthiness(&self) -> Truthiness {
        match self.resolved() {
            Typing::Constant(value) if value.is_falsy() => Truthiness::AlwaysFalsy,
            Typing::Constant(_) => Truthiness::AlwaysTruthy,
            Typing::Any => Truthiness::MaybeFalsy,
            Typing::Class(c) if c.name == "boolean" => Truthiness::MaybeFalsy,
            Typing::Tuple(_) | Typing::Vararg(_) => self.collapse().truthiness(),
            Typing::Union(members) | Typing::Intersection(members) => {
                let mut kinds = members.iter().map(Typing::truthiness);
                let Some(first) = kinds.next() else {
                    return Truthiness::AlwaysTruthy;
                };
                if kinds.all(|k| k == first) { first } else { Truthiness::MaybeFalsy }
            }
            _ => Truthiness::AlwaysTruthy,
        }
    }

    /// Widen literal typings for a freshly inferred variable.
    ///
    /// ## Notes
    /// - `true`/`false` widen to `boolean`; `nil` carries no information and widens to `any`.
    /// - Everything else is returned unchanged.
    pub fn widened(&self) -> Typing {
        match self {
            Typing::Constant(ConstantValue::Boolean(_)) => Typing::boolean(),
            Typing::Constant(ConstantValue::Nil) => Typing::Any,
            other => other.clone(),
        }
    }

    /// View the typing as tuple elements (a scalar is a tuple of one).
    pub fn tuple_elements(&self) -> Vec<Typing> {
        match self.resolved() {
            Typing::Tuple(elements) => elements.clone(),
            other => vec![other.clone()],
        }
    }
}

/// Split a tuple's elements into the fixed prefix and the trailing vararg element typing.
pub fn split_vararg(elements: &[Typing]) -> (&[Typing], Option<&Typing>) {
    match elements.split_last() {
        Some((Typing::Vararg(element), fixed)) => (fixed, Some(element.as_ref())),
        _ => (elements, None),
    }
}

fn push_unique(flat: &mut Vec<Typing>, typing: Typing) {
    if !flat.contains(&typing) {
        flat.push(typing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_normalization() {
        let u = Typing::union([Typing::number(), Typing::union([Typing::string(), Typing::number()])]);
        assert_eq!(u, Typing::Union(vec![Typing::number(), Typing::string()]));
        assert_eq!(Typing::union([Typing::number()]), Typing::number());
        assert_eq!(Typing::union([Typing::number(), Typing::Any]), Typing::Any);
    }

    #[test]
    fn test_collapse() {
        let t = Typing::Tuple(vec![Typing::string(), Typing::number()]);
        assert_eq!(t.collapse(), Typing::string());
        assert_eq!(Typing::Tuple(vec![]).collapse(), Typing::nil());
        assert_eq!(Typing::vararg(Typing::number()).collapse(), Typing::number());
    }

    #[test]
    fn test_truthiness() {
        assert_eq!(Typing::nil().truthiness(), Truthiness::AlwaysFalsy);
        assert_eq!(Typing::constant_bool(false).truthiness(), Truthiness::AlwaysFalsy);
        assert_eq!(Typing::number().truthiness(), Truthiness::AlwaysTruthy);
        assert_eq!(Typing::boolean().truthiness(), Truthiness::MaybeFalsy);
        assert_eq!(Typing::Any.truthiness(), Truthiness::MaybeFalsy);
        let optional = Typing::union([Typing::string(), Typing::nil()]);
        assert_eq!(optional.truthiness(), Truthiness::MaybeFalsy);
    }

    #[test]
    fn test_widened() {
        assert_eq!(Typing::constant_bool(true).widened(), Typing::boolean());
        assert_eq!(Typing::nil().widened(), Typing::Any);
        assert_eq!(Typing::number().widened(), Typing::number());
    }

    #[test]
    fn test_split_vararg() {
        let elements = vec![Typing::number(), Typing::vararg(Typing::string())];
        let (fixed, tail) = split_vararg(&elements);
        assert_eq!(fixed, &[Typing::number()]);
        assert_eq!(tail, Some(&Typing::string()));
    }
}
