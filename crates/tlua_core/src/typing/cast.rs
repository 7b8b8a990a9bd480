//! Assignability between typings.
//!
//! ## Notes
//! - `any` is accepted by and accepts everything.
//! - Aliases are unwrapped on both sides before any rule applies.
//! - A union source casts only when every member casts; an intersection source casts when some member does.
//! - Tuples use a positional prefix rule: a missing source element reads as `nil`, surplus source elements are
//!   checked against the target's trailing vararg if it has one and ignored otherwise.

use crate::constant::ConstantValue;

use super::{FunctionTyping, Typing, split_vararg};

impl Typing {
    /// Whether a value of typing `other` may be stored where `self` is expected.
    pub fn can_cast_from(&self, other: &Typing) -> bool {
        let target = self.resolved();
        let source = other.resolved();

        if matches!(target, Typing::Any) || matches!(source, Typing::Any) {
            return true;
        }

        match (target, source) {
            (_, Typing::Union(members)) => members.iter().all(|m| target.can_cast_from(m)),
            (Typing::Tuple(targets), _) => cast_tuple(targets, &source.tuple_elements()),
            (_, Typing::Tuple(_)) => target.can_cast_from(&source.collapse()),
            (Typing::Union(members), _) => members.iter().any(|m| m.can_cast_from(source)),
            (Typing::Intersection(members), _) => members.iter().all(|m| m.can_cast_from(source)),
            (_, Typing::Intersection(members)) => members.iter().any(|m| target.can_cast_from(m)),
            (Typing::Vararg(t), Typing::Vararg(s)) => t.can_cast_from(s),
            (Typing::Vararg(t), _) => t.can_cast_from(source),
            (_, Typing::Vararg(s)) => target.can_cast_from(s),
            (Typing::Class(t), Typing::Class(s)) => t.name == s.name,
            (Typing::Class(t), Typing::Constant(value)) => primitive_accepts(&t.name, value),
            (Typing::Constant(t), Typing::Constant(s)) => t == s,
            (Typing::Array(t), Typing::Array(s)) => t.can_cast_from(s),
            (Typing::Array(_), Typing::Interface(s)) => s.fields.is_empty(),
            (Typing::Interface(t), Typing::Interface(s)) => {
                fields_accept(t.fields.iter(), |name| s.fields.get(name))
            }
            (Typing::Interface(t), Typing::Class(s)) if !is_primitive(&s.name) => {
                fields_accept(t.fields.iter(), |name| s.fields.get(name))
            }
            (Typing::Function(t), Typing::Function(c)) => t.accepts(c),
            _ => false,
        }
    }
}

impl FunctionTyping {
    /// Whether a function of signature `candidate` may be stored where `self` is expected.
    ///
    /// ## Notes
    /// - Parameters are compared position by position as `self.param.can_cast_from(candidate.param)`; a position
    ///   the candidate does not declare is supplied by the candidate's vararg, if any.
    /// - Surplus candidate parameters must fit this signature's vararg when it has one.
    /// - This signature's return tuple must accept the candidate's return tuple.
    pub fn accepts(&self, candidate: &FunctionTyping) -> bool {
        for (i, param) in self.parameters.iter().enumerate() {
            let supplied = candidate
                .parameters
                .get(i)
                .map(|p| &p.typing.typing)
                .or(candidate.vararg.as_ref());
            if let Some(supplied) = supplied {
                if !param.typing.typing.can_cast_from(supplied) {
                    return false;
                }
            }
        }

        if let Some(vararg) = &self.vararg {
            let surplus = candidate.parameters.iter().skip(self.parameters.len());
            for param in surplus {
                if !vararg.can_cast_from(&param.typing.typing) {
                    return false;
                }
            }
            if let Some(candidate_vararg) = &candidate.vararg {
                if !vararg.can_cast_from(candidate_vararg) {
                    return false;
                }
            }
        }

        cast_tuple(&self.returns, &candidate.returns)
    }
}

/// Positional prefix cast of `source` tuple elements into `target` tuple elements.
pub(crate) fn cast_tuple(target: &[Typing], source: &[Typing]) -> bool {
    let (target_fixed, target_vararg) = split_vararg(target);
    let (source_fixed, source_vararg) = split_vararg(source);
    let nil = Typing::nil();

    for (i, expected) in target_fixed.iter().enumerate() {
        let actual = source_fixed.get(i).or(source_vararg).unwrap_or(&nil);
        if !expected.can_cast_from(actual) {
            return false;
        }
    }

    if let Some(expected) = target_vararg {
        if !source_fixed
            .iter()
            .skip(target_fixed.len())
            .all(|actual| expected.can_cast_from(actual))
        {
            return false;
        }
        if let Some(actual) = source_vararg {
            return expected.can_cast_from(actual);
        }
    }

    true
}

fn primitive_accepts(class: &str, value: &ConstantValue) -> bool {
    matches!(
        (class, value),
        ("boolean", ConstantValue::Boolean(_)) | ("number", ConstantValue::Number(_)) | ("string", ConstantValue::String(_))
    )
}

fn is_primitive(class: &str) -> bool {
    matches!(class, "boolean" | "number" | "string")
}

fn fields_accept<'a>(
    mut expected: impl Iterator<Item = (&'a String, &'a Typing)>,
    actual: impl Fn(&str) -> Option<&'a Typing>,
) -> bool {
    let nil = Typing::nil();
    expected.all(|(name, typing)| typing.can_cast_from(actual(name).unwrap_or(&nil)))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::typing::{Parameter, TypingHolder};

    fn func(params: &[Typing], vararg: Option<Typing>, returns: &[Typing]) -> FunctionTyping {
        FunctionTyping {
            parameters: params
                .iter()
                .enumerate()
                .map(|(i, t)| Parameter::new(format!("p{i}"), TypingHolder::explicit(t.clone())))
                .collect(),
            vararg,
            returns: returns.to_vec(),
        }
    }

    #[test]
    fn test_any_both_directions() {
        assert!(Typing::Any.can_cast_from(&Typing::number()));
        assert!(Typing::number().can_cast_from(&Typing::Any));
    }

    #[test]
    fn test_classes_are_nominal() {
        assert!(Typing::number().can_cast_from(&Typing::number()));
        assert!(!Typing::number().can_cast_from(&Typing::string()));
        assert!(Typing::boolean().can_cast_from(&Typing::constant_bool(true)));
        assert!(!Typing::string().can_cast_from(&Typing::nil()));
    }

    #[test]
    fn test_constants_compare_by_value() {
        assert!(Typing::nil().can_cast_from(&Typing::nil()));
        assert!(!Typing::constant_bool(true).can_cast_from(&Typing::constant_bool(false)));
        let a = Typing::Constant(ConstantValue::String("a".into()));
        assert!(a.can_cast_from(&Typing::Constant(ConstantValue::String("a".into()))));
        assert!(!a.can_cast_from(&Typing::string()));
    }

    #[test]
    fn test_union_accepts_any_member() {
        let u = Typing::union([Typing::number(), Typing::string()]);
        assert!(u.can_cast_from(&Typing::number()));
        assert!(u.can_cast_from(&Typing::string()));
        assert!(!u.can_cast_from(&Typing::boolean()));
        assert!(u.can_cast_from(&u));
    }

    #[test]
    fn test_union_source_needs_every_member() {
        let u = Typing::union([Typing::number(), Typing::nil()]);
        assert!(!Typing::number().can_cast_from(&u));
    }

    #[test]
    fn test_intersection_needs_every_member() {
        let mut a = BTreeMap::new();
        a.insert("x".to_string(), Typing::number());
        let mut b = BTreeMap::new();
        b.insert("y".to_string(), Typing::string());
        let both = Typing::intersection([Typing::interface(None, a.clone()), Typing::interface(None, b)]);

        let mut full = a.clone();
        full.insert("y".to_string(), Typing::string());
        assert!(both.can_cast_from(&Typing::interface(None, full)));
        assert!(!both.can_cast_from(&Typing::interface(None, a)));
    }

    #[test]
    fn test_interface_fields_default_to_nil() {
        let mut optional = BTreeMap::new();
        optional.insert("name".to_string(), Typing::union([Typing::string(), Typing::nil()]));
        let target = Typing::interface(None, optional);
        assert!(target.can_cast_from(&Typing::interface(None, BTreeMap::new())));
        assert!(!target.can_cast_from(&Typing::number()));
    }

    #[test]
    fn test_tuple_prefix_rule() {
        let target = Typing::Tuple(vec![Typing::number()]);
        let source = Typing::Tuple(vec![Typing::number(), Typing::string()]);
        assert!(target.can_cast_from(&source));

        let with_tail = Typing::Tuple(vec![Typing::number(), Typing::vararg(Typing::string())]);
        assert!(with_tail.can_cast_from(&Typing::Tuple(vec![
            Typing::number(),
            Typing::string(),
            Typing::string()
        ])));
        assert!(!with_tail.can_cast_from(&Typing::Tuple(vec![Typing::number(), Typing::number()])));
    }

    #[test]
    fn test_tuple_missing_elements_read_as_nil() {
        let target = Typing::Tuple(vec![Typing::number(), Typing::string()]);
        assert!(!target.can_cast_from(&Typing::Tuple(vec![Typing::number()])));
        let optional = Typing::Tuple(vec![Typing::number(), Typing::union([Typing::string(), Typing::nil()])]);
        assert!(optional.can_cast_from(&Typing::Tuple(vec![Typing::number()])));
    }

    #[test]
    fn test_scalar_and_tuple_coerce_through_first_element() {
        assert!(Typing::number().can_cast_from(&Typing::Tuple(vec![Typing::number(), Typing::string()])));
        assert!(Typing::Tuple(vec![Typing::number()]).can_cast_from(&Typing::number()));
    }

    #[test]
    fn test_array_accepts_empty_table() {
        let target = Typing::array(Typing::number());
        assert!(target.can_cast_from(&Typing::interface(None, BTreeMap::new())));
        assert!(target.can_cast_from(&Typing::array(Typing::number())));
        assert!(!target.can_cast_from(&Typing::array(Typing::string())));
    }

    #[test]
    fn test_alias_is_transparent() {
        let id = Typing::alias("Id", Typing::number());
        assert!(id.can_cast_from(&Typing::number()));
        assert!(Typing::number().can_cast_from(&id));
    }

    #[test]
    fn test_function_parameters_compare_positionally() {
        let target = Typing::function(func(&[Typing::number()], None, &[Typing::string()]));
        let same = Typing::function(func(&[Typing::number()], None, &[Typing::string()]));
        let wrong_return = Typing::function(func(&[Typing::number()], None, &[Typing::number()]));
        let wrong_param = Typing::function(func(&[Typing::string()], None, &[Typing::string()]));
        assert!(target.can_cast_from(&same));
        assert!(!target.can_cast_from(&wrong_return));
        assert!(!target.can_cast_from(&wrong_param));
    }

    #[test]
    fn test_function_candidate_vararg_supplies_missing_parameters() {
        let target = func(&[Typing::number(), Typing::number()], None, &[]);
        let variadic = func(&[Typing::number()], Some(Typing::number()), &[]);
        let variadic_strings = func(&[Typing::number()], Some(Typing::string()), &[]);
        assert!(target.accepts(&variadic));
        assert!(!target.accepts(&variadic_strings));
    }
}
