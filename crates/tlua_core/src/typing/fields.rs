//! Structural member lookup.

use std::collections::BTreeMap;

use crate::constant::ConstantValue;

use super::Typing;

/// The key of a member access.
#[derive(Debug, Clone, Copy)]
pub enum FieldKey<'a> {
    /// A constant string key (`t.name`, `t["name"]`, `t:name()`).
    Name(&'a str),
    /// Any other key, described by its typing (`t[i]`).
    Typing(&'a Typing),
}

impl FieldKey<'_> {
    fn is_numeric(&self) -> bool {
        match self {
            FieldKey::Name(_) => false,
            FieldKey::Typing(t) => t.is_number(),
        }
    }
}

impl Typing {
    /// Look up the typing of a member.
    ///
    /// ## Returns
    /// - `Some(typing)` when the member is known.
    /// - `None` when this typing has no such member (or has no members at all).
    ///
    /// ## Notes
    /// - Interfaces and classes answer constant string keys; a `string`-typed key on a record answers the union of
    ///   all its field typings.
    /// - Unions and intersections look the key up in every member and recombine the hits with the same
    ///   combinator.
    /// - Arrays and varargs answer numeric keys with their element typing.
    pub fn field(&self, key: FieldKey<'_>) -> Option<Typing> {
        match self {
            Typing::Alias(alias) => alias.target.field(key),
            Typing::Interface(interface) => record_field(&interface.fields, None, key),
            Typing::Class(class) => record_field(&class.fields, Some(&class.class_fields), key),
            Typing::Union(members) => {
                let hits: Vec<Typing> = members.iter().filter_map(|m| m.field(key)).collect();
                (!hits.is_empty()).then(|| Typing::union(hits))
            }
            Typing::Intersection(members) => {
                let hits: Vec<Typing> = members.iter().filter_map(|m| m.field(key)).collect();
                (!hits.is_empty()).then(|| Typing::intersection(hits))
            }
            Typing::Array(element) | Typing::Vararg(element) => key.is_numeric().then(|| element.as_ref().clone()),
            _ => None,
        }
    }
}

fn record_field(
    fields: &BTreeMap<String, Typing>,
    class_fields: Option<&BTreeMap<String, Typing>>,
    key: FieldKey<'_>,
) -> Option<Typing> {
    let by_name = |name: &str| {
        fields
            .get(name)
            .or_else(|| class_fields.and_then(|extra| extra.get(name)))
            .cloned()
    };
    match key {
        FieldKey::Name(name) => by_name(name),
        FieldKey::Typing(typing) => match typing.resolved() {
            Typing::Constant(ConstantValue::String(name)) => by_name(name),
            other if other.is_class_named("string") => {
                (!fields.is_empty()).then(|| Typing::union(fields.values().cloned()))
            }
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> Typing {
        let mut fields = BTreeMap::new();
        fields.insert("x".to_string(), Typing::number());
        fields.insert("label".to_string(), Typing::string());
        Typing::interface(Some("Point".to_string()), fields)
    }

    #[test]
    fn test_interface_by_name() {
        assert_eq!(point().field(FieldKey::Name("x")), Some(Typing::number()));
        assert_eq!(point().field(FieldKey::Name("y")), None);
    }

    #[test]
    fn test_string_key_yields_union_of_fields() {
        let string = Typing::string();
        let hit = point().field(FieldKey::Typing(&string));
        assert_eq!(hit, Some(Typing::union([Typing::string(), Typing::number()])));
    }

    #[test]
    fn test_constant_string_key() {
        let key = Typing::Constant(ConstantValue::String("label".into()));
        assert_eq!(point().field(FieldKey::Typing(&key)), Some(Typing::string()));
    }

    #[test]
    fn test_array_answers_numeric_keys() {
        let list = Typing::array(Typing::string());
        let number = Typing::number();
        assert_eq!(list.field(FieldKey::Typing(&number)), Some(Typing::string()));
        assert_eq!(list.field(FieldKey::Name("length")), None);
    }

    #[test]
    fn test_union_recombines_hits() {
        let mut other = BTreeMap::new();
        other.insert("x".to_string(), Typing::string());
        let either = Typing::union([point(), Typing::interface(None, other)]);
        assert_eq!(
            either.field(FieldKey::Name("x")),
            Some(Typing::union([Typing::number(), Typing::string()]))
        );
    }

    #[test]
    fn test_intersection_recombines_hits() {
        let mut named = BTreeMap::new();
        named.insert("name".to_string(), Typing::string());
        named.insert("x".to_string(), Typing::string());
        let both = Typing::intersection([point(), Typing::interface(None, named)]);
        assert_eq!(both.field(FieldKey::Name("label")), Some(Typing::string()));
        assert_eq!(both.field(FieldKey::Name("name")), Some(Typing::string()));
        assert_eq!(
            both.field(FieldKey::Name("x")),
            Some(Typing::intersection([Typing::number(), Typing::string()]))
        );
        assert_eq!(both.field(FieldKey::Name("z")), None);
    }

    #[test]
    fn test_alias_forwards() {
        let alias = Typing::alias("P", point());
        assert_eq!(alias.field(FieldKey::Name("x")), Some(Typing::number()));
        assert_eq!(Typing::number().field(FieldKey::Name("x")), None);
    }
}
