//! Rendering of anonymous nested structures.
//!
//! The resolver expands `x: { a: Integer; b: String }` into an
//! [`TypeState::Inline`] record whose members are fully resolved. How that
//! record ends up in a class body is a matter of strategy:
//!
//! - [`FlatInlineResolver`] emits `x_a` and `x_b`,
//! - [`StructuredInlineResolver`] emits `x` with a nested object type.

use indexmap::IndexMap;

use super::info::{TypeResolveInfo, TypeState};
use crate::config::InlineDeclarations;
use crate::emit::Buffer;
use crate::naming::{property_name, quote_string};

/// How properties are declared in the current context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyStyle {
    /// Prefix such as `declare `. Never applied to members inside a nested object type.
    pub modifier: &'static str,
    pub optional: bool,
}

impl PropertyStyle {
    pub fn separator(&self) -> &'static str {
        if self.optional {
            "?:"
        } else {
            ":"
        }
    }
}

/// `T | null` unless the value can never be null.
pub fn nullable(info: &TypeResolveInfo, type_name: &str) -> String {
    if info.not_null {
        type_name.to_string()
    } else {
        format!("{} | null", type_name)
    }
}

/// Single-line object type of an inline declaration, used wherever the
/// structure appears in a type position (arrays, parameters, return types).
pub fn render_object_type(members: &IndexMap<String, TypeResolveInfo>, optional: bool) -> String {
    if members.is_empty() {
        return "{}".to_string();
    }
    let separator = if optional { "?:" } else { ":" };
    let fields: Vec<String> = members
        .iter()
        .map(|(name, info)| format!("{}{} {}", property_name(name), separator, nullable(info, &info.type_name)))
        .collect();
    format!("{{ {} }}", fields.join("; "))
}

/// Strategy for printing inline declarations.
pub trait InlineDeclarationResolver: std::fmt::Debug {
    /// Writes property `name` into `buffer`. `type_name` is the already
    /// finished type of the property (key wrappers applied).
    fn print_property(
        &self,
        buffer: &mut Buffer,
        name: &str,
        type_name: &str,
        info: &TypeResolveInfo,
        style: PropertyStyle,
    );

    /// Indexed access into a property path, e.g. `['x']['a']`.
    fn member_access(&self, path: &[String]) -> String;
}

/// Creates the strategy selected by the configuration.
pub fn inline_resolver(mode: InlineDeclarations) -> Box<dyn InlineDeclarationResolver> {
    match mode {
        InlineDeclarations::Flat => Box::new(FlatInlineResolver),
        InlineDeclarations::Structured => Box::new(StructuredInlineResolver),
    }
}

fn print_plain(buffer: &mut Buffer, name: &str, type_name: &str, info: &TypeResolveInfo, style: PropertyStyle) {
    buffer.add(format!(
        "{}{}{} {};",
        style.modifier,
        property_name(name),
        style.separator(),
        nullable(info, type_name)
    ));
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FlatInlineResolver;

impl InlineDeclarationResolver for FlatInlineResolver {
    fn print_property(
        &self,
        buffer: &mut Buffer,
        name: &str,
        type_name: &str,
        info: &TypeResolveInfo,
        style: PropertyStyle,
    ) {
        match &info.state {
            TypeState::Inline { members } if !members.is_empty() => {
                for (member, member_info) in members {
                    let flat_name = format!("{}_{}", name, member);
                    self.print_property(buffer, &flat_name, &member_info.type_name, member_info, style);
                }
            }
            _ => print_plain(buffer, name, type_name, info, style),
        }
    }

    fn member_access(&self, path: &[String]) -> String {
        format!("[{}]", quote_string(&path.join("_")))
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredInlineResolver;

impl StructuredInlineResolver {
    fn print_members(&self, buffer: &mut Buffer, members: &IndexMap<String, TypeResolveInfo>, optional: bool) {
        let nested = PropertyStyle { modifier: "", optional };
        for (member, info) in members {
            self.print_property(buffer, member, &info.type_name, info, nested);
        }
    }
}

impl InlineDeclarationResolver for StructuredInlineResolver {
    fn print_property(
        &self,
        buffer: &mut Buffer,
        name: &str,
        type_name: &str,
        info: &TypeResolveInfo,
        style: PropertyStyle,
    ) {
        match &info.state {
            TypeState::Inline { members } if !members.is_empty() => {
                let close = if info.not_null { "};" } else { "} | null;" };
                buffer.add_block(
                    format!("{}{}{} {{", style.modifier, property_name(name), style.separator()),
                    |b| self.print_members(b, members, style.optional),
                    close,
                );
            }
            _ => print_plain(buffer, name, type_name, info, style),
        }
    }

    fn member_access(&self, path: &[String]) -> String {
        path.iter().map(|segment| format!("[{}]", quote_string(segment))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::Inflection;

    fn builtin(ts: &str, not_null: bool) -> TypeResolveInfo {
        TypeResolveInfo {
            state: TypeState::Builtin { ts_type: ts.into() },
            not_null,
            type_name: ts.into(),
            inflection: Inflection::uninflected(ts),
        }
    }

    fn inline(members: Vec<(&str, TypeResolveInfo)>) -> TypeResolveInfo {
        let members: IndexMap<String, TypeResolveInfo> =
            members.into_iter().map(|(n, i)| (n.to_string(), i)).collect();
        let rendered = render_object_type(&members, true);
        TypeResolveInfo {
            state: TypeState::Inline { members },
            not_null: false,
            type_name: rendered.clone(),
            inflection: Inflection::uninflected(&rendered),
        }
    }

    const DECLARE: PropertyStyle = PropertyStyle { modifier: "declare ", optional: true };

    #[test]
    fn flat_flattens_nested_members() {
        let x = inline(vec![
            ("a", builtin("number", false)),
            ("b", inline(vec![("c", builtin("string", true))])),
        ]);
        let mut buffer = Buffer::new();
        FlatInlineResolver.print_property(&mut buffer, "x", &x.type_name, &x, DECLARE);
        assert_eq!(
            buffer.lines(),
            &["declare x_a?: number | null;", "declare x_b_c?: string;"]
        );
    }

    #[test]
    fn structured_nests_members() {
        let x = inline(vec![("a", builtin("number", false)), ("b", builtin("string", false))]);
        let mut buffer = Buffer::new();
        StructuredInlineResolver.print_property(&mut buffer, "x", &x.type_name, &x, DECLARE);
        assert_eq!(
            buffer.join("\n"),
            "declare x?: {\n  a?: number | null;\n  b?: string | null;\n} | null;"
        );
    }

    #[test]
    fn required_properties_use_plain_separator() {
        let x = inline(vec![("a", builtin("number", false))]);
        let style = PropertyStyle { modifier: "", optional: false };
        let mut buffer = Buffer::new();
        StructuredInlineResolver.print_property(&mut buffer, "x", &x.type_name, &x, style);
        assert_eq!(buffer.lines()[0], "x: {");
        assert_eq!(buffer.lines()[1], "  a: number | null;");
    }

    #[test]
    fn empty_declarations_do_not_crash() {
        let empty = inline(vec![]);
        for strategy in [inline_resolver(InlineDeclarations::Flat), inline_resolver(InlineDeclarations::Structured)] {
            let mut buffer = Buffer::new();
            strategy.print_property(&mut buffer, "x", &empty.type_name, &empty, DECLARE);
            assert_eq!(buffer.lines(), &["declare x?: {} | null;"]);
        }
    }

    #[test]
    fn member_access_per_strategy() {
        let path = vec!["x".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(FlatInlineResolver.member_access(&path), "['x_a_b']");
        assert_eq!(StructuredInlineResolver.member_access(&path), "['x']['a']['b']");
    }

    #[test]
    fn renders_single_line_object_type() {
        let x = inline(vec![("a", builtin("number", true)), ("my-b", builtin("string", false))]);
        assert_eq!(x.type_name, "{ a?: number; 'my-b'?: string | null }");
    }
}
