use crate::source::ValueStringifier;
use fieldsuggest_protocol::{CompositeValue, FieldValue, Link, LinkKind};

/// Builds the `field:: value` suggestion for one scalar item of a field.
///
/// File links are rendered as `[[base-name]]` or `[[base-name|display]]`;
/// every other non-scalar goes through `stringifier`.
pub fn format_composite<S>(field: &str, value: &FieldValue, stringifier: &S) -> CompositeValue
where
    S: ValueStringifier + ?Sized,
{
    let text = match value {
        FieldValue::Text(text) => text.clone(),
        FieldValue::Number(number) => format_number(*number),
        FieldValue::Boolean(flag) => flag.to_string(),
        FieldValue::Link(link) if link.kind == LinkKind::File => wiki_reference(link),
        other => stringifier.stringify(other),
    };
    CompositeValue::new(field, &text)
}

fn wiki_reference(link: &Link) -> String {
    match &link.display {
        Some(display) => format!("[[{}|{display}]]", link.base_name()),
        None => format!("[[{}]]", link.base_name()),
    }
}

/// Shortest round-trip decimal, switching to exponent form (`1e+21`,
/// `1.5e-7`) outside `[1e-6, 1e21)`. Integral values print without a
/// fractional part.
pub(crate) fn format_number(number: f64) -> String {
    if number.is_infinite() {
        return if number > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if number == 0.0 {
        return "0".to_string();
    }
    let magnitude = number.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{number:e}");
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        };
    }
    number.to_string()
}

/// Markdown-flavoured default rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStringifier;

impl DefaultStringifier {
    fn link(link: &Link) -> String {
        let embed = if link.embed { "!" } else { "" };
        let target = match (link.kind, &link.subpath) {
            (LinkKind::Header, Some(subpath)) => format!("{}#{subpath}", link.path),
            (LinkKind::Block, Some(subpath)) => format!("{}#^{subpath}", link.path),
            _ => link.path.clone(),
        };
        let display = match (&link.display, link.kind, &link.subpath) {
            (Some(display), _, _) => display.clone(),
            (None, LinkKind::File, _) | (None, _, None) => link.base_name().to_string(),
            (None, _, Some(subpath)) => format!("{} > {subpath}", link.base_name()),
        };
        format!("{embed}[[{target}|{display}]]")
    }
}

impl ValueStringifier for DefaultStringifier {
    fn stringify(&self, value: &FieldValue) -> String {
        match value {
            FieldValue::Null => "-".to_string(),
            FieldValue::Text(text) => text.clone(),
            FieldValue::Number(number) => format_number(*number),
            FieldValue::Boolean(flag) => flag.to_string(),
            FieldValue::Link(link) => Self::link(link),
            FieldValue::List(items) => items
                .iter()
                .map(|item| self.stringify(item))
                .collect::<Vec<_>>()
                .join(", "),
            FieldValue::Object(entries) => {
                if entries.is_empty() {
                    return "{}".to_string();
                }
                let inner = entries
                    .iter()
                    .map(|(key, item)| format!("{key}: {}", self.stringify(item)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{ {inner} }}")
            }
        }
    }
}
