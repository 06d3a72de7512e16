//! Help text.
//!
//! ```text
//! Usage: myapp [options] [arguments]
//!
//! OPTIONS
//!   --debug/-d/$DEBUG
//!       enable debug mode
//!   --port/-p/$PORT <int>  (default: 8080)
//!   --help/-h
//!       display this help message
//! ```
//!
//! Options are sorted by flag name and followed by `--help`. A word in single
//! quotes inside a field's help text names its value type; otherwise the type
//! is taken from the field's kind. Booleans show no type.

use crate::fields::Field;
use crate::value::Kind;

struct Row {
    flag: String,
    short: Option<char>,
    env: Option<String>,
    type_label: String,
    help: String,
    options: String,
}

/// Render usage text for `fields` under the program name `program`.
pub fn render(program: &str, fields: &[Field<'_>]) -> String {
    let mut sorted: Vec<&Field<'_>> = fields.iter().collect();
    sorted.sort_by(|a, b| a.flag_name().cmp(b.flag_name()));

    let mut rows: Vec<Row> = sorted.into_iter().map(row).collect();
    rows.push(Row {
        flag: "help".into(),
        short: Some('h'),
        env: None,
        type_label: String::new(),
        help: "display this help message".into(),
        options: String::new(),
    });

    // (first column, second column) per output line
    let mut lines: Vec<(String, String)> = Vec::new();
    for r in rows {
        let mut head = format!("  --{}", r.flag);
        if let Some(c) = r.short {
            head.push_str(&format!("/-{c}"));
        }
        if let Some(env) = &r.env {
            head.push_str(&format!("/${env}"));
        }
        head.push(' ');
        head.push_str(&r.type_label);
        lines.push((head, r.options));
        if !r.help.is_empty() {
            lines.push((format!("      {}", r.help), String::new()));
        }
    }

    let width = lines
        .iter()
        .map(|(head, _)| head.chars().count())
        .max()
        .unwrap_or(0)
        + 2;

    let mut out = format!("Usage: {program} [options] [arguments]\n\nOPTIONS\n");
    for (head, tail) in lines {
        let line = format!("{head:<width$}{tail}");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out.push('\n');
    out
}

fn row(field: &Field<'_>) -> Row {
    let (named, help) = quoted_type(field.options().help().unwrap_or_default());
    Row {
        flag: field.flag_name().to_string(),
        short: field.options().short(),
        env: Some(field.env_name().to_string()),
        type_label: type_label(field, named),
        help,
        options: option_summary(field),
    }
}

/// Pull the first single-quoted word out of `help`, dropping its quotes.
fn quoted_type(help: &str) -> (Option<String>, String) {
    let Some((before, rest)) = help.split_once('\'') else {
        return (None, help.to_string());
    };
    match rest.split_once('\'') {
        Some((name, after)) => (Some(name.to_string()), format!("{before}{name}{after}")),
        None => (None, help.to_string()),
    }
}

fn kind_name(kind: Kind) -> &'static str {
    match kind {
        Kind::Bool => "",
        Kind::Float => "float",
        Kind::Int => "int",
        Kind::Uint => "uint",
        Kind::Str => "string",
        Kind::Seq | Kind::Custom => "value",
    }
}

fn type_label(field: &Field<'_>, named: Option<String>) -> String {
    if field.kind() == Kind::Seq {
        let name = named
            .unwrap_or_else(|| kind_name(field.element_kind().unwrap_or(Kind::Custom)).into());
        return format!("<{name}>,[{name}...]");
    }
    if field.kind() == Kind::Bool {
        return String::new();
    }
    let name = named.unwrap_or_else(|| kind_name(field.kind()).into());
    if name.is_empty() {
        String::new()
    } else {
        format!("<{name}>")
    }
}

fn option_summary(field: &Field<'_>) -> String {
    let options = field.options();
    let mut parts = Vec::new();
    if options.required() {
        parts.push("required".to_string());
    }
    if options.no_print() {
        parts.push("noprint".to_string());
    }
    if let Some(default) = options.default_value() {
        parts.push(format!("default: {default}"));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("({})", parts.join(","))
    }
}
