use std::{
    fmt::Display,
    io::Write,
    sync::{LazyLock, RwLock},
};

use nu_ansi_term::Color;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{themes::BorderCorrection, Panel, Style},
};
use tracing::info;
use vitrine_core::{error::ErrorContext, CoreError, CoreResult};

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));
pub static JSON: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(false));

pub fn json_enabled() -> bool {
    JSON.read().map(|json| *json).unwrap_or(false)
}

pub fn interactive_ask(ques: &str) -> CoreResult<String> {
    print!("{ques}");

    std::io::stdout()
        .flush()
        .with_context(|| "flushing stdout stream".to_string())?;

    let mut response = String::new();
    std::io::stdin()
        .read_line(&mut response)
        .with_context(|| "reading input from stdin".to_string())?;

    Ok(response.trim().to_owned())
}

/// Uses `value` when given, otherwise asks for it.
pub fn value_or_ask(value: Option<String>, ques: &str) -> CoreResult<String> {
    match value {
        Some(value) => Ok(value),
        None => interactive_ask(ques),
    }
}

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let color = COLOR.read().map(|color| *color).unwrap_or(true);
        if color {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> CoreResult<()> {
    let output = serde_json::to_string_pretty(value)
        .map_err(|err| CoreError::Custom(format!("serializing output: {err}")))?;
    println!("{output}");
    Ok(())
}

pub fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

/// Renders rows under a header line, with a title panel.
pub fn print_table<const N: usize>(title: &str, header: [&str; N], rows: Vec<[String; N]>) {
    if rows.is_empty() {
        info!("No {} found", title.to_lowercase());
        return;
    }

    let count = rows.len();
    let mut builder = Builder::new();
    builder.push_record(header.map(String::from));
    for row in rows {
        builder.push_record(row);
    }

    let table = builder
        .build()
        .with(Panel::header(format!("{title} ({count})")))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();

    info!("\n{table}");
}

/// Renders `label: value` pairs as a two-column table.
pub fn print_record(title: &str, fields: Vec<(&str, String)>) {
    let mut builder = Builder::new();
    for (label, value) in fields {
        builder.push_record([label.to_string(), value]);
    }

    let table = builder
        .build()
        .with(Panel::header(title))
        .with(Style::rounded())
        .with(BorderCorrection {})
        .to_string();

    info!("\n{table}");
}

#[cfg(test)]
mod tests {
    use nu_ansi_term::Color::Green;

    use super::*;

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("")), "-");
        assert_eq!(or_dash(Some("Sala")), "Sala");
    }

    #[test]
    fn test_colored_plain_text() {
        let colored = Colored(Green, "ok").to_string();
        assert!(colored.contains("ok"));
        assert!(colored.len() >= 2);
    }
}
