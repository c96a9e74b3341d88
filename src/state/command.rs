use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use crate::error::CommandError;

/// A discrete selection change issued by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    SetGraphVisible { series: String, visible: bool },
    SetTableVisible { series: String, visible: bool },
    SetExcluded { series: String, excluded: bool },
    /// An empty `display_name` clears the override.
    Rename { series: String, display_name: String },
    Remove { series: String },
}

impl SessionCommand {
    pub fn series(&self) -> &str {
        match self {
            SessionCommand::SetGraphVisible { series, .. }
            | SessionCommand::SetTableVisible { series, .. }
            | SessionCommand::SetExcluded { series, .. }
            | SessionCommand::Rename { series, .. }
            | SessionCommand::Remove { series } => series,
        }
    }
}

/// Split off the first whitespace-delimited word.
fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], s[idx..].trim_start()),
        None => (s, ""),
    }
}

/// Split off the series name: a bare word, or a double-quoted string in
/// which `\"` and `\\` escape the next character.
fn split_series(s: &str) -> Result<(String, &str), CommandError> {
    let s = s.trim_start();
    let Some(quoted) = s.strip_prefix('"') else {
        let (word, rest) = split_word(s);
        return Ok((word.to_string(), rest));
    };
    let mut name = String::new();
    let mut chars = quoted.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '"' => return Ok((name, quoted[idx + 1..].trim_start())),
            '\\' => match chars.next() {
                Some((_, escaped)) => name.push(escaped),
                None => break,
            },
            _ => name.push(c),
        }
    }
    Err(CommandError::UnterminatedQuote)
}

/// Quote a series name when a bare word would not parse back to it.
fn quote_series(name: &str) -> Cow<'_, str> {
    if !name.is_empty() && !name.starts_with('"') && !name.contains(char::is_whitespace) {
        return Cow::Borrowed(name);
    }
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

fn parse_switch(word: &str) -> Result<bool, CommandError> {
    match word.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(CommandError::InvalidSwitch(word.to_string())),
    }
}

impl FromStr for SessionCommand {
    type Err = CommandError;

    /// Parse one line of the form `<verb> <series> [argument]`, where a
    /// series name containing spaces is written in double quotes.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (verb, rest) = split_word(line);
        if verb.is_empty() {
            return Err(CommandError::Empty);
        }
        let verb_lower = verb.to_lowercase();
        let verb_name: &'static str = match verb_lower.as_str() {
            "graph" => "graph",
            "table" => "table",
            "exclude" => "exclude",
            "rename" => "rename",
            "remove" => "remove",
            _ => return Err(CommandError::Unknown(verb.to_string())),
        };

        let (series, argument) = split_series(rest)?;
        if series.is_empty() {
            return Err(CommandError::MissingSeries(verb_name));
        }

        let command = match verb_name {
            "graph" => SessionCommand::SetGraphVisible {
                series,
                visible: parse_switch(argument)?,
            },
            "table" => SessionCommand::SetTableVisible {
                series,
                visible: parse_switch(argument)?,
            },
            "exclude" => SessionCommand::SetExcluded {
                series,
                excluded: parse_switch(argument)?,
            },
            "rename" => SessionCommand::Rename {
                series,
                display_name: argument.to_string(),
            },
            _ => SessionCommand::Remove { series },
        };
        Ok(command)
    }
}

impl fmt::Display for SessionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let switch = |b: bool| if b { "on" } else { "off" };
        let series = quote_series(self.series());
        match self {
            SessionCommand::SetGraphVisible { visible, .. } => {
                write!(f, "graph {series} {}", switch(*visible))
            }
            SessionCommand::SetTableVisible { visible, .. } => {
                write!(f, "table {series} {}", switch(*visible))
            }
            SessionCommand::SetExcluded { excluded, .. } => {
                write!(f, "exclude {series} {}", switch(*excluded))
            }
            SessionCommand::Rename { display_name, .. } => {
                write!(f, "rename {series} {display_name}")
            }
            SessionCommand::Remove { .. } => write!(f, "remove {series}"),
        }
    }
}
