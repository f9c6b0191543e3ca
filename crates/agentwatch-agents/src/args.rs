use std::collections::HashMap;

/// Value bound to a flag: `true` for bare flags, a string when the next
/// token was consumed as the value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Bool(bool),
    Str(String),
}

impl FlagValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlagValue::Str(s) => Some(s),
            FlagValue::Bool(_) => None,
        }
    }
}

impl std::fmt::Display for FlagValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlagValue::Bool(b) => write!(f, "{}", b),
            FlagValue::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Shell-style parse of a watch command's argument string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub positional: Vec<String>,
    pub flags: HashMap<String, FlagValue>,
}

impl ParsedArgs {
    /// Tokenize on whitespace; `--long` and `-s` are flags, everything
    /// else is positional. A token following a flag is consumed as its
    /// value unless it starts with `-`, in which case the flag is boolean.
    ///
    /// Known limitation, kept deliberately: a value that legitimately
    /// starts with `-` (e.g. a negative number) is read as a new flag.
    pub fn parse(args: &str) -> Self {
        let tokens: Vec<&str> = args.split_whitespace().collect();

        let mut positional = Vec::new();
        let mut flags = HashMap::new();

        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i];

            let flag_name = if let Some(name) = token.strip_prefix("--") {
                Some(name)
            } else if token.len() > 1 && token.starts_with('-') {
                Some(&token[1..])
            } else {
                None
            };

            match flag_name {
                Some(name) => {
                    if i + 1 < tokens.len() && !tokens[i + 1].starts_with('-') {
                        flags.insert(name.to_string(), FlagValue::Str(tokens[i + 1].to_string()));
                        i += 2;
                    } else {
                        flags.insert(name.to_string(), FlagValue::Bool(true));
                        i += 1;
                    }
                }
                None => {
                    positional.push(token.to_string());
                    i += 1;
                }
            }
        }

        Self { positional, flags }
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    pub fn flag_value(&self, name: &str) -> Option<&str> {
        self.flags.get(name).and_then(|v| v.as_str())
    }
}
