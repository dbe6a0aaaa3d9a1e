//! Named string transforms usable as `{{helper name}}`

/// A registered helper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Helper {
    Upper,
    Lower,
    CamelCase,
    PascalCase,
    KebabCase,
}

impl Helper {
    pub const ALL: [Helper; 5] = [
        Helper::Upper,
        Helper::Lower,
        Helper::CamelCase,
        Helper::PascalCase,
        Helper::KebabCase,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Helper::Upper => "upper",
            Helper::Lower => "lower",
            Helper::CamelCase => "camelCase",
            Helper::PascalCase => "pascalCase",
            Helper::KebabCase => "kebabCase",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Helper::ALL.into_iter().find(|h| h.name() == name)
    }

    pub fn apply(&self, input: &str) -> String {
        match self {
            Helper::Upper => input.to_uppercase(),
            Helper::Lower => input.to_lowercase(),
            Helper::CamelCase => camel_case(input),
            Helper::PascalCase => pascal_case(input),
            Helper::KebabCase => kebab_case(input),
        }
    }
}

/// `"Submit login form"` → `"submitLoginForm"`
pub fn camel_case(input: &str) -> String {
    let mut out = String::new();
    for (i, word) in words(input).iter().enumerate() {
        if i == 0 {
            out.push_str(&word.to_lowercase());
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

/// `"submit login form"` → `"SubmitLoginForm"`
pub fn pascal_case(input: &str) -> String {
    words(input).iter().map(|w| capitalize(w)).collect()
}

/// `"Submit loginForm"` → `"submit-login-form"`
pub fn kebab_case(input: &str) -> String {
    words(input)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Split on non-alphanumerics and on case boundaries (`loginForm`, `HTTPServer`)
fn words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if !current.is_empty() && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_numeric()
                || (prev.is_uppercase() && next_is_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}
