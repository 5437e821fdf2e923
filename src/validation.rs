//! Command argument grammar.
//!
//! Every positional argument a command accepts is checked against one of
//! these full-match patterns before any state is read or written.

use regex::Regex;
use std::sync::OnceLock;

/// One field kind of the command grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Integer greater than zero (chain ids).
    PositiveInteger,
    /// Integer zero or greater (decimals).
    NonNegativeInteger,
    /// Decimal amount greater than zero with at most 18 fraction digits.
    Amount,
    /// `http://` or `https://` URL without spaces or quotes.
    Url,
    /// 20-byte hex address with `0x` prefix.
    Address,
    /// 32-byte hex secret, `0x` prefix optional.
    SigningKey,
    /// `@username`.
    Username,
    /// `$symbol`.
    Token,
    /// Chain display name.
    ChainName,
    /// Drip interval: integer followed by `m` or `h`.
    Duration,
}

impl Field {
    fn pattern(self) -> &'static str {
        match self {
            Field::PositiveInteger => r"^[1-9][0-9]*$",
            Field::NonNegativeInteger => r"^[0-9]+$",
            Field::Amount => r"^(0\.0*[1-9][0-9]{0,17}|[1-9][0-9]*(\.[0-9]{1,18})?)$",
            Field::Url => r#"^https?://[^ "]+$"#,
            Field::Address => r"^0x[a-fA-F0-9]{40}$",
            Field::SigningKey => r"^(0x)?[0-9a-fA-F]{64}$",
            Field::Username => r"^@[a-zA-Z0-9_]{3,}$",
            Field::Token => r"^\$[a-zA-Z]{3,}$",
            Field::ChainName => r"^[A-Za-z][A-Za-z0-9_.-]*$",
            Field::Duration => r"^[0-9]+[mh]$",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    const ALL: [Field; 10] = [
        Field::PositiveInteger,
        Field::NonNegativeInteger,
        Field::Amount,
        Field::Url,
        Field::Address,
        Field::SigningKey,
        Field::Username,
        Field::Token,
        Field::ChainName,
        Field::Duration,
    ];
}

fn compiled() -> &'static [Option<Regex>] {
    static PATTERNS: OnceLock<Vec<Option<Regex>>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        Field::ALL
            .iter()
            .map(|field| match Regex::new(field.pattern()) {
                Ok(re) => Some(re),
                Err(err) => {
                    tracing::error!("invalid grammar pattern for {:?}: {}", field, err);
                    None
                }
            })
            .collect()
    })
}

/// Whether `value` matches `field` in full.
pub fn matches(field: Field, value: &str) -> bool {
    compiled()
        .get(field.index())
        .and_then(Option::as_ref)
        .map_or(false, |re| re.is_match(value))
}

/// Whether every `(field, value)` pair matches.
pub fn all_match(pairs: &[(Field, &str)]) -> bool {
    pairs.iter().all(|(field, value)| matches(*field, value))
}

/// Strip exactly one trailing `/` from a URL.
pub fn normalize_url(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_string()
}
