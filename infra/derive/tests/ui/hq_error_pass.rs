use hq_derive::hq_error;
use std::borrow::Cow;

#[hq_error]
pub enum LookupError {
    #[error("Record {id} not found")]
    NotFound { id: i64 },

    #[error("Parse error{}: {source}", format_context(.context))]
    Parse { source: std::num::ParseIntError, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn parse(raw: &str) -> Result<i64, LookupError> {
    raw.parse::<i64>().context("Parsing id")
}

fn main() {
    let _ = parse("7");
    let _ = LookupError::from("boom");
    let _ = LookupError::NotFound { id: 1 };
}
