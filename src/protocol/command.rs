use thiserror::Error;

use crate::store::StackId;

/// A decoded request line.
///
/// The wire protocol is plaintext and newline-delimited; each line is
/// decoded into one of these variants at the boundary so the rest of the
/// service never touches raw request text. Keywords are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `PING` — liveness check.
    Ping,
    /// `CREATE` — allocate a stack, answer its identifier.
    Create,
    /// `PUSH <id> <value>` — the value is the remainder of the line and may
    /// contain spaces.
    Push { id: StackId, value: String },
    /// `MPUSH <id> <v1,v2,…>` — comma-separated values, pushed in order.
    PushMany { id: StackId, values: Vec<String> },
    /// `POP <id>` — remove and answer the top value.
    Pop { id: StackId },
    /// `MPOP <id> <count>` — remove `count` values, answer them top first.
    PopMany { id: StackId, count: usize },
    /// `PEEK <id>` — answer the top value without removing it.
    Peek { id: StackId },
    /// `SIZE <id>` — answer the element count.
    Size { id: StackId },
    /// `DELETE <id>` — remove the stack.
    Delete { id: StackId },
    /// `LIST` — answer an occupancy summary (never identifiers).
    List,
}

/// Request lines that do not decode into a [`Command`].
///
/// These are answered as `ERR <reason>` and never reach the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty request")]
    EmptyRequest,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("missing {0}")]
    MissingArgument(&'static str),

    #[error("count must be an integer: {0}")]
    InvalidCount(String),

    #[error("values must be non-empty")]
    EmptyValue,
}

impl Command {
    /// Decodes one request line.
    pub fn parse(line: &str) -> Result<Command, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let (keyword, rest) = match line.split_once(' ') {
            Some((keyword, rest)) => (keyword, Some(rest)),
            None => (line, None),
        };

        match keyword.to_ascii_uppercase().as_str() {
            "PING" => Ok(Command::Ping),
            "CREATE" => Ok(Command::Create),
            "LIST" => Ok(Command::List),
            "PUSH" => {
                let rest = rest.ok_or(ParseError::MissingArgument("stack id"))?;
                let (id, value) = rest
                    .split_once(' ')
                    .ok_or(ParseError::MissingArgument("value"))?;
                if value.is_empty() {
                    return Err(ParseError::MissingArgument("value"));
                }
                Ok(Command::Push {
                    id: StackId::from(id),
                    value: value.to_string(),
                })
            }
            "MPUSH" => {
                let rest = rest.ok_or(ParseError::MissingArgument("stack id"))?;
                let (id, joined) = rest
                    .split_once(' ')
                    .ok_or(ParseError::MissingArgument("values"))?;
                if joined.is_empty() {
                    return Err(ParseError::MissingArgument("values"));
                }
                let values: Vec<String> = joined.split(',').map(str::to_string).collect();
                if values.iter().any(String::is_empty) {
                    return Err(ParseError::EmptyValue);
                }
                Ok(Command::PushMany {
                    id: StackId::from(id),
                    values,
                })
            }
            "MPOP" => {
                let rest = rest.ok_or(ParseError::MissingArgument("stack id"))?;
                let (id, raw_count) = rest
                    .split_once(' ')
                    .ok_or(ParseError::MissingArgument("count"))?;
                let count = raw_count
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ParseError::InvalidCount(raw_count.trim().to_string()))?;
                Ok(Command::PopMany {
                    id: StackId::from(id),
                    count,
                })
            }
            "POP" => Ok(Command::Pop {
                id: parse_id(rest)?,
            }),
            "PEEK" => Ok(Command::Peek {
                id: parse_id(rest)?,
            }),
            "SIZE" => Ok(Command::Size {
                id: parse_id(rest)?,
            }),
            "DELETE" => Ok(Command::Delete {
                id: parse_id(rest)?,
            }),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

fn parse_id(rest: Option<&str>) -> Result<StackId, ParseError> {
    rest.and_then(|r| r.split_whitespace().next())
        .map(StackId::from)
        .ok_or(ParseError::MissingArgument("stack id"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_value_is_the_rest_of_the_line() {
        let cmd = Command::parse("PUSH abc123 hello world").unwrap();
        assert_eq!(
            cmd,
            Command::Push {
                id: StackId::from("abc123"),
                value: "hello world".to_string(),
            }
        );
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(Command::parse("create").unwrap(), Command::Create);
        assert_eq!(
            Command::parse("pop abc").unwrap(),
            Command::Pop {
                id: StackId::from("abc")
            }
        );
    }

    #[test]
    fn test_mpush_splits_on_commas() {
        let cmd = Command::parse("MPUSH id1 a,b,c").unwrap();
        assert_eq!(
            cmd,
            Command::PushMany {
                id: StackId::from("id1"),
                values: vec!["a".into(), "b".into(), "c".into()],
            }
        );
    }

    #[test]
    fn test_mpush_rejects_empty_elements() {
        assert_eq!(Command::parse("MPUSH id1 a,,c"), Err(ParseError::EmptyValue));
    }

    #[test]
    fn test_mpop_parses_count() {
        let cmd = Command::parse("MPOP id1 3").unwrap();
        assert_eq!(
            cmd,
            Command::PopMany {
                id: StackId::from("id1"),
                count: 3,
            }
        );
    }

    #[test]
    fn test_mpop_rejects_non_integer_count() {
        assert_eq!(
            Command::parse("MPOP id1 three"),
            Err(ParseError::InvalidCount("three".to_string()))
        );
    }

    #[test]
    fn test_missing_arguments_are_reported() {
        assert_eq!(
            Command::parse("PUSH"),
            Err(ParseError::MissingArgument("stack id"))
        );
        assert_eq!(
            Command::parse("PUSH abc123"),
            Err(ParseError::MissingArgument("value"))
        );
        assert_eq!(
            Command::parse("POP"),
            Err(ParseError::MissingArgument("stack id"))
        );
    }

    #[test]
    fn test_unknown_and_empty_requests() {
        assert_eq!(
            Command::parse("SHOVE abc"),
            Err(ParseError::UnknownCommand("SHOVE".to_string()))
        );
        assert_eq!(Command::parse("   "), Err(ParseError::EmptyRequest));
    }
}
