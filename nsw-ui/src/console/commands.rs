//! Console command parsing

use std::path::PathBuf;
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  set <field> [value]     set gemini_key, amplify_token, topic_main, topic_sub1,
                          topic_sub2 or a parameter (e.g. tension 0.7, length 800);
                          no value clears a text field
  show                    print the candidate review
  html                    print the candidate review as HTML
  generate                generate candidates
  optimize                optimize from parameter settings only
  bbo                     learn from ratings and optimize
  reset                   reset the rating history (asks for confirmation)
  rate <id> <1-5>         rate a candidate
  draft                   generate the draft article
  edit-article <text>     replace the draft article
  instruction <text>      set the extra instruction for the final article
  final                   generate the final article
  export [path]           save the final article
  status                  show session status
  help                    show this help
  quit                    exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { field: String, value: String },
    Show,
    Html,
    Generate,
    Optimize,
    Bbo,
    Reset,
    Rate { id: String, rating: u8 },
    Draft,
    EditArticle(String),
    Instruction(String),
    Final,
    Export(Option<PathBuf>),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parse one input line
///
/// Free-text arguments (`set` values, article, instruction) keep their inner
/// whitespace.
pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb {
        "" => return Err(ParseError::Empty),
        "set" => {
            if rest.is_empty() {
                return Err(ParseError::Usage("set <field> [value]"));
            }
            let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            Command::Set {
                field: field.to_string(),
                value: value.trim().to_string(),
            }
        }
        "show" => Command::Show,
        "html" => Command::Html,
        "generate" => Command::Generate,
        "optimize" => Command::Optimize,
        "bbo" => Command::Bbo,
        "reset" => Command::Reset,
        "rate" => {
            let mut args = rest.split_whitespace();
            let (Some(id), Some(rating), None) = (args.next(), args.next(), args.next()) else {
                return Err(ParseError::Usage("rate <id> <1-5>"));
            };
            let rating = rating.parse::<u8>().map_err(|_| ParseError::Usage("rate <id> <1-5>"))?;
            Command::Rate {
                id: id.to_string(),
                rating,
            }
        }
        "draft" => Command::Draft,
        "edit-article" => Command::EditArticle(rest.to_string()),
        "instruction" => Command::Instruction(rest.to_string()),
        "final" => Command::Final,
        "export" => Command::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("generate"), Ok(Command::Generate));
        assert_eq!(parse("  bbo  "), Ok(Command::Bbo));
        assert_eq!(parse("exit"), Ok(Command::Quit));
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("dance"), Err(ParseError::Unknown("dance".to_string())));
    }

    #[test]
    fn test_set_keeps_value_whitespace() {
        assert_eq!(
            parse("set topic_main  A quiet  harbor town "),
            Ok(Command::Set {
                field: "topic_main".to_string(),
                value: "A quiet  harbor town".to_string()
            })
        );
    }

    #[test]
    fn test_set_without_value_clears() {
        assert_eq!(
            parse("set topic_sub1"),
            Ok(Command::Set {
                field: "topic_sub1".to_string(),
                value: String::new()
            })
        );
        assert_eq!(
            parse("set amplify_token   "),
            Ok(Command::Set {
                field: "amplify_token".to_string(),
                value: String::new()
            })
        );
        assert!(matches!(parse("set"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn test_rate() {
        assert_eq!(
            parse("rate 12 4"),
            Ok(Command::Rate {
                id: "12".to_string(),
                rating: 4
            })
        );
        assert!(parse("rate 12").is_err());
        assert!(parse("rate 12 four").is_err());
        assert!(parse("rate 12 4 5").is_err());
    }

    #[test]
    fn test_export_path_optional() {
        assert_eq!(parse("export"), Ok(Command::Export(None)));
        assert_eq!(parse("export out/scene.txt"), Ok(Command::Export(Some(PathBuf::from("out/scene.txt")))));
    }
}
