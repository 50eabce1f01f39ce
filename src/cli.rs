use crate::data::{Period, Symbol};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Args {
    pub server: Option<String>,
    pub symbol: Option<Symbol>,
    pub period: Option<Period>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Run(Args),
    Help,
    Version,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub code: i32,
    pub message: String,
}

#[must_use]
pub fn help_text(bin_name: &str) -> String {
    format!(
        "tickerterm - terminal client for a stock-analysis service\n\n\
         Usage:\n  {bin_name} [options]\n\n\
         Options:\n\
         \x20 -h, --help            Show this help\n\
         \x20 -V, --version         Show version\n\
         \x20     --server <url>    Analysis service base URL (overrides TICKERTERM_SERVER_URL)\n\
         \x20     --symbol <sym>    Initial ticker symbol (default AAPL)\n\
         \x20     --period <p>      Initial look-back period: 1mo 3mo 6mo 1y 2y 5y (default 6mo)\n"
    )
}

#[must_use]
pub fn version_text() -> String {
    format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

pub fn parse_args<I, S>(args: I) -> Result<Command, ParseError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut parsed = Args::default();
    let mut show_help = false;
    let mut show_version = false;

    let mut iter = args.into_iter().map(Into::into);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => show_help = true,
            "-V" | "--version" => show_version = true,
            "--server" => {
                parsed.server = Some(require_value(&arg, iter.next())?);
            }
            "--symbol" => {
                let value = require_value(&arg, iter.next())?;
                parsed.symbol = Some(Symbol::new(&value));
            }
            "--period" => {
                let value = require_value(&arg, iter.next())?;
                parsed.period = Some(value.parse().map_err(|err| ParseError {
                    code: 2,
                    message: format!("{err}\n\n{}", help_text("tickerterm")),
                })?);
            }
            _ if arg.starts_with('-') => {
                return Err(ParseError {
                    code: 2,
                    message: format!("unknown option: {arg}\n\n{}", help_text("tickerterm")),
                });
            }
            _ => {
                return Err(ParseError {
                    code: 2,
                    message: format!(
                        "unexpected positional argument: {arg}\n\n{}",
                        help_text("tickerterm")
                    ),
                });
            }
        }
    }

    if show_help {
        return Ok(Command::Help);
    }

    if show_version {
        return Ok(Command::Version);
    }

    Ok(Command::Run(parsed))
}

fn require_value(flag: &str, value: Option<String>) -> Result<String, ParseError> {
    value.ok_or_else(|| ParseError {
        code: 2,
        message: format!("option {flag} needs a value\n\n{}", help_text("tickerterm")),
    })
}

#[cfg(test)]
mod tests {
    use super::{parse_args, Command};
    use crate::data::Period;

    #[test]
    fn parses_default_run_command() {
        let result = parse_args(Vec::<String>::new());
        assert!(matches!(result, Ok(Command::Run(_))));
    }

    #[test]
    fn parses_help_command() {
        let result = parse_args(["--help"]);
        assert_eq!(result, Ok(Command::Help));
    }

    #[test]
    fn parses_version_command() {
        let result = parse_args(["--version"]);
        assert_eq!(result, Ok(Command::Version));
    }

    #[test]
    fn parses_value_options() {
        let result = parse_args(["--server", "http://localhost:5000", "--symbol", "msft"]);
        match result {
            Ok(Command::Run(args)) => {
                assert_eq!(args.server.as_deref(), Some("http://localhost:5000"));
                assert_eq!(args.symbol.map(|s| s.as_str().to_string()), Some("MSFT".into()));
            }
            _ => panic!("expected run command with values"),
        }
    }

    #[test]
    fn parses_period_option() {
        let result = parse_args(["--period", "1y"]);
        match result {
            Ok(Command::Run(args)) => assert_eq!(args.period, Some(Period::OneYear)),
            _ => panic!("expected run command with period"),
        }
    }

    #[test]
    fn fails_on_bad_period() {
        let err = parse_args(["--period", "yesterday"]).expect_err("expected parse error");
        assert_eq!(err.code, 2);
        assert!(err.message.contains("unknown period"));
    }

    #[test]
    fn fails_on_missing_value() {
        let err = parse_args(["--server"]).expect_err("expected parse error");
        assert_eq!(err.code, 2);
        assert!(err.message.contains("needs a value"));
    }

    #[test]
    fn fails_on_unknown_option() {
        let err = parse_args(["--unknown"]).expect_err("expected parse error");
        assert_eq!(err.code, 2);
        assert!(err.message.contains("unknown option"));
    }

    #[test]
    fn fails_on_positional_argument() {
        let err = parse_args(["abc"]).expect_err("expected parse error");
        assert_eq!(err.code, 2);
        assert!(err.message.contains("unexpected positional argument"));
    }
}
