use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

// Index is the verbosity count that `-v` repetitions would produce.
const LEVEL_NAMES: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Verbosity from `WEBAUTH_LOG_LEVEL`: a level name or a count up to 5.
fn parse_level(level: &str) -> Result<u8, String> {
    let level = level.trim();
    if let Ok(count) = level.parse::<u8>() {
        return if count <= 5 {
            Ok(count)
        } else {
            Err(format!("log level count {count} is above 5"))
        };
    }

    LEVEL_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(level))
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("invalid log level: {level}"))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("WEBAUTH_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::from(parse_level)),
    )
}

#[cfg(test)]
mod tests {
    use super::parse_level;

    #[test]
    fn names_map_to_counts() {
        assert_eq!(parse_level("error"), Ok(0));
        assert_eq!(parse_level("WARN"), Ok(1));
        assert_eq!(parse_level(" info "), Ok(2));
        assert_eq!(parse_level("Debug"), Ok(3));
        assert_eq!(parse_level("trace"), Ok(4));
    }

    #[test]
    fn counts_are_capped() {
        assert_eq!(parse_level("3"), Ok(3));
        assert_eq!(parse_level("5"), Ok(5));
        assert!(parse_level("6").is_err());
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(parse_level("verbose").is_err());
        assert!(parse_level("").is_err());
    }
}
