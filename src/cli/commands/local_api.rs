use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_LOCAL_API_URL: &str = "local-api-url";
pub const ARG_LOCAL_API_TOKEN: &str = "local-api-token";

#[derive(Debug, Clone)]
pub struct Options {
    pub url: String,
    pub token: Option<SecretString>,
}

impl Options {
    /// Parse local API arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the URL is missing or blank.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let url = match matches.get_one::<String>(ARG_LOCAL_API_URL).cloned() {
            Some(value) if !value.trim().is_empty() => value,
            _ => anyhow::bail!("missing required argument: --{ARG_LOCAL_API_URL}"),
        };

        // clap passes "" through when the env var is set but empty
        let token = matches
            .get_one::<String>(ARG_LOCAL_API_TOKEN)
            .filter(|value| !value.trim().is_empty())
            .map(|value| SecretString::from(value.clone()));

        Ok(Self { url, token })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_LOCAL_API_URL)
                .long(ARG_LOCAL_API_URL)
                .help("Base URL of the overlay daemon's local API")
                .env("WEBAUTH_LOCAL_API_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_LOCAL_API_TOKEN)
                .long(ARG_LOCAL_API_TOKEN)
                .help("Password for the local API, sent as HTTP basic auth")
                .env("WEBAUTH_LOCAL_API_TOKEN")
                .hide_env_values(true),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn command() -> Command {
        with_args(Command::new("webauth"))
    }

    #[test]
    fn parse_url_and_token() {
        temp_env::with_vars(
            [
                ("WEBAUTH_LOCAL_API_URL", None::<&str>),
                ("WEBAUTH_LOCAL_API_TOKEN", None::<&str>),
            ],
            || {
                let matches = command().get_matches_from(vec![
                    "webauth",
                    "--local-api-url",
                    "http://127.0.0.1:41112",
                    "--local-api-token",
                    "s3cret",
                ]);
                let options = Options::parse(&matches);
                assert!(options.is_ok());
                if let Ok(options) = options {
                    assert_eq!(options.url, "http://127.0.0.1:41112");
                    assert_eq!(
                        options.token.as_ref().map(|token| token.expose_secret()),
                        Some("s3cret")
                    );
                }
            },
        );
    }

    #[test]
    fn empty_token_is_none() {
        temp_env::with_vars(
            [
                ("WEBAUTH_LOCAL_API_URL", Some("http://127.0.0.1:41112")),
                ("WEBAUTH_LOCAL_API_TOKEN", Some("")),
            ],
            || {
                let matches = command().get_matches_from(vec!["webauth"]);
                let options = Options::parse(&matches);
                assert!(options.is_ok_and(|options| options.token.is_none()));
            },
        );
    }

    #[test]
    fn blank_url_is_rejected() {
        temp_env::with_vars(
            [
                ("WEBAUTH_LOCAL_API_URL", Some("  ")),
                ("WEBAUTH_LOCAL_API_TOKEN", None::<&str>),
            ],
            || {
                let matches = command().get_matches_from(vec!["webauth"]);
                let result = Options::parse(&matches);
                assert!(result.is_err());
                if let Err(err) = result {
                    assert!(err
                        .to_string()
                        .contains("missing required argument: --local-api-url"));
                }
            },
        );
    }
}
