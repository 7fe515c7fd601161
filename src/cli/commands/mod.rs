pub mod local_api;
pub mod logging;
pub mod session;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("webauth")
        .about("Session broker for the local admin web interface")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("WEBAUTH_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = local_api::with_args(command);
    let command = session::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use local_api::ARG_LOCAL_API_URL;

    const ENV_VARS: [&str; 7] = [
        "WEBAUTH_PORT",
        "WEBAUTH_LOCAL_API_URL",
        "WEBAUTH_LOCAL_API_TOKEN",
        "WEBAUTH_SESSION_TTL_SECONDS",
        "WEBAUTH_AUTH_WAIT_TIMEOUT_SECONDS",
        "WEBAUTH_SECURE_COOKIE",
        "WEBAUTH_LOG_LEVEL",
    ];

    // Run `f` with every WEBAUTH_* variable unset.
    fn with_cleared_env<F: FnOnce()>(f: F) {
        temp_env::with_vars(ENV_VARS.map(|key| (key, None::<&str>)), f);
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "webauth");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Session broker for the local admin web interface".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_check_port_and_local_api_url() {
        with_cleared_env(|| {
            let matches = new().get_matches_from(vec![
                "webauth",
                "--port",
                "8081",
                "--local-api-url",
                "http://127.0.0.1:41112",
            ]);

            assert_eq!(matches.get_one::<u16>("port").copied(), Some(8081));
            assert_eq!(
                matches.get_one::<String>(ARG_LOCAL_API_URL).cloned(),
                Some("http://127.0.0.1:41112".to_string())
            );
        });
    }

    #[test]
    fn test_missing_local_api_url_fails() {
        with_cleared_env(|| {
            let result = new().try_get_matches_from(vec!["webauth"]);
            assert_eq!(
                result.map_err(|e| e.kind()).err(),
                Some(clap::error::ErrorKind::MissingRequiredArgument)
            );
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("WEBAUTH_PORT", Some("443")),
                ("WEBAUTH_LOCAL_API_URL", Some("http://100.100.100.100")),
                ("WEBAUTH_LOCAL_API_TOKEN", None),
                ("WEBAUTH_SESSION_TTL_SECONDS", None),
                ("WEBAUTH_AUTH_WAIT_TIMEOUT_SECONDS", None),
                ("WEBAUTH_SECURE_COOKIE", None),
                ("WEBAUTH_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["webauth"]);
                assert_eq!(matches.get_one::<u16>("port").copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>(ARG_LOCAL_API_URL).cloned(),
                    Some("http://100.100.100.100".to_string())
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("WEBAUTH_LOG_LEVEL", Some(level)),
                    ("WEBAUTH_LOCAL_API_URL", Some("http://100.100.100.100")),
                ],
                || {
                    let matches = new().get_matches_from(vec!["webauth"]);
                    assert_eq!(
                        matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                        u8::try_from(index).ok()
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            with_cleared_env(|| {
                let mut args = vec![
                    "webauth".to_string(),
                    "--local-api-url".to_string(),
                    "http://100.100.100.100".to_string(),
                ];

                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }
}
