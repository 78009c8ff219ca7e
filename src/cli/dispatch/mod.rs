use crate::cli::{
    actions::{server::Args, Action},
    commands::{ARG_DSN, ARG_LOCAL_HOST_ID, ARG_PORT, ARG_SESSION_TTL, ARG_SITE_URL},
};
use anyhow::{Context, Result};
use url::Url;

/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;

    let site_url = matches
        .get_one::<String>(ARG_SITE_URL)
        .context("missing required argument: --site-url")?;
    let site_url =
        Url::parse(site_url).with_context(|| format!("invalid LINKAUTH_SITE_URL: {site_url}"))?;
    if site_url.host_str().is_none() {
        anyhow::bail!("LINKAUTH_SITE_URL must include a host: {site_url}");
    }

    let local_host_id = matches
        .get_one::<i64>(ARG_LOCAL_HOST_ID)
        .copied()
        .unwrap_or(1);
    let session_ttl_seconds = matches
        .get_one::<i64>(ARG_SESSION_TTL)
        .copied()
        .unwrap_or(43200);

    Ok(Action::Server(Args {
        port,
        dsn,
        site_url,
        local_host_id,
        session_ttl_seconds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    fn matches(site_url: &str) -> clap::ArgMatches {
        commands::new().get_matches_from(vec![
            "linkauth",
            "--dsn",
            "postgres://localhost/linkauth",
            "--site-url",
            site_url,
        ])
    }

    #[test]
    fn builds_server_action() {
        temp_env::with_vars_unset(
            ["LINKAUTH_PORT", "LINKAUTH_LOCAL_HOST_ID", "LINKAUTH_SESSION_TTL"],
            || {
                let action = handler(&matches("https://school.example/"));
                let Ok(Action::Server(args)) = action else {
                    panic!("expected server action");
                };
                assert_eq!(args.port, 8080);
                assert_eq!(args.site_url.as_str(), "https://school.example/");
                assert_eq!(args.local_host_id, 1);
                assert_eq!(args.session_ttl_seconds, 43200);
            },
        );
    }

    #[test]
    fn rejects_relative_site_url() {
        assert!(handler(&matches("/moodle")).is_err());
    }

    #[test]
    fn rejects_site_url_without_host() {
        assert!(handler(&matches("data:text/plain,hello")).is_err());
    }
}
