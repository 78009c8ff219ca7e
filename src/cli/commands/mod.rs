pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";
pub const ARG_SITE_URL: &str = "site-url";
pub const ARG_LOCAL_HOST_ID: &str = "local-host-id";
pub const ARG_SESSION_TTL: &str = "session-ttl";

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

    let command = Command::new("linkauth")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("LINKAUTH_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long("dsn")
                .help("Database connection string")
                .env("LINKAUTH_DSN")
                .required(true),
        )
        .arg(
            Arg::new(ARG_SITE_URL)
                .long("site-url")
                .help("Public root URL of the site, redirects never leave its origin")
                .env("LINKAUTH_SITE_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_LOCAL_HOST_ID)
                .long("local-host-id")
                .help("Realm id of accounts managed by this site")
                .default_value("1")
                .env("LINKAUTH_LOCAL_HOST_ID")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL)
                .long("session-ttl")
                .help("Session lifetime in seconds")
                .default_value("43200")
                .env("LINKAUTH_SESSION_TTL")
                .value_parser(clap::value_parser!(i64).range(60..)),
        );

    logging::with_args(command)
}
