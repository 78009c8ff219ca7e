use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

/// `LINKAUTH_LOG_LEVEL` names and the `-v` count each one stands for.
const LEVEL_NAMES: [(&str, u8); 5] = [
    ("error", 0),
    ("warn", 1),
    ("info", 2),
    ("debug", 3),
    ("trace", 4),
];

fn parse_verbosity(level: &str) -> Result<u8, String> {
    let level = level.trim();
    let max = LEVEL_NAMES.len() as u8 - 1;

    if let Ok(count) = level.parse::<u8>() {
        return if count <= max {
            Ok(count)
        } else {
            Err(format!("log level {count} is out of range 0-{max}"))
        };
    }

    LEVEL_NAMES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(level))
        .map(|(_, count)| *count)
        .ok_or_else(|| {
            format!("unknown log level '{level}', expected error, warn, info, debug or trace")
        })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Increase log verbosity (-v warn, -vv info, -vvv debug, -vvvv trace)")
            .long_help(
                "Increase log verbosity. LINKAUTH_LOG_LEVEL accepts a level name \
                 (error, warn, info, debug, trace) or the matching count 0-4",
            )
            .env("LINKAUTH_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::from(parse_verbosity)),
    )
}
