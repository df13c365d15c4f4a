use anyhow::Context;
use dateinput_intl::{DateInput, DatePicker, LineHost, Width};
use lexopt::{Arg, Parser, ValueExt};
use std::io;

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(DatePicker),
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut picker = DatePicker::new();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Long("value") => {
                    picker = picker.value(date_arg(&mut parser)?);
                }
                Arg::Long("no-value") => picker = picker.no_value(),
                Arg::Long("min") => picker = picker.min(date_arg(&mut parser)?),
                Arg::Long("max") => picker = picker.max(date_arg(&mut parser)?),
                Arg::Long("key") => picker = picker.key(parser.value()?.string()?),
                Arg::Long("locale") => picker = picker.locale(parser.value()?.string()?),
                Arg::Long("format") => picker = picker.format(parser.value()?.string()?),
                Arg::Long("disabled") => picker = picker.disabled(true),
                Arg::Long("width") => picker = picker.width(parser.value()?.parse::<Width>()?),
                Arg::Long("clearable") => picker = picker.clearable(true),
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run(picker))
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(picker) => {
                let mut host = LineHost::new(io::stdin().lock(), io::stdout().lock());
                let selection = picker
                    .render(&mut host)
                    .context("failed to render date picker")?;
                host.report(&selection)
                    .context("failed to report selection")?;
                Ok(())
            }
            Command::Help => {
                println!("Usage: dateinput-intl [<options>]");
                println!();
                println!("Render a date picker over stdio, one JSON message per line");
                println!();
                println!("Options:");
                println!("  --value <DATE|today>      Initially selected date [default: today]");
                println!("  --no-value                Start with no date selected");
                println!("  --min <DATE>              Earliest selectable date");
                println!("  --max <DATE>              Latest selectable date");
                println!("  --key <KEY>               Identify the picker across re-renders");
                println!("  --locale <LOCALE>         Locale for the calendar, e.g. \"ja\"");
                println!("  --format <FORMAT>         Display format [default: YYYY/MM/DD]");
                println!("  --disabled                Render the picker disabled");
                println!("  --width <WIDTH>           \"stretch\", \"content\", or pixels");
                println!("  --clearable               Allow clearing the selection");
                println!("  -h, --help                Display this help message and exit");
                println!("  -V, --version             Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn date_arg(parser: &mut Parser) -> Result<DateInput, lexopt::Error> {
    Ok(DateInput::from(parser.value()?.string()?))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    Command::from_parser(Parser::from_env())?.run()
}
