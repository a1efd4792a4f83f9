use anyhow::Result;
use causewayd::cli::parse_cli;
use causewayd::commands::run;
use causewayd::logging::init_logging;

fn main() -> Result<()> {
    let cli = parse_cli();
    init_logging(cli.log_format);

    let mut out = std::io::stdout().lock();
    run(&cli, &mut out)
}
