use clap::*;
use hcrpd::libs::probe::Channel;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("channels")
        .about("Lists amplifier channels and initiators")
        .after_help(
            r###"
Prints one line per channel:

    channel<TAB>odd<TAB>even

The odd initiator is prepended to the 3' half of a tile (P1), the even
initiator appended to the 5' half (P2).

"###,
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let outfile = args.get_one::<String>("outfile").map(String::as_str).unwrap_or("stdout");

    let mut writer = hcrpd::writer(outfile)?;
    writeln!(writer, "channel\todd\teven")?;
    for channel in Channel::ALL {
        writeln!(writer, "{}\t{}\t{}", channel, channel.odd(), channel.even())?;
    }
    writer.flush()?;

    Ok(())
}
