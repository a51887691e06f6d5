use clap::*;
use hcrpd::libs::scan::scan_sequence;
use hcrpd::libs::tile::unique_tiles;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("tiles")
        .about("Dumps candidate tiles as FASTA")
        .after_help(
            r###"
Writes every tile the scanner emits, before any filtering.

Header format:
    >seq_name:start-end

Notes:
* Tiles are antisense: each one is the reverse complement of its window.
* `start` is 1-based on the target; `end` is start + length.
* Windows containing ambiguous bases are skipped.
* --unique keeps the first tile of each distinct sequence within a record.

Examples:
1. All 52-mers of a transcript:
   hcrpd tiles gene.fa

2. Non-overlapping 30-mers, repeats excluded:
   hcrpd tiles gene.fa -l 30 -s 30 --repeat-mask soft

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .index(1)
                .help("Input FASTA file. [stdin] for standard input"),
        )
        .arg(
            Arg::new("tile_size")
                .long("tile-size")
                .short('l')
                .value_parser(value_parser!(usize))
                .default_value("52")
                .help("Tile length"),
        )
        .arg(
            Arg::new("tile_step")
                .long("tile-step")
                .short('s')
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("Step size"),
        )
        .arg(
            Arg::new("unique")
                .long("unique")
                .action(ArgAction::SetTrue)
                .help("Drop repeated tile sequences"),
        )
        .arg(
            Arg::new("repeat_mask")
                .long("repeat-mask")
                .value_parser([
                    builder::PossibleValue::new("none"),
                    builder::PossibleValue::new("soft"),
                ])
                .default_value("none")
                .help("Repeat masking of the target"),
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
    let infile = args.get_one::<String>("infile").map(String::as_str).unwrap_or("stdin");
    let outfile = args.get_one::<String>("outfile").map(String::as_str).unwrap_or("stdout");
    let tile_size = args.get_one::<usize>("tile_size").copied().unwrap_or(52);
    let tile_step = args.get_one::<usize>("tile_step").copied().unwrap_or(1);
    let is_unique = args.get_flag("unique");
    let masker = super::design::repeat_masker(
        args.get_one::<String>("repeat_mask").map(String::as_str).unwrap_or("none"),
    );

    if tile_size == 0 || tile_step == 0 {
        anyhow::bail!("--tile-size and --tile-step must be at least 1");
    }

    let mut writer = hcrpd::writer(outfile)?;
    for (name, seq) in hcrpd::read_fasta(infile)? {
        let masked = masker.mask(&seq)?;
        let mut tiles = scan_sequence(&masked, &name, tile_step, tile_size);
        if is_unique {
            tiles = unique_tiles(tiles);
        }
        log::info!("{}: {} tiles", name, tiles.len());

        for tile in &tiles {
            writeln!(writer, "{}", tile.to_fasta())?;
        }
    }
    writer.flush()?;

    Ok(())
}
