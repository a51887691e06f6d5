extern crate clap;
use clap::*;

mod cmd_hcrpd;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = Command::new("hcrpd")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`hcrpd` - HCR split-probe designer")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_hcrpd::design::make_subcommand())
        .subcommand(cmd_hcrpd::tiles::make_subcommand())
        .subcommand(cmd_hcrpd::channels::make_subcommand())
        .subcommand(cmd_hcrpd::index::make_subcommand())
        .after_help(
            r###"Subcommands:

* design   - Design split-probe sets for every record of a FASTA file
* tiles    - Dump the candidate tiles of each record
* channels - List the amplifier channels and their initiators
* index    - Build a Bowtie2 index and register it for a species

Log verbosity follows RUST_LOG (default: info).

"###,
        );

    match app.get_matches().subcommand() {
        Some(("design", sub_matches)) => cmd_hcrpd::design::execute(sub_matches),
        Some(("tiles", sub_matches)) => cmd_hcrpd::tiles::execute(sub_matches),
        Some(("channels", sub_matches)) => cmd_hcrpd::channels::execute(sub_matches),
        Some(("index", sub_matches)) => cmd_hcrpd::index::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
