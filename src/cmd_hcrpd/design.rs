use clap::*;
use hcrpd::libs::config::{default_registry_path, DesignParams, GenomeMaskConfig, SpeciesRegistry};
use hcrpd::libs::design::Designer;
use hcrpd::libs::mask::{Bowtie2, GenomeAligner, NoMask, RepeatMasker, SoftMask};
use hcrpd::libs::predict::NearestNeighbor;
use hcrpd::libs::probe::Channel;
use hcrpd::libs::report;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("design")
        .about("Designs HCR split-probe sets")
        .after_help(
            r###"
Tiles every record of <infile> into antisense windows, filters them and
picks up to --max-probes non-overlapping tiles whose hybrid ΔG is closest
to --target-gibbs. Each tile becomes two oligos:

    P1 = odd initiator  + 3' half
    P2 = 5' half        + even initiator

The two middle bases of a tile are left unbound.

Filters, in order:
* c/g homopolymer runs (--max-run-length, --max-run-mismatches)
* hairpins melting above --max-hairpin-tm
* genome hits above --max-hits (only with --index or --species)
* GC% outside [--min-gc, --max-gc]
* ΔG outside [--min-gibbs, --max-gibbs], kcal/mol
* Tm difference of the halves above --dtm-max (only with --dtm-filter)

Repeat masking:
* none: use the target as is
* soft: lower-case bases count as repeats

Output formats:
* tsv:  name probe start length P1 P2 channel GC Tm dTm GibbsFE
* json: the same rows as an array of objects
* idt:  ordering sheet, Name<TAB>Sequence

--idt <file> writes the ordering sheet as well, next to the main output.

Examples:
1. Default settings, B1 channel:
   hcrpd design gene.fa

2. Another channel, skip repeats, write an ordering sheet:
   hcrpd design gene.fa -c B3 --repeat-mask soft --format idt -o order.tsv

3. Reject tiles hitting the mouse genome more than once:
   hcrpd design gene.fa --species mouse

4. Table and ordering sheet from one run:
   hcrpd design gene.fa -o probes.tsv --idt order.tsv

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
                .help("Length of the binding region"),
        )
        .arg(
            Arg::new("tile_step")
                .long("tile-step")
                .short('s')
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("Distance between consecutive tiles"),
        )
        .arg(
            Arg::new("max_run_length")
                .long("max-run-length")
                .value_parser(value_parser!(usize))
                .default_value("7")
                .help("Homopolymer run length to reject"),
        )
        .arg(
            Arg::new("max_run_mismatches")
                .long("max-run-mismatches")
                .value_parser(value_parser!(usize))
                .default_value("2")
                .help("Other bases tolerated inside a run"),
        )
        .arg(
            Arg::new("max_hairpin_tm")
                .long("max-hairpin-tm")
                .value_parser(value_parser!(f64))
                .default_value("45")
                .help("Maximum hairpin melting temperature, °C"),
        )
        .arg(
            Arg::new("max_hits")
                .long("max-hits")
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("Genome alignments allowed per tile"),
        )
        .arg(
            Arg::new("min_gc")
                .long("min-gc")
                .value_parser(value_parser!(f64))
                .default_value("45")
                .help("Minimum GC%"),
        )
        .arg(
            Arg::new("max_gc")
                .long("max-gc")
                .value_parser(value_parser!(f64))
                .default_value("55")
                .help("Maximum GC%"),
        )
        .arg(
            Arg::new("min_gibbs")
                .long("min-gibbs")
                .value_parser(value_parser!(f64))
                .allow_negative_numbers(true)
                .default_value("-70")
                .help("Minimum ΔG, kcal/mol"),
        )
        .arg(
            Arg::new("max_gibbs")
                .long("max-gibbs")
                .value_parser(value_parser!(f64))
                .allow_negative_numbers(true)
                .default_value("-50")
                .help("Maximum ΔG, kcal/mol"),
        )
        .arg(
            Arg::new("target_gibbs")
                .long("target-gibbs")
                .value_parser(value_parser!(f64))
                .allow_negative_numbers(true)
                .default_value("-60")
                .help("ΔG the selection aims for, kcal/mol"),
        )
        .arg(
            Arg::new("dtm_filter")
                .long("dtm-filter")
                .action(ArgAction::SetTrue)
                .help("Reject tiles whose halves differ too much in Tm"),
        )
        .arg(
            Arg::new("dtm_max")
                .long("dtm-max")
                .value_parser(value_parser!(f64))
                .default_value("5")
                .help("Maximum Tm difference of the halves, °C"),
        )
        .arg(
            Arg::new("max_probes")
                .long("max-probes")
                .short('n')
                .value_parser(value_parser!(usize))
                .default_value("20")
                .help("Probes per target"),
        )
        .arg(
            Arg::new("channel")
                .long("channel")
                .short('c')
                .num_args(1)
                .default_value("B1")
                .help("Amplifier channel, B1 to B5"),
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
            Arg::new("index")
                .long("index")
                .num_args(1)
                .conflicts_with("species")
                .help("Bowtie2 index prefix for genome masking"),
        )
        .arg(
            Arg::new("species")
                .long("species")
                .num_args(1)
                .help("Registered species for genome masking"),
        )
        .arg(
            Arg::new("registry")
                .long("registry")
                .num_args(1)
                .help("Species registry. Default: ~/.hcrpd/species.json"),
        )
        .arg(
            Arg::new("alignments")
                .long("alignments")
                .short('k')
                .value_parser(value_parser!(usize))
                .default_value("3")
                .help("Alignments searched per tile (bowtie2 -k)"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_parser(value_parser!(u64))
                .help("Seconds before bowtie2 is killed"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_parser([
                    builder::PossibleValue::new("tsv"),
                    builder::PossibleValue::new("json"),
                    builder::PossibleValue::new("idt"),
                ])
                .default_value("tsv")
                .help("Output format"),
        )
        .arg(
            Arg::new("idt")
                .long("idt")
                .num_args(1)
                .help("Also write an IDT ordering sheet to this file"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .short('p')
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("Number of threads"),
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

pub fn repeat_masker(name: &str) -> &'static (dyn RepeatMasker + Sync) {
    match name {
        "soft" => &SoftMask,
        _ => &NoMask,
    }
}

fn params_from(args: &ArgMatches) -> anyhow::Result<DesignParams> {
    let defaults = DesignParams::default();
    let usize_arg = |id: &str, default: usize| args.get_one::<usize>(id).copied().unwrap_or(default);
    let f64_arg = |id: &str, default: f64| args.get_one::<f64>(id).copied().unwrap_or(default);

    let channel = match args.get_one::<String>("channel") {
        Some(name) => name.parse::<Channel>()?,
        None => defaults.channel,
    };

    Ok(DesignParams {
        tile_size: usize_arg("tile_size", defaults.tile_size),
        tile_step: usize_arg("tile_step", defaults.tile_step),
        max_run_length: usize_arg("max_run_length", defaults.max_run_length),
        max_run_mismatches: usize_arg("max_run_mismatches", defaults.max_run_mismatches),
        max_hairpin_tm: f64_arg("max_hairpin_tm", defaults.max_hairpin_tm),
        max_hits: usize_arg("max_hits", defaults.max_hits),
        min_gc: f64_arg("min_gc", defaults.min_gc),
        max_gc: f64_arg("max_gc", defaults.max_gc),
        min_gibbs: f64_arg("min_gibbs", defaults.min_gibbs),
        max_gibbs: f64_arg("max_gibbs", defaults.max_gibbs),
        target_gibbs: f64_arg("target_gibbs", defaults.target_gibbs),
        dtm_filter: args.get_flag("dtm_filter"),
        dtm_max: f64_arg("dtm_max", defaults.dtm_max),
        max_probes: usize_arg("max_probes", defaults.max_probes),
        channel,
    })
}

/// Index prefix from --index, or from --species through the registry.
fn genome_mask_from(args: &ArgMatches) -> anyhow::Result<Option<GenomeMaskConfig>> {
    let index = if let Some(index) = args.get_one::<String>("index") {
        PathBuf::from(index)
    } else if let Some(species) = args.get_one::<String>("species") {
        let registry_file = args
            .get_one::<String>("registry")
            .map(PathBuf::from)
            .unwrap_or_else(default_registry_path);
        SpeciesRegistry::load(&registry_file)?.resolve_index(species)?
    } else {
        return Ok(None);
    };

    let mut config = GenomeMaskConfig::new(index);
    if let Some(k) = args.get_one::<usize>("alignments") {
        config.n_alignments = *k;
    }
    config.timeout = args.get_one::<u64>("timeout").map(|s| Duration::from_secs(*s));
    Ok(Some(config))
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let infile = args.get_one::<String>("infile").map(String::as_str).unwrap_or("stdin");
    let outfile = args.get_one::<String>("outfile").map(String::as_str).unwrap_or("stdout");
    let format = args.get_one::<String>("format").map(String::as_str).unwrap_or("tsv");
    let parallel = args.get_one::<usize>("parallel").copied().unwrap_or(1);
    let mask_name = args.get_one::<String>("repeat_mask").map(String::as_str).unwrap_or("none");

    let params = params_from(args)?;
    let bowtie2 = genome_mask_from(args)?.map(|config| Bowtie2::from_config(&config));

    let predictor = NearestNeighbor::default();
    let designer = Designer::new(
        params,
        repeat_masker(mask_name),
        &predictor,
        bowtie2
            .as_ref()
            .map(|b| b as &(dyn GenomeAligner + Sync)),
    )?;

    let records = hcrpd::read_fasta(infile)?;
    if records.is_empty() {
        log::warn!("No sequences in {}", infile);
    }

    let results = if parallel > 1 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(parallel)
            .build()?
            .install(|| designer.design_batch(&records, true))?
    } else {
        designer.design_batch(&records, false)?
    };
    let rows: Vec<report::ProbeRow> = results.into_iter().flat_map(|(_, rows)| rows).collect();

    let mut writer = hcrpd::writer(outfile)?;
    match format {
        "json" => report::write_json(&mut writer, &rows)?,
        "idt" => report::write_idt(&mut writer, &rows)?,
        _ => report::write_table(&mut writer, &rows)?,
    }
    writer.flush()?;

    if let Some(idt_file) = args.get_one::<String>("idt") {
        let mut idt_writer = hcrpd::writer(idt_file)?;
        report::write_idt(&mut idt_writer, &rows)?;
        idt_writer.flush()?;
    }

    log::info!(
        "{} probes, {} oligos, estimated cost ${:.2}",
        rows.len(),
        rows.len() * 2,
        report::oligo_cost(&rows)
    );

    Ok(())
}
