use clap::*;
use hcrpd::libs::config::{default_registry_path, SpeciesRegistry};
use itertools::Itertools;
use std::path::{Path, PathBuf};
use std::process::Command as Process;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("index")
        .about("Builds and registers a Bowtie2 genome index")
        .after_help(
            r###"
Runs `bowtie2-build` on the given FASTA files and records the index prefix
under the species name, so that `hcrpd design --species <name>` can find it.

Inputs:
* FASTA files, plain or gzipped
* Directories: every *.fa, *.fasta, *.fna (optionally .gz) directly inside

The registry is a JSON file:
    {"species": {"mouse": {"bowtie2_index": "indices/mouse/mouse"}}}
Relative prefixes are relative to the registry file.

Notes:
* bowtie2-build must be in $PATH.
* An existing species is kept unless --force is given.

Examples:
1. Mouse genome from a directory of chromosomes:
   hcrpd index --species mouse mm10/

2. Replace an entry, custom registry and prefix:
   hcrpd index --species fly dm6.fa.gz --prefix idx/dm6 --registry species.json --force

"###,
        )
        .arg(
            Arg::new("infiles")
                .required(true)
                .num_args(1..)
                .index(1)
                .help("FASTA files or directories"),
        )
        .arg(
            Arg::new("species")
                .long("species")
                .required(true)
                .num_args(1)
                .help("Name to register the index under"),
        )
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .num_args(1)
                .help("Index prefix. Default: <registry dir>/indices/<species>/<species>"),
        )
        .arg(
            Arg::new("registry")
                .long("registry")
                .num_args(1)
                .help("Species registry. Default: ~/.hcrpd/species.json"),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .short('t')
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("Threads for bowtie2-build"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Overwrite an existing entry"),
        )
}

fn is_fasta(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    [".fa", ".fasta", ".fna"].iter().any(|ext| name.ends_with(ext))
}

/// Expands directories into the FASTA files they hold, sorted by name.
fn collect_fasta(inputs: &[&String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = vec![];
    for input in inputs {
        let path = Path::new(input.as_str());
        if path.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_fasta(p))
                .collect();
            found.sort();
            if found.is_empty() {
                anyhow::bail!("No FASTA files in {}", path.display());
            }
            files.extend(found);
        } else if path.is_file() {
            files.push(path.to_path_buf());
        } else {
            anyhow::bail!("{} not found", path.display());
        }
    }
    Ok(files)
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let inputs: Vec<&String> = args.get_many::<String>("infiles").into_iter().flatten().collect();
    let Some(species) = args.get_one::<String>("species") else {
        anyhow::bail!("--species is required");
    };
    let threads = args.get_one::<usize>("threads").copied().unwrap_or(1);
    let is_force = args.get_flag("force");
    let registry_file = args
        .get_one::<String>("registry")
        .map(PathBuf::from)
        .unwrap_or_else(default_registry_path);
    let registry_file = std::path::absolute(&registry_file)?;

    // fail before the expensive build
    let mut registry = SpeciesRegistry::load(&registry_file)?;
    if registry.species.contains_key(species) && !is_force {
        anyhow::bail!(
            "Species '{}' is already registered in {}, use --force to replace it",
            species,
            registry_file.display()
        );
    }

    if which::which("bowtie2-build").is_err() {
        anyhow::bail!("bowtie2-build not found in PATH. Please install bowtie2 first.");
    }

    let files = collect_fasta(&inputs)?;
    let prefix = match args.get_one::<String>("prefix") {
        Some(p) => PathBuf::from(p),
        None => registry_file
            .parent()
            .unwrap_or(Path::new("."))
            .join("indices")
            .join(species)
            .join(species),
    };
    let prefix = std::path::absolute(&prefix)?;
    if let Some(dir) = prefix.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let joined = files.iter().map(|p| p.to_string_lossy()).join(",");

    let mut cmd = Process::new("bowtie2-build");
    cmd.arg("--threads")
        .arg(threads.to_string())
        .arg(&joined)
        .arg(&prefix);
    log::debug!("Running {:?}", cmd);
    log::info!("Building {} from {} file(s)", prefix.display(), files.len());

    let output = cmd.output()?;
    if !output.status.success() {
        anyhow::bail!(
            "bowtie2-build exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    registry.register(species, &prefix, is_force)?;
    registry.save(&registry_file)?;
    log::info!("Registered '{}' in {}", species, registry_file.display());

    Ok(())
}
