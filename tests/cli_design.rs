use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

const B1_ODD: &str = "gAggAgggCAgCAAACggAA";
const B1_EVEN: &str = "TAgAAgAgTCTTCCTTTACg";

// thresholds that let every 10-mer through
const RELAXED: [&str; 14] = [
    "-l",
    "10",
    "--min-gc",
    "0",
    "--max-gc",
    "100",
    "--min-gibbs",
    "-1000",
    "--max-gibbs",
    "1000",
    "--target-gibbs",
    "0",
    "--max-run-length",
    "999",
];

#[test]
fn command_design_single_window() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("hcrpd");
    let output = cmd
        .arg("design")
        .arg("tests/hcr/target1.fa")
        .args(RELAXED)
        .arg("-c")
        .arg("B1")
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;

    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("name\tprobe\tstart\tlength\tP1\tP2\tchannel"));

    let fields: Vec<&str> = lines[1].split('\t').collect();
    assert!(fields[0].starts_with("target1:"));
    assert_eq!(fields[1], "gtacgtacgt");
    assert_eq!(fields[2], "1");
    assert_eq!(fields[3], "10");
    assert!(fields[4].starts_with(B1_ODD));
    assert!(fields[5].ends_with(B1_EVEN));
    assert_eq!(fields[6], "B1");

    Ok(())
}

#[test]
fn command_design_idt_side_output() -> anyhow::Result<()> {
    let tempdir = TempDir::new()?;
    let table = tempdir.path().join("probes.tsv");
    let order = tempdir.path().join("order.tsv");

    let mut cmd = cargo_bin_cmd!("hcrpd");
    cmd.arg("design")
        .arg("tests/hcr/target1.fa")
        .args(RELAXED)
        .arg("-o")
        .arg(&table)
        .arg("--idt")
        .arg(&order)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let table = std::fs::read_to_string(&table)?;
    assert_eq!(table.lines().count(), 2);
    assert!(table.starts_with("name\tprobe\tstart"));

    let order = std::fs::read_to_string(&order)?;
    let lines: Vec<&str> = order.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Name\tSequence");
    assert!(lines[1].starts_with("target1:1-11:B1:odd\t"));
    assert!(lines[1].contains(B1_ODD));
    assert!(lines[2].starts_with("target1:1-11:B1:even\t"));
    assert!(lines[2].ends_with(B1_EVEN));

    Ok(())
}

#[test]
fn command_design_stdin() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("hcrpd");
    cmd.arg("design")
        .arg("stdin")
        .args(RELAXED)
        .write_stdin(">t\nACGTACGTAC\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("t:1-11\tgtacgtacgt"));

    Ok(())
}

#[test]
fn command_design_formats() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("hcrpd");
    let output = cmd
        .arg("design")
        .arg("tests/hcr/target1.fa")
        .args(RELAXED)
        .arg("-c")
        .arg("B2")
        .arg("--format")
        .arg("idt")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    let names: Vec<&str> = stdout
        .lines()
        .filter_map(|l| l.split('\t').next())
        .collect();
    assert_eq!(
        names,
        vec!["Name", "target1:1-11:B2:odd", "target1:1-11:B2:even"]
    );

    let mut cmd = cargo_bin_cmd!("hcrpd");
    let output = cmd
        .arg("design")
        .arg("tests/hcr/target1.fa")
        .args(RELAXED)
        .arg("--format")
        .arg("json")
        .output()?;
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(rows.as_array().map(|a| a.len()), Some(1));
    assert_eq!(rows[0]["sequence"], "gtacgtacgt");
    assert_eq!(rows[0]["channel"], "B1");

    Ok(())
}

#[test]
fn command_design_outfile_multi() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let outfile = temp_dir.path().join("probes.tsv");

    let mut cmd = cargo_bin_cmd!("hcrpd");
    cmd.arg("design")
        .arg("tests/hcr/two.fa")
        .args(RELAXED)
        .arg("-n")
        .arg("3")
        .arg("-p")
        .arg("2")
        .arg("-o")
        .arg(&outfile)
        .assert()
        .success();

    let content = std::fs::read_to_string(&outfile)?;
    let names: Vec<&str> = content
        .lines()
        .skip(1)
        .filter_map(|l| l.split(':').next())
        .collect();
    assert_eq!(names.len(), 6);
    // records stay in input order
    assert!(names[..3].iter().all(|n| *n == "geneA"));
    assert!(names[3..].iter().all(|n| *n == "geneB"));

    Ok(())
}

#[test]
fn command_design_short_target() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("hcrpd");
    let output = cmd.arg("design").arg("tests/hcr/target1.fa").output()?;
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout)?.lines().count(), 1);

    Ok(())
}

#[test]
fn command_design_bad_channel() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("hcrpd");
    cmd.arg("design")
        .arg("tests/hcr/target1.fa")
        .arg("-c")
        .arg("B9")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown channel"));

    Ok(())
}

#[test]
fn command_design_conflicting_bounds() -> anyhow::Result<()> {
    let mut cmd = cargo_bin_cmd!("hcrpd");
    cmd.arg("design")
        .arg("tests/hcr/target1.fa")
        .arg("--min-gc")
        .arg("60")
        .arg("--max-gc")
        .arg("40")
        .assert()
        .failure()
        .stderr(predicate::str::contains("min GC"));

    let mut cmd = cargo_bin_cmd!("hcrpd");
    cmd.arg("design")
        .arg("tests/hcr/target1.fa")
        .arg("--min-gibbs")
        .arg("-40")
        .arg("--max-gibbs")
        .arg("-60")
        .assert()
        .failure()
        .stderr(predicate::str::contains("min Gibbs"));

    Ok(())
}

#[test]
fn command_design_unknown_species() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let registry = temp_dir.path().join("species.json");
    std::fs::write(
        &registry,
        r#"{"species": {"mouse": {"bowtie2_index": "indices/mouse/mouse"}}}"#,
    )?;

    let mut cmd = cargo_bin_cmd!("hcrpd");
    cmd.arg("design")
        .arg("tests/hcr/target1.fa")
        .arg("--species")
        .arg("yeti")
        .arg("--registry")
        .arg(&registry)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not registered"))
        .stderr(predicate::str::contains("mouse"));

    Ok(())
}

#[cfg(unix)]
fn fake_bowtie2(dir: &std::path::Path, hits: usize) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("bowtie2");
    let script = format!(
        r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    -U) reads="$2"; shift ;;
    -S) out="$2"; shift ;;
  esac
  shift
done
echo "@HD	VN:1.0" > "$out"
grep '^>' "$reads" | sed 's/^>//' | while read name; do
  i=0
  while [ $i -lt {hits} ]; do
    printf '%s\t0\tchr1\t1\t42\t10M\t*\t0\t0\t*\t*\n' "$name" >> "$out"
    i=$((i + 1))
  done
done
"#
    );
    std::fs::write(&path, script)?;
    let mut perms = std::fs::metadata(&path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms)?;
    Ok(())
}

#[cfg(unix)]
fn path_with(dir: &std::path::Path) -> String {
    format!(
        "{}:{}",
        dir.display(),
        std::env::var("PATH").unwrap_or_default()
    )
}

#[cfg(unix)]
#[test]
fn command_design_genome_mask() -> anyhow::Result<()> {
    // one hit per tile: unique, kept
    let temp_dir = TempDir::new()?;
    fake_bowtie2(temp_dir.path(), 1)?;

    let mut cmd = cargo_bin_cmd!("hcrpd");
    let output = cmd
        .env("PATH", path_with(temp_dir.path()))
        .arg("design")
        .arg("tests/hcr/target1.fa")
        .args(RELAXED)
        .arg("--index")
        .arg(temp_dir.path().join("genome"))
        .output()?;
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout)?.lines().count(), 2);

    // two hits per tile: rejected
    let temp_dir = TempDir::new()?;
    fake_bowtie2(temp_dir.path(), 2)?;

    let mut cmd = cargo_bin_cmd!("hcrpd");
    let output = cmd
        .env("PATH", path_with(temp_dir.path()))
        .arg("design")
        .arg("tests/hcr/target1.fa")
        .args(RELAXED)
        .arg("--index")
        .arg(temp_dir.path().join("genome"))
        .output()?;
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout)?.lines().count(), 1);

    Ok(())
}

#[cfg(unix)]
#[test]
fn command_design_aligner_failure() -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("bowtie2");
    std::fs::write(&path, "#!/bin/sh\necho 'could not locate index' >&2\nexit 1\n")?;
    let mut perms = std::fs::metadata(&path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms)?;

    let mut cmd = cargo_bin_cmd!("hcrpd");
    cmd.env("PATH", path_with(temp_dir.path()))
        .arg("design")
        .arg("tests/hcr/target1.fa")
        .args(RELAXED)
        .arg("--index")
        .arg(temp_dir.path().join("genome"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not locate index"));

    Ok(())
}
