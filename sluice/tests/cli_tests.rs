use anyhow::Result;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Scratch directory the binary runs in.
struct SluiceTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl SluiceTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().to_path_buf();
        Ok(Self { _tmp: tmp, root })
    }

    fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    fn seed_duckdb(&self, name: &str) -> Result<PathBuf> {
        let path = self.root.join(name);
        let conn = duckdb::Connection::open(&path)?;
        conn.execute_batch(
            "CREATE TABLE customers (id INTEGER, name VARCHAR, city VARCHAR);
             INSERT INTO customers VALUES (1, 'Ada', 'London'), (2, 'Grace', NULL), (3, 'Linus', 'Helsinki, FI');",
        )?;
        drop(conn);
        Ok(path)
    }

    fn sluice(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sluice"));
        cmd.current_dir(&self.root);
        cmd.env_remove("SLUICE_DB_PASSWORD");
        cmd.env_remove("SLUICE_BI_PASSWORD");
        cmd
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn test_compare_identical_files() -> Result<()> {
    let env = SluiceTestEnv::new()?;
    env.write("a.csv", "1,Ada\n2,Grace\n")?;
    env.write("b.csv", "1,Ada\n2,Grace\n")?;

    env.sluice()
        .args(["compare", "a.csv", "b.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The two CSV files are identical."));
    Ok(())
}

#[test]
fn test_compare_different_files_exits_one() -> Result<()> {
    let env = SluiceTestEnv::new()?;
    env.write("a.csv", "1,Ada\n2,Grace\n")?;
    env.write("b.csv", "1,Ada\n2,Hopper\n")?;

    env.sluice()
        .args(["compare", "a.csv", "b.csv"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("not identical"))
        .stdout(predicate::str::contains("Row 2:"))
        .stdout(predicate::str::contains(
            "Column 2: 'Grace' (file1) != 'Hopper' (file2)",
        ));
    Ok(())
}

#[test]
fn test_compare_extra_blank_line_is_reported() -> Result<()> {
    let env = SluiceTestEnv::new()?;
    env.write("a.csv", "1,Ada\n\n2,Grace\n")?;
    env.write("b.csv", "1,Ada\n2,Grace\n")?;

    env.sluice()
        .args(["compare", "a.csv", "b.csv"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Row 2:"))
        .stdout(predicate::str::contains("Row counts differ: 3 (file1) vs 2 (file2)"));
    Ok(())
}

#[test]
fn test_compare_missing_file_exits_two() -> Result<()> {
    let env = SluiceTestEnv::new()?;
    env.write("a.csv", "x\n")?;

    env.sluice()
        .args(["compare", "a.csv", "nope.csv"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nope.csv"));
    Ok(())
}

#[test]
fn test_export_inline_duckdb() -> Result<()> {
    let env = SluiceTestEnv::new()?;
    let db = env.seed_duckdb("shop.duckdb")?;

    env.sluice()
        .args([
            "export",
            "--engine",
            "duckdb",
            "--database",
            &path_arg(&db),
            "--query",
            "SELECT id, name, city FROM customers ORDER BY id",
            "--output",
            "out.csv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 rows written"));

    assert_eq!(
        fs::read_to_string(env.root.join("out.csv"))?,
        "1,Ada,London\n2,Grace,\n3,Linus,\"Helsinki, FI\"\n"
    );
    Ok(())
}

#[test]
fn test_export_named_profile_with_header() -> Result<()> {
    let env = SluiceTestEnv::new()?;
    let db = env.seed_duckdb("shop.duckdb")?;
    env.write(
        "sluice.yaml",
        &format!(
            "connections:\n  shop:\n    engine: duckdb\n    database: '{}'\n",
            path_arg(&db)
        ),
    )?;

    env.sluice()
        .args([
            "export",
            "--profile",
            "shop",
            "-q",
            "SELECT name FROM customers WHERE id = 1",
            "-o",
            "ada.csv",
            "--header",
        ])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(env.root.join("ada.csv"))?, "name\nAda\n");
    Ok(())
}

#[test]
fn test_export_unknown_profile_lists_known_ones() -> Result<()> {
    let env = SluiceTestEnv::new()?;
    env.write(
        "sluice.yaml",
        "connections:\n  shop:\n    engine: duckdb\n    database: ':memory:'\n",
    )?;

    env.sluice()
        .args(["export", "--profile", "warehouse", "-q", "SELECT 1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("warehouse"))
        .stderr(predicate::str::contains("shop"));
    Ok(())
}

#[test]
fn test_export_unsupported_engine() -> Result<()> {
    let env = SluiceTestEnv::new()?;

    env.sluice()
        .args(["export", "--engine", "informix", "-q", "SELECT 1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("informix"));
    Ok(())
}

#[test]
fn test_export_bad_query_leaves_no_file() -> Result<()> {
    let env = SluiceTestEnv::new()?;

    env.sluice()
        .args([
            "export",
            "--engine",
            "duckdb",
            "--database",
            ":memory:",
            "-q",
            "SELECT * FROM missing_table",
            "-o",
            "out.csv",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Export failed"));

    assert!(!env.root.join("out.csv").exists());
    Ok(())
}

#[test]
fn test_bi_without_settings_fails() -> Result<()> {
    let env = SluiceTestEnv::new()?;

    env.sluice()
        .args(["bi", "projects"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("BI request failed"));
    Ok(())
}
