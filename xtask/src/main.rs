// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! `cargo xtask <command>` wraps the checks CI runs on the vote workspace.
//!
//! ### Schema verification
//!
//! `cargo xtask verify-schema` applies the embedded `SQLite` migrations to a
//! scratch in-memory database, introspects the result and compares it with
//! the schema the persistence crate's Diesel table definitions expect. It then
//! reverts every migration and checks that no vote tables remain.
//!
//! ### License headers
//!
//! `cargo xtask lint-headers` checks that every Rust source file of every
//! workspace package opens with the MIT header.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{fmt::Debug, io, path::Path, process::Output, vec};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{eyre::Context, Result};
use diesel::sql_types::{Integer, Text};
use diesel::{QueryableByName, RunQueryDsl, SqliteConnection};
use duct::cmd;
use std::collections::{BTreeMap, BTreeSet};
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

/// Opening lines every workspace source file must carry.
const LICENSE_HEADER: [&str; 3] = [
    "// Use of this source code is governed by an MIT-style",
    "// license that can be found in the LICENSE file or at",
    "// https://opensource.org/licenses/MIT.",
];

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, machete, build, test, schema)
    CI,

    /// Build the workspace
    #[command(visible_alias = "b")]
    Build,

    /// Check unused dependencies
    #[command(visible_alias = "m")]
    Machete,

    /// Lint clippy, formatting and license headers
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the workspace
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check for formatting issues in the workspace
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Check that every source file carries the license header
    #[command(visible_alias = "lh")]
    LintHeaders,

    /// Run every test in the workspace
    #[command(visible_alias = "t")]
    Test,

    /// Verify the migrated vote schema and that migrations revert cleanly
    #[command(visible_alias = "vs")]
    VerifySchema,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Machete => machete(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintFormatting => lint_format(),
            Self::LintHeaders => lint_headers(),
            Self::Test => test(),
            Self::VerifySchema => verify_schema(),
        }
    }
}

fn ci() -> Result<()> {
    lint()?;
    machete()?;
    build()?;
    test()?;
    verify_schema()?;
    Ok(())
}

fn machete() -> Result<()> {
    cmd!("cargo-machete").run_with_trace()?;
    Ok(())
}

fn build() -> Result<()> {
    run_cargo(vec!["build", "--workspace", "--all-targets"])
}

fn lint() -> Result<()> {
    lint_clippy()?;
    lint_format()?;
    lint_headers()?;
    Ok(())
}

fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--workspace",
        "--all-targets",
        "--",
        "-D",
        "warnings",
    ])
}

fn lint_format() -> Result<()> {
    run_cargo(vec!["fmt", "--all", "--check"])
}

/// Checks every `.rs` file under each workspace package's `src/`.
fn lint_headers() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    let mut missing: Vec<String> = Vec::new();
    for package in meta.workspace_packages() {
        let Some(root) = package.manifest_path.parent() else {
            continue;
        };
        collect_missing_headers(root.join("src").as_std_path(), &mut missing)?;
    }

    if missing.is_empty() {
        tracing::info!("all source files carry the license header");
        return Ok(());
    }

    for path in &missing {
        tracing::error!("missing license header: {path}");
    }
    Err(color_eyre::eyre::eyre!(
        "{} file(s) without a license header",
        missing.len()
    ))
}

fn collect_missing_headers(dir: &Path, missing: &mut Vec<String>) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in std::fs::read_dir(dir).wrap_err_with(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.is_dir() {
            collect_missing_headers(&path, missing)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            let source: String = std::fs::read_to_string(&path)
                .wrap_err_with(|| format!("reading {}", path.display()))?;
            if !has_license_header(&source) {
                missing.push(path.display().to_string());
            }
        }
    }
    Ok(())
}

/// The first line names the copyright holder; the next three are fixed.
fn has_license_header(source: &str) -> bool {
    let mut lines = source.lines();
    let copyright: bool = lines
        .next()
        .is_some_and(|line| line.starts_with("// Copyright (C)"));
    copyright && lines.take(LICENSE_HEADER.len()).eq(LICENSE_HEADER)
}

fn test() -> Result<()> {
    run_cargo(vec!["test", "--workspace", "--all-targets"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Verify the vote schema produced by the embedded migrations.
///
/// ## What This Command Does
///
/// 1. Applies every migration to a scratch in-memory `SQLite` database
/// 2. Introspects tables, columns, primary keys, foreign keys and indexes
/// 3. Compares the result with [`expected_schema`]
/// 4. Reverts every migration and checks no vote table is left behind
///
/// ## Failures
///
/// The command fails if a migration does not apply or revert, or if any
/// table, column, key or index differs from what the persistence layer
/// expects.
fn verify_schema() -> Result<()> {
    use diesel::Connection;
    use diesel_migrations::{embed_migrations, MigrationHarness};

    #[allow(clippy::items_after_statements)]
    const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
        embed_migrations!("../crates/persistence/migrations");

    tracing::info!("Starting schema verification");

    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to apply migrations: {}", e))?;
    tracing::info!("Migrations applied");

    let actual = introspect_sqlite_schema(&mut conn)?;
    compare_schemas(&expected_schema(), &actual)?;
    tracing::info!("Migrated schema matches the persistence layer");

    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to revert migrations: {}", e))?;

    let reverted = introspect_sqlite_schema(&mut conn)?;
    if !reverted.tables.is_empty() {
        return Err(color_eyre::eyre::eyre!(
            "Tables left after reverting migrations: {:?}",
            reverted.tables.keys().collect::<Vec<_>>()
        ));
    }
    tracing::info!("Migrations revert cleanly");

    tracing::info!("✓ Schema verification passed");
    Ok(())
}

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    indexes: BTreeSet<Index>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Index {
    name: String,
    columns: Vec<String>,
}

impl Table {
    fn column(mut self, name: &str, normalized_type: &str, nullable: bool) -> Self {
        self.columns.insert(
            name.to_string(),
            Column {
                normalized_type: normalized_type.to_string(),
                nullable,
            },
        );
        self
    }

    fn primary_key(mut self, name: &str) -> Self {
        self.primary_keys.insert(name.to_string());
        self
    }

    fn foreign_key(mut self, from: &str, to_table: &str, to_column: &str) -> Self {
        self.foreign_keys.insert(ForeignKey {
            from_column: from.to_string(),
            to_table: to_table.to_string(),
            to_column: to_column.to_string(),
        });
        self
    }

    fn index(mut self, name: &str, columns: &[&str]) -> Self {
        self.indexes.insert(Index {
            name: name.to_string(),
            columns: columns.iter().map(ToString::to_string).collect(),
        });
        self
    }
}

/// The schema `crates/persistence/src/diesel_schema.rs` is written against.
fn expected_schema() -> Schema {
    let vote_records = Table::default()
        .column("article_id", "text", false)
        .column("upvotes", "integer", false)
        .column("downvotes", "integer", false)
        .column("voters_json", "text", false)
        .column("updated_at", "text", false)
        .primary_key("article_id");

    let vote_ledger = Table::default()
        .column("event_id", "integer", false)
        .column("article_id", "text", false)
        .column("user_id", "text", true)
        .column("actor_json", "text", false)
        .column("cause_json", "text", false)
        .column("action_json", "text", false)
        .column("before_snapshot_json", "text", false)
        .column("after_snapshot_json", "text", false)
        .column("created_at", "text", false)
        .primary_key("event_id")
        .foreign_key("article_id", "vote_records", "article_id")
        .index("idx_vote_ledger_article_id", &["article_id"])
        .index("idx_vote_ledger_user_id", &["user_id"]);

    Schema {
        tables: BTreeMap::from([
            (String::from("vote_ledger"), vote_ledger),
            (String::from("vote_records"), vote_records),
        ]),
    }
}

/// Introspect `SQLite` schema
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        origin: String,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table::default();

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            // SQLite reports INTEGER PRIMARY KEY columns as nullable.
            let nullable = col.notnull == 0 && col.pk == 0;
            table_info = table_info.column(&col.name, &normalize_sqlite_type(&col.r#type), nullable);
            if col.pk > 0 {
                table_info.primary_keys.insert(col.name);
            }
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info = table_info.foreign_key(&fk.from, &fk.table, &fk.to);
        }

        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        // Only explicitly created indexes; primary key and unique autoindexes are skipped.
        for idx in indexes.into_iter().filter(|i| i.origin == "c") {
            let index_columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;

            table_info.indexes.insert(Index {
                name: idx.name,
                columns: index_columns.into_iter().map(|c| c.name).collect(),
            });
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

/// Normalize `SQLite` type to common representation
fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let normalized = sqlite_type.to_uppercase();
    if normalized.contains("INT") {
        "integer".to_string()
    } else if normalized.contains("REAL")
        || normalized.contains("FLOA")
        || normalized.contains("DOUB")
    {
        "real".to_string()
    } else if normalized.contains("BLOB") {
        "blob".to_string()
    } else {
        "text".to_string()
    }
}

/// Compare schemas and fail on mismatch
fn compare_schemas(expected: &Schema, actual: &Schema) -> Result<()> {
    let mut problems: Vec<String> = Vec::new();

    let expected_tables: BTreeSet<&String> = expected.tables.keys().collect();
    let actual_tables: BTreeSet<&String> = actual.tables.keys().collect();

    for missing in expected_tables.difference(&actual_tables) {
        problems.push(format!("table {missing} is missing"));
    }
    for extra in actual_tables.difference(&expected_tables) {
        problems.push(format!("unexpected table {extra}"));
    }

    for (name, want) in &expected.tables {
        let Some(got) = actual.tables.get(name) else {
            continue;
        };

        for (column, wanted) in &want.columns {
            match got.columns.get(column) {
                None => problems.push(format!("{name}.{column} is missing")),
                Some(found) if found != wanted => problems.push(format!(
                    "{name}.{column}: expected {wanted:?}, found {found:?}"
                )),
                Some(_) => {}
            }
        }
        for column in got.columns.keys() {
            if !want.columns.contains_key(column) {
                problems.push(format!("unexpected column {name}.{column}"));
            }
        }

        if want.primary_keys != got.primary_keys {
            problems.push(format!(
                "{name} primary key: expected {:?}, found {:?}",
                want.primary_keys, got.primary_keys
            ));
        }
        if want.foreign_keys != got.foreign_keys {
            problems.push(format!(
                "{name} foreign keys: expected {:?}, found {:?}",
                want.foreign_keys, got.foreign_keys
            ));
        }
        if want.indexes != got.indexes {
            problems.push(format!(
                "{name} indexes: expected {:?}, found {:?}",
                want.indexes, got.indexes
            ));
        }
    }

    if problems.is_empty() {
        return Ok(());
    }

    for problem in &problems {
        tracing::error!("schema mismatch: {problem}");
    }
    Err(color_eyre::eyre::eyre!(
        "{} schema mismatch(es) found",
        problems.len()
    ))
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::has_license_header;

    #[test]
    fn test_header_with_any_copyright_holder_is_accepted() {
        let source = "// Copyright (C) 2026 Fred Clausen\n\
                      // Use of this source code is governed by an MIT-style\n\
                      // license that can be found in the LICENSE file or at\n\
                      // https://opensource.org/licenses/MIT.\n\
                      \n\
                      fn main() {}\n";
        assert!(has_license_header(source));
    }

    #[test]
    fn test_missing_or_truncated_header_is_rejected() {
        assert!(!has_license_header("fn main() {}\n"));
        assert!(!has_license_header(
            "// Copyright (C) 2026 Fred Clausen\n\
             // Use of this source code is governed by an MIT-style\n"
        ));
    }
}
