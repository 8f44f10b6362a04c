// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask
//!
//! Project automation for the `PlantLog` workspace.
//!
//! - `cargo xtask ci` runs formatting, clippy, docs and the test suite.
//! - `cargo xtask test-mariadb` runs the ignored persistence tests against a
//!   throwaway `MariaDB` container.
//! - `cargo xtask verify-migrations` applies both migration sets and fails if
//!   the resulting `SQLite` and `MySQL` schemas disagree.
//!
//! Plain `cargo test` never needs Docker.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::Debug,
    io,
    process::Output,
    thread::sleep,
    time::Duration,
};

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use diesel::{
    Connection, MysqlConnection, QueryableByName, RunQueryDsl, SqliteConnection,
    sql_types::{Integer, Text},
};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const SQLITE_MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");
const MYSQL_MIGRATIONS: EmbeddedMigrations =
    embed_migrations!("../crates/persistence/migrations_mysql");

const PERSISTENCE_PACKAGE: &str = "plantlog-persistence";

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
    /// Run CI checks (lint, build, test)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Lint formatting, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run `MariaDB` backend validation tests
    #[command(visible_alias = "tm")]
    TestMariadb,

    /// Verify schema parity between `SQLite` and `MySQL` migrations
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::FixFormatting => fix_format(),
            Self::Test => test(),
            Self::TestMariadb => test_mariadb(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Run CI checks (lint, build, test)
fn ci() -> Result<()> {
    lint()?;
    build()?;
    test()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Lint formatting, clippy, and docs
fn lint() -> Result<()> {
    lint_format()?;
    lint_clippy()?;
    lint_docs()?;
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--tests",
        "--benches",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check documentation for errors and warnings
fn lint_docs() -> Result<()> {
    cmd!(
        "cargo",
        "doc",
        "--no-deps",
        "--all-features",
        "--document-private-items",
        "--workspace"
    )
    .env("RUSTDOCFLAGS", "-D warnings")
    .run_with_trace()?;
    Ok(())
}

/// Check for formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo(vec!["fmt", "--all"])
}

/// Run tests
fn test() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features", "--workspace"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// A disposable `MariaDB` 11 container.
///
/// Dropping the value stops and removes the container, so every exit path
/// (including `?`) cleans up.
struct MariadbContainer {
    name: &'static str,
    database: &'static str,
    user: &'static str,
    password: &'static str,
    port: &'static str,
}

impl MariadbContainer {
    fn start(
        name: &'static str,
        database: &'static str,
        password: &'static str,
        port: &'static str,
    ) -> Result<Self> {
        tracing::info!("Checking Docker availability");
        cmd!("docker", "--version")
            .run_with_trace()
            .wrap_err("Docker is not available. Please install Docker.")?;

        let container = Self {
            name,
            database,
            user: "plantlog",
            password,
            port,
        };
        container.remove();

        tracing::info!("Starting MariaDB container: {}", container.name);
        cmd!(
            "docker",
            "run",
            "--name",
            container.name,
            "-e",
            format!("MARIADB_DATABASE={}", container.database),
            "-e",
            format!("MARIADB_USER={}", container.user),
            "-e",
            format!("MARIADB_PASSWORD={}", container.password),
            "-e",
            "MARIADB_ROOT_PASSWORD=root_password",
            "-p",
            format!("{}:3306", container.port),
            "-d",
            "mariadb:11"
        )
        .run_with_trace()
        .wrap_err("Failed to start MariaDB container")?;

        container.wait_until_ready()?;
        Ok(container)
    }

    fn wait_until_ready(&self) -> Result<()> {
        tracing::info!("Waiting for MariaDB to be ready...");
        let max_attempts = 30;

        for attempt in 1..=max_attempts {
            sleep(Duration::from_secs(1));
            tracing::debug!("Connection attempt {}/{}", attempt, max_attempts);

            let probe = cmd!(
                "docker",
                "exec",
                self.name,
                "mariadb",
                "-u",
                self.user,
                format!("-p{}", self.password),
                "-e",
                "SELECT 1"
            )
            .stdout_null()
            .stderr_null()
            .run();

            if probe.is_ok() {
                tracing::info!("MariaDB is ready");
                return Ok(());
            }
        }

        Err(eyre!("MariaDB did not become ready within timeout"))
    }

    fn url(&self) -> String {
        format!(
            "mysql://{}:{}@127.0.0.1:{}/{}",
            self.user, self.password, self.port, self.database
        )
    }

    fn remove(&self) {
        let _ = cmd!("docker", "stop", self.name)
            .stdout_null()
            .stderr_null()
            .run();
        let _ = cmd!("docker", "rm", self.name)
            .stdout_null()
            .stderr_null()
            .run();
    }
}

impl Drop for MariadbContainer {
    fn drop(&mut self) {
        tracing::info!("Removing MariaDB container {}", self.name);
        self.remove();
    }
}

/// Run `MariaDB` backend validation tests
///
/// Starts a `MariaDB` container on port 3307, then runs the ignored
/// `backend_validation_tests` of the persistence crate with `DATABASE_URL` and
/// `PLANTLOG_TEST_BACKEND=mariadb` set. The container is removed afterwards
/// whether or not the tests pass.
fn test_mariadb() -> Result<()> {
    tracing::info!("Starting MariaDB backend validation");

    let container =
        MariadbContainer::start("plantlog-test-mariadb", "plantlog_test", "test_password", "3307")?;

    tracing::info!("Running MariaDB backend validation tests");
    cmd!(
        "cargo",
        "test",
        "--package",
        PERSISTENCE_PACKAGE,
        "backend_validation_tests",
        "--",
        "--ignored",
        "--test-threads=1"
    )
    .env("DATABASE_URL", container.url())
    .env("PLANTLOG_TEST_BACKEND", "mariadb")
    .run_with_trace()
    .wrap_err("MariaDB backend validation tests failed")?;

    tracing::info!("MariaDB backend validation completed successfully");
    Ok(())
}

/// Verify schema parity between `SQLite` and `MySQL` migrations
///
/// Applies `migrations/` to an in-memory `SQLite` database and
/// `migrations_mysql/` to a `MariaDB` container on port 3308, then compares
/// tables, column types, nullability, primary keys and foreign keys.
fn verify_migrations() -> Result<()> {
    tracing::info!("Starting schema parity verification");

    let container = MariadbContainer::start(
        "plantlog-verify-migrations",
        "plantlog_verify",
        "verify_password",
        "3308",
    )?;

    tracing::info!("Applying SQLite migrations");
    let mut sqlite_conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;
    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut sqlite_conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;
    sqlite_conn
        .run_pending_migrations(SQLITE_MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply SQLite migrations: {e}"))?;

    tracing::info!("Applying MySQL migrations");
    let mut mysql_conn =
        MysqlConnection::establish(&container.url()).wrap_err("Failed to connect to MariaDB")?;
    mysql_conn
        .run_pending_migrations(MYSQL_MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply MySQL migrations: {e}"))?;

    let sqlite_schema = introspect_sqlite_schema(&mut sqlite_conn)?;
    let mysql_schema = introspect_mysql_schema(&mut mysql_conn, container.database)?;

    compare_schemas(&sqlite_schema, &mysql_schema)?;
    tracing::info!("Schema parity verification passed");
    Ok(())
}

/// Table name to its normalized shape.
type Schema = BTreeMap<String, TableShape>;

#[derive(Debug, Default, PartialEq, Eq)]
struct TableShape {
    /// Column name to `(normalized type, nullable)`.
    columns: BTreeMap<String, (&'static str, bool)>,
    primary_keys: BTreeSet<String>,
    /// `(column, referenced table, referenced column)`.
    foreign_keys: BTreeSet<(String, String, String)>,
}

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

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' \
         AND name != '__diesel_schema_migrations' ORDER BY name",
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    let mut schema = Schema::new();
    for table in tables {
        let mut shape = TableShape::default();

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;
        for column in columns {
            if column.pk > 0 {
                shape.primary_keys.insert(column.name.clone());
            }
            shape.columns.insert(
                column.name,
                (normalize_type(&column.r#type), column.notnull == 0),
            );
        }

        let foreign_keys: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get foreign keys for table {}", table.name))?;
        shape.foreign_keys = foreign_keys
            .into_iter()
            .map(|fk| (fk.from, fk.table, fk.to))
            .collect();

        schema.insert(table.name, shape);
    }

    Ok(schema)
}

fn introspect_mysql_schema(conn: &mut MysqlConnection, database: &str) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        table_name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        column_name: String,
        #[diesel(sql_type = Text)]
        data_type: String,
        #[diesel(sql_type = Text)]
        is_nullable: String,
        #[diesel(sql_type = Text)]
        column_key: String,
    }

    #[derive(QueryableByName)]
    #[allow(clippy::struct_field_names)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        column_name: String,
        #[diesel(sql_type = Text)]
        referenced_table_name: String,
        #[diesel(sql_type = Text)]
        referenced_column_name: String,
    }

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT table_name FROM information_schema.tables WHERE table_schema = ? \
         AND table_name != '__diesel_schema_migrations' ORDER BY table_name",
    )
    .bind::<Text, _>(database)
    .load(conn)
    .wrap_err("Failed to query MySQL tables")?;

    let mut schema = Schema::new();
    for table in tables {
        let mut shape = TableShape::default();

        let columns: Vec<ColumnInfo> = diesel::sql_query(
            "SELECT column_name, data_type, is_nullable, column_key FROM information_schema.columns \
             WHERE table_schema = ? AND table_name = ? ORDER BY ordinal_position",
        )
        .bind::<Text, _>(database)
        .bind::<Text, _>(&table.table_name)
        .load(conn)
        .wrap_err(format!("Failed to get columns for table {}", table.table_name))?;
        for column in columns {
            if column.column_key == "PRI" {
                shape.primary_keys.insert(column.column_name.clone());
            }
            shape.columns.insert(
                column.column_name,
                (normalize_type(&column.data_type), column.is_nullable == "YES"),
            );
        }

        let foreign_keys: Vec<ForeignKeyInfo> = diesel::sql_query(
            "SELECT column_name, referenced_table_name, referenced_column_name \
             FROM information_schema.key_column_usage \
             WHERE table_schema = ? AND table_name = ? AND referenced_table_name IS NOT NULL",
        )
        .bind::<Text, _>(database)
        .bind::<Text, _>(&table.table_name)
        .load(conn)
        .wrap_err(format!(
            "Failed to get foreign keys for table {}",
            table.table_name
        ))?;
        shape.foreign_keys = foreign_keys
            .into_iter()
            .map(|fk| {
                (
                    fk.column_name,
                    fk.referenced_table_name,
                    fk.referenced_column_name,
                )
            })
            .collect();

        schema.insert(table.table_name, shape);
    }

    Ok(schema)
}

/// Collapses backend type names onto `integer`, `real`, `blob` or `text`.
fn normalize_type(raw: &str) -> &'static str {
    let upper = raw.to_uppercase();
    if upper.contains("INT") {
        "integer"
    } else if upper.contains("REAL")
        || upper.contains("FLOA")
        || upper.contains("DOUB")
        || upper.contains("DECIMAL")
    {
        "real"
    } else if upper.contains("BLOB") || upper.contains("BINARY") {
        "blob"
    } else {
        "text"
    }
}

fn compare_schemas(sqlite: &Schema, mysql: &Schema) -> Result<()> {
    let mut problems: Vec<String> = Vec::new();

    let sqlite_tables: BTreeSet<&String> = sqlite.keys().collect();
    let mysql_tables: BTreeSet<&String> = mysql.keys().collect();
    for table in sqlite_tables.symmetric_difference(&mysql_tables) {
        let side = if sqlite.contains_key(*table) {
            "SQLite"
        } else {
            "MySQL"
        };
        problems.push(format!("  - Table '{table}' only exists in {side}"));
    }

    for (name, sqlite_shape) in sqlite {
        let Some(mysql_shape) = mysql.get(name) else {
            continue;
        };

        for (column, sqlite_column) in &sqlite_shape.columns {
            match mysql_shape.columns.get(column) {
                None => problems.push(format!("  - Column '{name}.{column}' missing in MySQL")),
                Some(mysql_column) if mysql_column != sqlite_column => problems.push(format!(
                    "  - Column '{name}.{column}' differs: SQLite {sqlite_column:?}, MySQL {mysql_column:?}"
                )),
                Some(_) => {}
            }
        }
        for column in mysql_shape.columns.keys() {
            if !sqlite_shape.columns.contains_key(column) {
                problems.push(format!("  - Column '{name}.{column}' missing in SQLite"));
            }
        }

        if sqlite_shape.primary_keys != mysql_shape.primary_keys {
            problems.push(format!("  - Primary key of '{name}' differs"));
        }
        if sqlite_shape.foreign_keys != mysql_shape.foreign_keys {
            problems.push(format!(
                "  - Foreign keys of '{name}' differ: SQLite {:?}, MySQL {:?}",
                sqlite_shape.foreign_keys, mysql_shape.foreign_keys
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(eyre!(
            "Schema parity check failed:\n{}",
            problems.join("\n")
        ))
    }
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
