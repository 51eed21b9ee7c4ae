use crate::error::{DatabaseError, DatabaseErrorExt};
use fxhash::FxHashMap;
use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::types::SurrealValue;

/// Creates the migration ledger and the identity counters. Safe to run on every start.
const BOOTSTRAP: &str = include_str!("../migrations/bootstrap.surql");

/// A schema script owned by one feature slice.
///
/// `(slice, version)` identifies the migration; versions sort lexically within a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    pub slice: &'static str,
    pub version: &'static str,
    pub script: &'static str,
}

impl Migration {
    #[must_use]
    pub const fn new(slice: &'static str, version: &'static str, script: &'static str) -> Self {
        Self { slice, version, script }
    }

    /// Hex-encoded SHA-256 of the script.
    #[must_use]
    pub fn checksum(&self) -> String {
        hex::encode(Sha256::digest(self.script.as_bytes()))
    }

    fn key(&self) -> String {
        format!("{}:{}", self.slice, self.version)
    }
}

/// Outcome of a migration run.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub applied: Vec<AppliedMigration>,
    pub skipped: Vec<AppliedMigration>,
}

#[derive(Debug, Clone, PartialEq, Eq, SurrealValue)]
pub struct AppliedMigration {
    pub slice: String,
    pub version: String,
    pub checksum: String,
}

impl AppliedMigration {
    fn key(&self) -> String {
        format!("{}:{}", self.slice, self.version)
    }
}

impl From<&Migration> for AppliedMigration {
    fn from(migration: &Migration) -> Self {
        Self {
            slice: migration.slice.to_owned(),
            version: migration.version.to_owned(),
            checksum: migration.checksum(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct MigrationRunner<'a> {
    db: &'a Surreal<Any>,
    migrations: &'a [Migration],
}

impl<'a> MigrationRunner<'a> {
    pub(crate) const fn new(db: &'a Surreal<Any>, migrations: &'a [Migration]) -> Self {
        Self { db, migrations }
    }

    pub(crate) async fn run(&self) -> Result<MigrationReport, DatabaseError> {
        self.db
            .query(BOOTSTRAP)
            .await
            .context("Bootstrapping migration ledger")?
            .check()
            .map_err(surrealdb::Error::from)?;

        let applied = self.applied().await?;
        let mut report = MigrationReport::default();

        for migration in self.migrations {
            let entry = AppliedMigration::from(migration);
            if let Some(existing) = applied.get(&migration.key()) {
                ensure_checksum_match(&entry, &existing.checksum)?;
                report.skipped.push(entry);
                continue;
            }

            self.apply(migration, &entry.checksum).await?;
            report.applied.push(entry);
        }

        Ok(report)
    }

    async fn applied(&self) -> Result<FxHashMap<String, AppliedMigration>, DatabaseError> {
        let entries = self
            .db
            .query("SELECT slice, version, checksum FROM migration")
            .await
            .context("Loading applied migrations")?
            .take::<Vec<AppliedMigration>>(0)
            .context("Parsing applied migrations")?;

        Ok(entries.into_iter().map(|entry| (entry.key(), entry)).collect())
    }

    async fn apply(&self, migration: &Migration, checksum: &str) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE migration CONTENT {{ slice: $slice, version: $version, checksum: $checksum }} RETURN NONE;
            COMMIT TRANSACTION;",
            migration.script,
        );

        self.db
            .query(query)
            .bind(("slice", migration.slice.to_owned()))
            .bind(("version", migration.version.to_owned()))
            .bind(("checksum", checksum.to_owned()))
            .await
            .context(format!("Applying migration {}", migration.key()))?
            .check()
            .map_err(surrealdb::Error::from)?;

        Ok(())
    }
}

fn ensure_checksum_match(migration: &AppliedMigration, recorded: &str) -> Result<(), DatabaseError> {
    if recorded == migration.checksum {
        return Ok(());
    }

    Err(DatabaseError::Migration {
        message: format!(
            "Checksum mismatch for {} (recorded {recorded}, script {})",
            migration.key(),
            migration.checksum
        )
        .into(),
        context: Some("Applied migrations must not be edited".into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::engine::any::connect;

    const TABLE_V1: Migration = Migration::new("demo", "0001", "DEFINE TABLE demo SCHEMALESS;");

    async fn memory() -> Surreal<Any> {
        let db = connect("mem://").await.expect("mem engine");
        db.use_ns("test").use_db("migrations").await.expect("session");
        db
    }

    #[test]
    fn checksum_is_stable_hex_sha256() {
        let checksum = TABLE_V1.checksum();
        assert_eq!(checksum.len(), 64);
        assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(checksum, TABLE_V1.checksum());
        assert_ne!(checksum, Migration::new("demo", "0001", "DEFINE TABLE other;").checksum());
    }

    #[tokio::test]
    async fn applies_once_then_skips() {
        let db = memory().await;
        let migrations = [TABLE_V1];

        let first = MigrationRunner::new(&db, &migrations).run().await.expect("first run");
        assert_eq!(first.applied.len(), 1);
        assert!(first.skipped.is_empty());

        let second = MigrationRunner::new(&db, &migrations).run().await.expect("second run");
        assert!(second.applied.is_empty());
        assert_eq!(second.skipped, vec![AppliedMigration::from(&TABLE_V1)]);
    }

    #[tokio::test]
    async fn edited_migration_is_rejected() {
        let db = memory().await;
        MigrationRunner::new(&db, &[TABLE_V1]).run().await.expect("first run");

        let edited = Migration::new("demo", "0001", "DEFINE TABLE demo SCHEMAFULL;");
        let err = MigrationRunner::new(&db, &[edited]).run().await.unwrap_err();
        assert!(matches!(err, DatabaseError::Migration { .. }));
    }

    #[tokio::test]
    async fn failing_script_leaves_no_ledger_entry() {
        let db = memory().await;
        let broken = Migration::new("demo", "0002", "THIS IS NOT SURQL;");

        assert!(MigrationRunner::new(&db, &[broken]).run().await.is_err());

        let report = MigrationRunner::new(&db, &[]).run().await.expect("bootstrap only");
        assert!(report.applied.is_empty());
        let recorded: Vec<AppliedMigration> = db
            .query("SELECT slice, version, checksum FROM migration")
            .await
            .expect("query")
            .take(0)
            .expect("rows");
        assert!(recorded.is_empty());
    }
}
