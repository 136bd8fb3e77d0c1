use ::duckdb::Connection;

struct Migration {
    version: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_countries",
        sql: r#"
CREATE SEQUENCE IF NOT EXISTS countries_id_seq START 1;

CREATE TABLE IF NOT EXISTS countries (
    name_key TEXT PRIMARY KEY,
    id BIGINT NOT NULL DEFAULT nextval('countries_id_seq'),
    name TEXT NOT NULL CHECK (length(trim(name)) > 0),
    capital TEXT,
    region TEXT,
    population BIGINT NOT NULL DEFAULT 0 CHECK (population >= 0),
    currency_code TEXT,
    exchange_rate DOUBLE,
    estimated_gdp DOUBLE,
    flag_url TEXT,
    last_refreshed_at TIMESTAMP NOT NULL
);
"#,
    },
];

/// Apply every migration that has not been recorded in `schema_migrations`.
pub fn apply_migrations(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    )?;

    for migration in MIGRATIONS {
        let applied_count: i64 = connection.query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE version = ?",
            [migration.version],
            |row| row.get(0),
        )?;

        if applied_count == 0 {
            connection.execute_batch(migration.sql)?;
            connection.execute(
                "INSERT INTO schema_migrations (version) VALUES (?)",
                [migration.version],
            )?;
        }
    }

    Ok(())
}
