//! Database views for analytical queries.

use ::duckdb::Connection;

/// Create database views for common analytical queries.
///
/// Creates the following views:
/// - `vw_gdp_ranking`: countries with a known estimated GDP, ranked descending
/// - `vw_region_summary`: country count, population and GDP totals per region
///
/// # Errors
/// Returns an error if the view creation SQL fails to execute.
pub fn create_views(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch(
        r"
CREATE OR REPLACE VIEW vw_gdp_ranking AS
SELECT
    name_key,
    name,
    estimated_gdp,
    ROW_NUMBER() OVER (ORDER BY estimated_gdp DESC, name_key) AS gdp_rank
FROM countries
WHERE estimated_gdp IS NOT NULL;

CREATE OR REPLACE VIEW vw_region_summary AS
SELECT
    region,
    COUNT(*)::BIGINT AS country_count,
    SUM(population)::BIGINT AS total_population,
    SUM(estimated_gdp)::DOUBLE AS total_estimated_gdp
FROM countries
GROUP BY region;
",
    )?;

    Ok(())
}
