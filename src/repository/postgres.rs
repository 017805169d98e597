//! PostgreSQL document store.
//!
//! Records live in the `livres` table: the attribute map as JSONB and the
//! checkout marker as `field9`. Text orderings use the "C" collation so that
//! titles compare bytewise.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, Pool, Postgres, QueryBuilder};

use super::CatalogStore;
use crate::{
    config::StoreConfig,
    error::{AppError, AppResult},
    models::{
        Availability, AvailabilityBreakdown, CheckoutState, GroupCount, Record, RecordField,
        RecordFields, RecordId, ReservationRollup,
    },
    query::{RecordFilter, SortDirection, SortKey, SortSpec},
};

const RECORD_COLUMNS: &str = "SELECT id, fields, field9 FROM livres";

/// Ids are canonical lowercase hex; stored ids may use either case.
const SET_CHECKOUT: &str = "UPDATE livres SET field9 = $1 WHERE lower(id) = $2";

#[derive(FromRow)]
struct RecordRow {
    id: String,
    fields: Json<Map<String, Value>>,
    field9: Option<String>,
}

impl TryFrom<RecordRow> for Record {
    type Error = AppError;

    fn try_from(row: RecordRow) -> AppResult<Self> {
        let id: RecordId = row
            .id
            .trim()
            .parse()
            .map_err(|_| AppError::Store(format!("Malformed id in store: {}", row.id)))?;
        Ok(Record {
            id,
            fields: RecordFields(row.fields.0),
            checkout: CheckoutState::from_marker(row.field9.as_deref()),
        })
    }
}

#[derive(FromRow)]
struct GroupRow {
    label: Option<String>,
    count: i64,
}

#[derive(FromRow)]
struct RollupRow {
    label: Option<String>,
    total_reservations: i64,
    nombre_documents: i64,
}

#[derive(FromRow)]
struct AvailabilityRow {
    label: Option<String>,
    total: i64,
    disponibles: i64,
    empruntes: i64,
}

/// SQL expression reading an attribute as text
fn text_expr(field: RecordField) -> String {
    format!("(fields->>'{}')", field.key())
}

/// Escape LIKE metacharacters so the term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Append the WHERE clause for a filter
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &RecordFilter) {
    qb.push(" WHERE TRUE");

    if let Some(ref document_type) = filter.document_type {
        qb.push(" AND ")
            .push(text_expr(RecordField::DocumentType))
            .push(" = ")
            .push_bind(document_type.clone());
    }

    match filter.availability {
        Availability::Available => {
            qb.push(" AND COALESCE(field9, '') = ''");
        }
        Availability::CheckedOut => {
            qb.push(" AND COALESCE(field9, '') <> ''");
        }
        Availability::Any => {}
    }

    if let Some(ref search) = filter.search {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (")
            .push(text_expr(RecordField::Title))
            .push(" ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR ")
            .push(text_expr(RecordField::Author))
            .push(" ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Append the ORDER BY clause; record id breaks ties
fn push_order(qb: &mut QueryBuilder<'_, Postgres>, sort: Option<SortSpec>) {
    let Some(spec) = sort else {
        qb.push(" ORDER BY id");
        return;
    };

    let direction = match spec.direction {
        SortDirection::Ascending => "ASC NULLS FIRST",
        SortDirection::Descending => "DESC NULLS LAST",
    };
    match spec.key {
        SortKey::Title => {
            qb.push(" ORDER BY ")
                .push(text_expr(RecordField::Title))
                .push(" COLLATE \"C\" ")
                .push(direction);
        }
        SortKey::Reservations => {
            qb.push(" ORDER BY livre_reservations(fields) ").push(direction);
        }
    }
    qb.push(", id");
}

#[derive(Clone)]
pub struct PgCatalogStore {
    pool: Pool<Postgres>,
}

impl PgCatalogStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Open the connection pool and apply pending migrations
    pub async fn connect(config: &StoreConfig) -> AppResult<Pool<Postgres>> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;
        tracing::info!("Connected to database");

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations completed");

        Ok(pool)
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn count(&self, filter: &RecordFilter) -> AppResult<i64> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM livres");
        push_filter(&mut qb, filter);
        let total = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn find(
        &self,
        filter: &RecordFilter,
        sort: Option<SortSpec>,
        skip: i64,
        limit: i64,
    ) -> AppResult<Vec<Record>> {
        let mut qb = QueryBuilder::<Postgres>::new(RECORD_COLUMNS);
        push_filter(&mut qb, filter);
        push_order(&mut qb, sort);
        qb.push(" OFFSET ").push_bind(skip);
        qb.push(" LIMIT ").push_bind(limit);

        let rows = qb.build_query_as::<RecordRow>().fetch_all(&self.pool).await?;
        rows.into_iter().map(Record::try_from).collect()
    }

    async fn distinct(&self, field: RecordField) -> AppResult<Vec<Option<String>>> {
        let query = format!(
            "SELECT DISTINCT {expr} FROM livres ORDER BY {expr} NULLS FIRST",
            expr = text_expr(field)
        );
        let values = sqlx::query_scalar::<_, Option<String>>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(values)
    }

    async fn set_checkout(&self, id: &RecordId, state: &CheckoutState) -> AppResult<bool> {
        let result = sqlx::query(SET_CHECKOUT)
            .bind(state.marker())
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_by(&self, field: RecordField, limit: Option<i64>) -> AppResult<Vec<GroupCount>> {
        let query = format!(
            r#"
            SELECT {expr} AS label, COUNT(*) AS count
            FROM livres
            GROUP BY 1
            ORDER BY COUNT(*) DESC, {expr} COLLATE "C" ASC NULLS FIRST
            LIMIT $1
            "#,
            expr = text_expr(field)
        );
        let rows = sqlx::query_as::<_, GroupRow>(&query)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| GroupCount {
                key: r.label,
                count: r.count,
            })
            .collect())
    }

    async fn reservations_by_type(&self) -> AppResult<Vec<ReservationRollup>> {
        let query = format!(
            r#"
            SELECT {expr} AS label,
                   LEAST(COALESCE(SUM(livre_reservations(fields)), 0), 9223372036854775807)::bigint AS total_reservations,
                   COUNT(*) AS nombre_documents
            FROM livres
            GROUP BY 1
            ORDER BY total_reservations DESC, {expr} COLLATE "C" ASC NULLS FIRST
            "#,
            expr = text_expr(RecordField::DocumentType)
        );
        let rows = sqlx::query_as::<_, RollupRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| ReservationRollup::new(r.label, r.total_reservations, r.nombre_documents))
            .collect())
    }

    async fn availability_by_type(&self) -> AppResult<Vec<AvailabilityBreakdown>> {
        let query = format!(
            r#"
            SELECT {expr} AS label,
                   COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE COALESCE(field9, '') = '') AS disponibles,
                   COUNT(*) FILTER (WHERE COALESCE(field9, '') <> '') AS empruntes
            FROM livres
            GROUP BY 1
            ORDER BY total DESC, {expr} COLLATE "C" ASC NULLS FIRST
            "#,
            expr = text_expr(RecordField::DocumentType)
        );
        let rows = sqlx::query_as::<_, AvailabilityRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| AvailabilityBreakdown {
                key: r.label,
                total: r.total,
                disponibles: r.disponibles,
                empruntes: r.empruntes,
            })
            .collect())
    }
}
