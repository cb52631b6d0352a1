//! Product repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `products` table.
//! - Build filtered/sorted list queries without interpolating user input.
//!
//! # Invariants
//! - Sort column and direction reach SQL only through [`SortField`] and
//!   [`SortDirection`]; unknown input falls back to `name ASC`.
//! - Lookups return `Ok(None)` on a miss; writes report whether a row changed.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{Database, DbError};
use crate::model::product::{
    max_price_bound_cents, min_price_bound_cents, price_from_cents, price_to_cents, NewProduct,
    Product, ProductChanges, ProductId,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};

const PRODUCT_SELECT_SQL: &str = "SELECT
    id,
    name,
    price_cents,
    category,
    stock,
    brand,
    sku,
    stock_minimum,
    offer_price_cents,
    created_at,
    updated_at
FROM products";

const REQUIRED_PRODUCT_COLUMNS: &[&str] = &[
    "id",
    "name",
    "price_cents",
    "category",
    "stock",
    "brand",
    "sku",
    "stock_minimum",
    "offer_price_cents",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for product persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
    /// Connection schema is older than this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted product data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is not initialized to {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Allow-listed sort columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Id,
    #[default]
    Name,
    Price,
    Category,
    Stock,
    Brand,
    UpdatedAt,
}

impl SortField {
    /// Maps a caller-supplied field name; anything unknown becomes `Name`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "id" => Self::Id,
            "name" => Self::Name,
            "price" => Self::Price,
            "category" => Self::Category,
            "stock" => Self::Stock,
            "brand" => Self::Brand,
            "updated_at" => Self::UpdatedAt,
            _ => Self::Name,
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Price => "price_cents",
            Self::Category => "category",
            Self::Stock => "stock",
            Self::Brand => "brand",
            Self::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive `ASC`/`DESC`; anything else becomes `Asc`.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("DESC") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Optional list filters, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    /// Exact category match. Empty strings are ignored.
    pub category: Option<String>,
    /// Exact brand match. Empty strings are ignored.
    pub brand: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
    /// Only rows with `stock <= stock_minimum`.
    pub low_stock: bool,
    /// Only rows with an offer price.
    pub on_offer: bool,
}

/// Query options for listing products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductListQuery {
    pub sort_field: SortField,
    pub direction: SortDirection,
    pub filters: ProductFilters,
}

impl ProductListQuery {
    /// Builds a query from raw sort text, applying the allow-list fallbacks.
    pub fn from_raw(sort_field: &str, direction: &str, filters: ProductFilters) -> Self {
        Self {
            sort_field: SortField::parse(sort_field),
            direction: SortDirection::parse(direction),
            filters,
        }
    }

    /// Returns the SQL text and bind values for this query.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = format!("{PRODUCT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        let filters = &self.filters;

        if let Some(category) = non_empty(filters.category.as_deref()) {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.to_string()));
        }

        if let Some(brand) = non_empty(filters.brand.as_deref()) {
            sql.push_str(" AND brand = ?");
            bind_values.push(Value::Text(brand.to_string()));
        }

        if let Some(min_price) = filters.min_price {
            sql.push_str(" AND price_cents >= ?");
            bind_values.push(Value::Integer(min_price_bound_cents(min_price)));
        }

        if let Some(max_price) = filters.max_price {
            sql.push_str(" AND price_cents <= ?");
            bind_values.push(Value::Integer(max_price_bound_cents(max_price)));
        }

        if filters.low_stock {
            sql.push_str(" AND stock <= stock_minimum");
        }

        if filters.on_offer {
            sql.push_str(" AND offer_price_cents IS NOT NULL");
        }

        sql.push_str(&format!(
            " ORDER BY {} {}, id ASC",
            self.sort_field.column(),
            self.direction.keyword()
        ));

        (sql, bind_values)
    }
}

/// Repository interface for product CRUD operations.
pub trait ProductRepository {
    fn list_products(&self, query: &ProductListQuery) -> RepoResult<Vec<Product>>;
    fn find_by_id(&self, id: ProductId) -> RepoResult<Option<Product>>;
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Product>>;
    fn find_by_sku(&self, sku: &str) -> RepoResult<Option<Product>>;
    fn create_product(&self, product: &NewProduct) -> RepoResult<ProductId>;
    /// Returns `false` when no row has `id`.
    fn update_product(&self, id: ProductId, changes: &ProductChanges) -> RepoResult<bool>;
    /// Returns `false` when no row has `id`.
    fn delete_product(&self, id: ProductId) -> RepoResult<bool>;
}

/// SQLite-backed product repository.
pub struct SqliteProductRepository<'db> {
    db: &'db Database,
}

impl<'db> SqliteProductRepository<'db> {
    /// Constructs a repository from a migrated/ready database.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema was
    ///   tampered with.
    pub fn try_new(db: &'db Database) -> RepoResult<Self> {
        db.with_conn(ensure_connection_ready)?;
        Ok(Self { db })
    }
}

impl ProductRepository for SqliteProductRepository<'_> {
    fn list_products(&self, query: &ProductListQuery) -> RepoResult<Vec<Product>> {
        let (sql, bind_values) = query.to_sql();

        self.db.with_conn(|conn| -> RepoResult<Vec<Product>> {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            let mut products = Vec::new();

            while let Some(row) = rows.next()? {
                products.push(parse_product_row(row)?);
            }

            Ok(products)
        })
    }

    fn find_by_id(&self, id: ProductId) -> RepoResult<Option<Product>> {
        self.db
            .with_conn(|conn| find_one(conn, "id = ?1", Value::Integer(id)))
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Product>> {
        self.db
            .with_conn(|conn| find_one(conn, "name = ?1", Value::Text(name.to_string())))
    }

    fn find_by_sku(&self, sku: &str) -> RepoResult<Option<Product>> {
        self.db
            .with_conn(|conn| find_one(conn, "sku = ?1", Value::Text(sku.to_string())))
    }

    fn create_product(&self, product: &NewProduct) -> RepoResult<ProductId> {
        let price_cents = checked_cents(product.price)?;

        self.db.with_conn(|conn| -> RepoResult<ProductId> {
            conn.execute(
                "INSERT INTO products (
                    name,
                    price_cents,
                    category,
                    stock
                ) VALUES (?1, ?2, ?3, ?4);",
                params![
                    product.name.as_str(),
                    price_cents,
                    product.category.as_str(),
                    product.stock.unwrap_or(0),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn update_product(&self, id: ProductId, changes: &ProductChanges) -> RepoResult<bool> {
        let price_cents = checked_cents(changes.price)?;

        self.db.with_conn(|conn| -> RepoResult<bool> {
            let changed = conn.execute(
                "UPDATE products
                 SET
                    name = ?1,
                    price_cents = ?2,
                    category = ?3,
                    stock = ?4,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?5;",
                params![
                    changes.name.as_str(),
                    price_cents,
                    changes.category.as_str(),
                    changes.stock,
                    id,
                ],
            )?;
            Ok(changed > 0)
        })
    }

    fn delete_product(&self, id: ProductId) -> RepoResult<bool> {
        self.db.with_conn(|conn| -> RepoResult<bool> {
            let changed = conn.execute("DELETE FROM products WHERE id = ?1;", [id])?;
            Ok(changed > 0)
        })
    }
}

fn find_one(conn: &Connection, predicate: &str, value: Value) -> RepoResult<Option<Product>> {
    let mut stmt = conn.prepare(&format!("{PRODUCT_SELECT_SQL} WHERE {predicate} LIMIT 1;"))?;
    let mut rows = stmt.query([value])?;
    match rows.next()? {
        Some(row) => Ok(Some(parse_product_row(row)?)),
        None => Ok(None),
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'products';",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some();
    if !table_exists {
        return Err(RepoError::MissingRequiredTable("products"));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(products);")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    for required in REQUIRED_PRODUCT_COLUMNS {
        if !columns.iter().any(|column| column == required) {
            return Err(RepoError::MissingRequiredColumn {
                table: "products",
                column: required,
            });
        }
    }

    Ok(())
}

fn parse_product_row(row: &Row<'_>) -> RepoResult<Product> {
    let id: ProductId = row.get("id")?;

    let price_cents: i64 = row.get("price_cents")?;
    if price_cents < 0 {
        return Err(RepoError::InvalidData(format!(
            "negative price_cents `{price_cents}` for product {id}"
        )));
    }

    let offer_price = row
        .get::<_, Option<i64>>("offer_price_cents")?
        .map(price_from_cents);

    Ok(Product {
        id,
        name: row.get("name")?,
        price: price_from_cents(price_cents),
        category: row.get("category")?,
        stock: row.get("stock")?,
        brand: row.get("brand")?,
        sku: row.get("sku")?,
        stock_minimum: row.get("stock_minimum")?,
        offer_price,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn checked_cents(price: Decimal) -> RepoResult<i64> {
    match price_to_cents(price) {
        Some(cents) if cents >= 0 => Ok(cents),
        _ => Err(RepoError::InvalidData(format!(
            "price `{price}` cannot be stored as non-negative hundredths"
        ))),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}
