use catalog_core::db::migrations::latest_version;
use catalog_core::db::{Database, DbError};
use catalog_core::{
    NewProduct, ProductChanges, ProductFilters, ProductListQuery, ProductRepository, RepoError,
    SortDirection, SortField, SqliteProductRepository,
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

fn new_product(name: &str, price: &str, category: &str, stock: Option<i64>) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        price: dec(price),
        category: category.to_string(),
        stock,
    }
}

fn names(products: &[catalog_core::Product]) -> Vec<&str> {
    products.iter().map(|product| product.name.as_str()).collect()
}

#[test]
fn create_and_find_roundtrip() {
    let db = Database::open_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&db).unwrap();

    let id = repo
        .create_product(&new_product("Widget", "9.99", "Tools", Some(4)))
        .unwrap();

    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.name, "Widget");
    assert_eq!(loaded.price, dec("9.99"));
    assert_eq!(loaded.category, "Tools");
    assert_eq!(loaded.stock, 4);
    assert_eq!(loaded.brand, None);
    assert_eq!(loaded.offer_price, None);
    assert!(loaded.created_at > 0);

    let by_name = repo.find_by_name("Widget").unwrap().unwrap();
    assert_eq!(by_name.id, id);
}

#[test]
fn create_defaults_stock_to_zero() {
    let db = Database::open_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&db).unwrap();

    let id = repo
        .create_product(&new_product("Bolt", "0.10", "Hardware", None))
        .unwrap();
    assert_eq!(repo.find_by_id(id).unwrap().unwrap().stock, 0);
}

#[test]
fn lookups_return_none_on_miss() {
    let db = Database::open_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&db).unwrap();

    assert!(repo.find_by_id(404).unwrap().is_none());
    assert!(repo.find_by_name("ghost").unwrap().is_none());
    assert!(repo.find_by_sku("SKU-0").unwrap().is_none());
}

#[test]
fn find_by_name_is_exact_match() {
    let db = Database::open_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&db).unwrap();
    repo.create_product(&new_product("Widget", "1", "Tools", None))
        .unwrap();

    assert!(repo.find_by_name("widget").unwrap().is_none());
    assert!(repo.find_by_name("Widget ").unwrap().is_none());
}

#[test]
fn find_by_sku_reads_catalog_attributes() {
    let db = Database::open_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&db).unwrap();
    let id = repo
        .create_product(&new_product("Drill", "49.90", "Tools", Some(2)))
        .unwrap();
    db.with_conn(|conn| -> Result<(), DbError> {
        conn.execute(
            "UPDATE products SET sku = 'DR-1', brand = 'Acme', offer_price_cents = 3990 WHERE id = ?1;",
            [id],
        )?;
        Ok(())
    })
    .unwrap();

    let loaded = repo.find_by_sku("DR-1").unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.brand.as_deref(), Some("Acme"));
    assert_eq!(loaded.offer_price, Some(dec("39.90")));
    assert!(loaded.is_on_offer());
}

#[test]
fn update_replaces_fields_and_reports_missing_rows() {
    let db = Database::open_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&db).unwrap();
    let id = repo
        .create_product(&new_product("Widget", "1.00", "Tools", Some(1)))
        .unwrap();

    let changes = ProductChanges {
        name: "Widget Pro".to_string(),
        price: dec("2.50"),
        category: "Premium".to_string(),
        stock: 7,
    };
    assert!(repo.update_product(id, &changes).unwrap());

    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.name, "Widget Pro");
    assert_eq!(loaded.price, dec("2.5"));
    assert_eq!(loaded.category, "Premium");
    assert_eq!(loaded.stock, 7);

    assert!(!repo.update_product(id + 100, &changes).unwrap());
}

#[test]
fn update_bumps_updated_at() {
    let db = Database::open_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&db).unwrap();
    let id = repo
        .create_product(&new_product("Widget", "1", "Tools", Some(1)))
        .unwrap();
    db.with_conn(|conn| -> Result<(), DbError> {
        conn.execute("UPDATE products SET updated_at = 1000;", [])?;
        Ok(())
    })
    .unwrap();

    let changes = ProductChanges {
        name: "Widget".to_string(),
        price: dec("1"),
        category: "Tools".to_string(),
        stock: 2,
    };
    repo.update_product(id, &changes).unwrap();

    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert!(loaded.updated_at > 1000);
}

#[test]
fn delete_is_hard_and_second_delete_returns_false() {
    let db = Database::open_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&db).unwrap();
    let id = repo
        .create_product(&new_product("Widget", "1", "Tools", None))
        .unwrap();

    assert!(repo.delete_product(id).unwrap());
    assert!(repo.find_by_id(id).unwrap().is_none());
    assert!(!repo.delete_product(id).unwrap());

    let remaining: i64 = db
        .with_conn(|conn| -> Result<i64, DbError> {
            Ok(conn.query_row("SELECT COUNT(*) FROM products;", [], |row| row.get(0))?)
        })
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn list_sorts_by_allow_listed_field_and_direction() {
    let db = Database::open_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&db).unwrap();
    repo.create_product(&new_product("Banana", "3", "Fruit", Some(5)))
        .unwrap();
    repo.create_product(&new_product("Apple", "10", "Fruit", Some(1)))
        .unwrap();
    repo.create_product(&new_product("Cherry", "2.5", "Fruit", Some(9)))
        .unwrap();

    let by_price_desc = ProductListQuery {
        sort_field: SortField::Price,
        direction: SortDirection::Desc,
        ..ProductListQuery::default()
    };
    let listed = repo.list_products(&by_price_desc).unwrap();
    assert_eq!(names(&listed), vec!["Apple", "Banana", "Cherry"]);

    let by_stock = ProductListQuery::from_raw("stock", "asc", ProductFilters::default());
    let listed = repo.list_products(&by_stock).unwrap();
    assert_eq!(names(&listed), vec!["Apple", "Banana", "Cherry"]);
}

#[test]
fn list_with_hostile_sort_field_falls_back_to_name_ascending() {
    let db = Database::open_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&db).unwrap();
    repo.create_product(&new_product("Zeta", "1", "Misc", None))
        .unwrap();
    repo.create_product(&new_product("Alpha", "2", "Misc", None))
        .unwrap();

    let query = ProductListQuery::from_raw(
        "DROP TABLE products; --",
        "DESC; DELETE FROM products",
        ProductFilters::default(),
    );
    let listed = repo.list_products(&query).unwrap();
    assert_eq!(names(&listed), vec!["Alpha", "Zeta"]);

    let still_there = repo.list_products(&ProductListQuery::default()).unwrap();
    assert_eq!(still_there.len(), 2);
}

#[test]
fn list_combines_filters_with_and() {
    let db = Database::open_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&db).unwrap();
    let hammer = repo
        .create_product(&new_product("Hammer", "15", "Tools", Some(1)))
        .unwrap();
    let saw = repo
        .create_product(&new_product("Saw", "25", "Tools", Some(10)))
        .unwrap();
    repo.create_product(&new_product("Apple", "1", "Fruit", Some(0)))
        .unwrap();
    db.with_conn(|conn| -> Result<(), DbError> {
        conn.execute(
            "UPDATE products SET brand = 'Acme', stock_minimum = 3 WHERE id = ?1;",
            [hammer],
        )?;
        conn.execute(
            "UPDATE products SET brand = 'Acme', offer_price_cents = 2000 WHERE id = ?1;",
            [saw],
        )?;
        Ok(())
    })
    .unwrap();

    let tools_in_range = ProductFilters {
        category: Some("Tools".to_string()),
        min_price: Some(dec("15")),
        max_price: Some(dec("25")),
        ..ProductFilters::default()
    };
    let listed = repo
        .list_products(&ProductListQuery::from_raw("id", "ASC", tools_in_range))
        .unwrap();
    assert_eq!(names(&listed), vec!["Hammer", "Saw"]);

    let low_stock = ProductFilters {
        low_stock: true,
        ..ProductFilters::default()
    };
    let listed = repo
        .list_products(&ProductListQuery::from_raw("name", "ASC", low_stock))
        .unwrap();
    assert_eq!(names(&listed), vec!["Apple", "Hammer"]);

    let acme_on_offer = ProductFilters {
        brand: Some("Acme".to_string()),
        on_offer: true,
        ..ProductFilters::default()
    };
    let listed = repo
        .list_products(&ProductListQuery::from_raw("name", "ASC", acme_on_offer))
        .unwrap();
    assert_eq!(names(&listed), vec!["Saw"]);

    let cheap_tools = ProductFilters {
        category: Some("Tools".to_string()),
        max_price: Some(dec("14.99")),
        ..ProductFilters::default()
    };
    assert!(repo
        .list_products(&ProductListQuery::from_raw("name", "ASC", cheap_tools))
        .unwrap()
        .is_empty());
}

#[test]
fn price_range_with_sub_cent_bounds_stays_inclusive_without_widening() {
    let db = Database::open_in_memory().unwrap();
    let repo = SqliteProductRepository::try_new(&db).unwrap();
    repo.create_product(&new_product("Cheap", "1.00", "Tools", None))
        .unwrap();
    repo.create_product(&new_product("Dear", "1.01", "Tools", None))
        .unwrap();

    let list = |filters: ProductFilters| {
        repo.list_products(&ProductListQuery::from_raw("name", "ASC", filters))
            .unwrap()
    };

    let above = list(ProductFilters {
        min_price: Some(dec("1.004")),
        ..ProductFilters::default()
    });
    assert_eq!(names(&above), vec!["Dear"]);

    let below = list(ProductFilters {
        max_price: Some(dec("1.006")),
        ..ProductFilters::default()
    });
    assert_eq!(names(&below), vec!["Cheap"]);

    let exact = list(ProductFilters {
        min_price: Some(dec("1.01")),
        max_price: Some(dec("1.01")),
        ..ProductFilters::default()
    });
    assert_eq!(names(&exact), vec!["Dear"]);

    let between = list(ProductFilters {
        min_price: Some(dec("1.001")),
        max_price: Some(dec("1.009")),
        ..ProductFilters::default()
    });
    assert!(between.is_empty());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let db = Database::from_connection(Connection::open_in_memory().unwrap());

    match SqliteProductRepository::try_new(&db) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_products_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();
    let db = Database::from_connection(conn);

    assert!(matches!(
        SqliteProductRepository::try_new(&db),
        Err(RepoError::MissingRequiredTable("products"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE products (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            price_cents INTEGER NOT NULL,
            category TEXT NOT NULL,
            stock INTEGER NOT NULL DEFAULT 0
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();
    let db = Database::from_connection(conn);

    assert!(matches!(
        SqliteProductRepository::try_new(&db),
        Err(RepoError::MissingRequiredColumn {
            table: "products",
            column: "brand"
        })
    ));
}
