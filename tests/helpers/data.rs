use std::collections::BTreeMap;

use maplit::btreemap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use relplan::catalog::{Catalog, Row, Table};
use relplan::common::types::DataType;
use relplan::common::value::Value;

type Fixture = (Vec<(&'static str, DataType)>, Vec<Row>);

fn build(tables: BTreeMap<&'static str, Fixture>) -> Catalog {
    let mut catalog = Catalog::new();
    for (name, (columns, rows)) in tables {
        catalog
            .insert_table(Table::from_columns(name, &columns, rows).unwrap())
            .unwrap();
    }
    catalog
}

fn int(v: i64) -> Value {
    Value::Int64(v)
}

fn text(v: &str) -> Value {
    Value::from(v)
}

/// users(id, name, age) and orders(id, user_id, amount), two rows each.
#[allow(dead_code)]
pub fn scenario_catalog() -> Catalog {
    build(btreemap! {
        "users" => (
            vec![("id", DataType::Int64), ("name", DataType::String), ("age", DataType::Int64)],
            vec![
                vec![int(1), text("A"), int(30)],
                vec![int(2), text("B"), int(20)],
            ],
        ),
        "orders" => (
            vec![("id", DataType::Int64), ("user_id", DataType::Int64), ("amount", DataType::Int64)],
            vec![
                vec![int(1), int(1), int(100)],
                vec![int(2), int(2), int(50)],
            ],
        ),
    })
}

/// Three tables of different sizes for reordering: items is the smallest,
/// orders the largest.
#[allow(dead_code)]
pub fn shop_catalog() -> Catalog {
    build(btreemap! {
        "customers" => (
            vec![("id", DataType::Int64), ("name", DataType::String), ("city", DataType::String)],
            vec![
                vec![int(1), text("Alice"), text("Oslo")],
                vec![int(2), text("Bob"), text("Rome")],
                vec![int(3), text("Carol"), text("Oslo")],
                vec![int(4), text("Dan"), Value::Null],
            ],
        ),
        "orders" => (
            vec![("id", DataType::Int64), ("customer_id", DataType::Int64), ("total", DataType::Float64)],
            (1..=8)
                .map(|i| vec![int(i), int((i % 4) + 1), Value::Float64(i as f64 * 12.5)])
                .collect(),
        ),
        "items" => (
            vec![("order_id", DataType::Int64), ("sku", DataType::String), ("qty", DataType::Int64)],
            vec![
                vec![int(1), text("pen"), int(3)],
                vec![int(2), text("ink"), int(1)],
            ],
        ),
    })
}

fn random_value(rng: &mut StdRng) -> Value {
    match rng.random_range(0..10) {
        0 => Value::Null,
        1 => Value::String(rng.random_range(0..5).to_string()),
        2 => Value::Float64(rng.random_range(0..10) as f64 / 2.0),
        _ => Value::Int64(rng.random_range(0..5)),
    }
}

/// Tables `t0..t{n}` with columns (id, k, v) filled from a seeded generator.
#[allow(dead_code)]
pub fn random_catalog(seed: u64, tables: usize) -> Catalog {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut catalog = Catalog::new();
    for t in 0..tables {
        let rows = (0..rng.random_range(0..7))
            .map(|_| (0..3).map(|_| random_value(&mut rng)).collect())
            .collect();
        let table = Table::from_columns(
            format!("t{t}"),
            &[
                ("id", DataType::Int64),
                ("k", DataType::Int64),
                ("v", DataType::Float64),
            ],
            rows,
        )
        .unwrap();
        catalog.insert_table(table).unwrap();
    }
    catalog
}
