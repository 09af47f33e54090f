use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::models::{SortField, SortOrder, Toy, ToyFields};

const TOY_COLUMNS: &str = "id, name, type, material, color, price";

fn toy_from_row(row: &Row<'_>) -> rusqlite::Result<Toy> {
    Ok(Toy {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        material: row.get(3)?,
        color: row.get(4)?,
        price: row.get(5)?,
    })
}

/// Run a `SELECT` over the toy columns and collect every row.
fn query_toys(conn: &Connection, sql: &str) -> Result<Vec<Toy>> {
    let mut stmt = conn.prepare(sql).context("failed to prepare toy query")?;

    let toys = stmt
        .query_map([], toy_from_row)
        .context("failed to load toys")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect toys")?;

    Ok(toys)
}

/// Retrieve every toy in identifier order.
pub fn fetch_toys(conn: &Connection) -> Result<Vec<Toy>> {
    let toys = query_toys(conn, &format!("SELECT {TOY_COLUMNS} FROM toys ORDER BY id"))?;
    debug!(rows = toys.len(), "listed toys");
    Ok(toys)
}

/// Return the toys whose text (any column, numbers included) contains
/// `keyword`, ignoring case. An empty keyword matches every row.
///
/// Filtering happens here rather than in SQL because SQLite's `LOWER` only
/// folds ASCII and the inventory is mostly Cyrillic.
pub fn search_toys(conn: &Connection, keyword: &str) -> Result<Vec<Toy>> {
    let needle = keyword.to_lowercase();
    let toys: Vec<Toy> = fetch_toys(conn)?
        .into_iter()
        .filter(|toy| toy.matches(&needle))
        .collect();
    debug!(keyword, rows = toys.len(), "searched toys");
    Ok(toys)
}

/// List toys ordered by one column. SQLite compares text columns
/// lexicographically and `id`/`price` numerically; ties fall back to `id`.
pub fn fetch_sorted_toys(conn: &Connection, order: SortOrder) -> Result<Vec<Toy>> {
    let mut sql = format!(
        "SELECT {TOY_COLUMNS} FROM toys ORDER BY {} {}",
        order.field.column(),
        order.direction.keyword()
    );
    if order.field != SortField::Id {
        sql.push_str(", id ASC");
    }

    let toys = query_toys(conn, &sql)?;
    debug!(%order, rows = toys.len(), "sorted toys");
    Ok(toys)
}

/// Look up a single toy. `None` means the id does not exist (anymore).
pub fn fetch_toy(conn: &Connection, id: i64) -> Result<Option<Toy>> {
    conn.query_row(
        &format!("SELECT {TOY_COLUMNS} FROM toys WHERE id = ?1"),
        params![id],
        toy_from_row,
    )
    .optional()
    .context("failed to load toy")
}

/// Insert a new toy and return it with its freshly assigned id.
pub fn create_toy(conn: &Connection, fields: &ToyFields) -> Result<Toy> {
    conn.execute(
        "INSERT INTO toys (name, type, material, color, price) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            fields.name,
            fields.kind,
            fields.material,
            fields.color,
            fields.price
        ],
    )
    .context("failed to insert toy")?;

    let id = conn.last_insert_rowid();
    info!(id, name = %fields.name, "toy added");
    Ok(Toy::from_fields(id, fields.clone()))
}

/// Overwrite all five descriptive fields of a toy. Returns `false` when no
/// row has that id; nothing is written in that case.
pub fn update_toy(conn: &Connection, id: i64, fields: &ToyFields) -> Result<bool> {
    let updated = conn
        .execute(
            "UPDATE toys SET name = ?1, type = ?2, material = ?3, color = ?4, price = ?5
             WHERE id = ?6",
            params![
                fields.name,
                fields.kind,
                fields.material,
                fields.color,
                fields.price,
                id
            ],
        )
        .context("failed to update toy")?;

    if updated == 0 {
        warn!(id, "update matched no toy");
        Ok(false)
    } else {
        info!(id, "toy updated");
        Ok(true)
    }
}

/// Remove a toy. Returns `false` when the id was already gone.
pub fn delete_toy(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM toys WHERE id = ?1", params![id])
        .context("failed to delete toy")?;

    if deleted == 0 {
        warn!(id, "delete matched no toy");
        Ok(false)
    } else {
        info!(id, "toy deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::initialize_schema;
    use crate::models::SortDirection;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        for fields in [
            ToyFields::new("Мяч", "Спорт", "Резина", "Зеленый", 5.99),
            ToyFields::new("Робот", "Робот", "Металл", "Серебряный", 19.99),
            ToyFields::new("Кукла", "Фигура", "Ткань", "Розовый", 8.99),
            ToyFields::new("Lego", "Toy", "Plastic", "Yellow", 33.99),
        ] {
            create_toy(&conn, &fields).unwrap();
        }
        conn
    }

    fn names(toys: &[Toy]) -> Vec<&str> {
        toys.iter().map(|toy| toy.name.as_str()).collect()
    }

    #[test]
    fn lists_in_id_order() {
        let conn = setup();
        let toys = fetch_toys(&conn).unwrap();
        let ids: Vec<i64> = toys.iter().map(|toy| toy.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn search_matches_any_column_case_insensitively() {
        let conn = setup();
        assert_eq!(names(&search_toys(&conn, "МЕТАЛЛ").unwrap()), vec!["Робот"]);
        assert_eq!(names(&search_toys(&conn, "plastic").unwrap()), vec!["Lego"]);
        assert_eq!(
            names(&search_toys(&conn, "8.9").unwrap()),
            vec!["Кукла"]
        );
        // "робот" hits both name and type of the same row; one result.
        assert_eq!(search_toys(&conn, "робот").unwrap().len(), 1);
    }

    #[test]
    fn search_matches_ids_as_text() {
        let conn = setup();
        let hits = search_toys(&conn, "4").unwrap();
        assert!(hits.iter().any(|toy| toy.id == 4));
    }

    #[test]
    fn empty_search_returns_everything() {
        let conn = setup();
        assert_eq!(
            search_toys(&conn, "").unwrap(),
            fetch_toys(&conn).unwrap()
        );
    }

    #[test]
    fn search_without_hits_is_empty() {
        let conn = setup();
        assert!(search_toys(&conn, "дракон").unwrap().is_empty());
    }

    #[test]
    fn sorts_price_numerically() {
        let conn = setup();
        let asc = fetch_sorted_toys(
            &conn,
            SortOrder::new(SortField::Price, SortDirection::Ascending),
        )
        .unwrap();
        assert_eq!(names(&asc), vec!["Мяч", "Кукла", "Робот", "Lego"]);

        let desc = fetch_sorted_toys(
            &conn,
            SortOrder::new(SortField::Price, SortDirection::Descending),
        )
        .unwrap();
        assert_eq!(names(&desc), vec!["Lego", "Робот", "Кукла", "Мяч"]);
    }

    #[test]
    fn sorts_text_lexicographically() {
        let conn = setup();
        let toys = fetch_sorted_toys(
            &conn,
            SortOrder::new(SortField::Name, SortDirection::Ascending),
        )
        .unwrap();
        // Latin sorts before Cyrillic under binary collation.
        assert_eq!(names(&toys), vec!["Lego", "Кукла", "Мяч", "Робот"]);
    }

    #[test]
    fn sorts_ids_descending() {
        let conn = setup();
        let toys = fetch_sorted_toys(
            &conn,
            SortOrder::new(SortField::Id, SortDirection::Descending),
        )
        .unwrap();
        let ids: Vec<i64> = toys.iter().map(|toy| toy.id).collect();
        assert_eq!(ids, vec![4, 3, 2, 1]);
    }

    #[test]
    fn every_sort_order_is_a_permutation() {
        let conn = setup();
        let mut all_ids: Vec<i64> = fetch_toys(&conn).unwrap().iter().map(|t| t.id).collect();
        all_ids.sort();
        for order in SortOrder::all() {
            let mut ids: Vec<i64> = fetch_sorted_toys(&conn, order)
                .unwrap()
                .iter()
                .map(|t| t.id)
                .collect();
            ids.sort();
            assert_eq!(ids, all_ids, "{order}");
        }
    }

    #[test]
    fn create_then_fetch_round_trips() {
        let conn = setup();
        let fields = ToyFields::new("Test", "Toy", "Plastic", "Red", 9.99);
        let created = create_toy(&conn, &fields).unwrap();
        assert_eq!(created.id, 5);
        let fetched = fetch_toy(&conn, created.id).unwrap().unwrap();
        assert_eq!(fetched.fields(), fields);
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let conn = setup();
        assert!(delete_toy(&conn, 4).unwrap());
        let created =
            create_toy(&conn, &ToyFields::new("Пазл", "Игрушка", "Картон", "Зеленый", 13.99))
                .unwrap();
        assert_eq!(created.id, 5);
    }

    #[test]
    fn fetch_missing_toy_is_none() {
        let conn = setup();
        assert!(fetch_toy(&conn, 99).unwrap().is_none());
    }

    #[test]
    fn update_overwrites_only_the_target_row() {
        let conn = setup();
        let before = fetch_toys(&conn).unwrap();
        let fields = ToyFields::new("Робот-2", "Робот", "Пластик", "Черный", 21.5);
        assert!(update_toy(&conn, 2, &fields).unwrap());

        assert_eq!(fetch_toy(&conn, 2).unwrap().unwrap().fields(), fields);
        let after = fetch_toys(&conn).unwrap();
        for (old, new) in before.iter().zip(after.iter()) {
            if old.id != 2 {
                assert_eq!(old, new);
            }
        }
    }

    #[test]
    fn update_of_missing_id_is_a_no_op() {
        let conn = setup();
        let before = fetch_toys(&conn).unwrap();
        let fields = ToyFields::new("Ghost", "Toy", "Air", "Clear", 1.0);
        assert!(!update_toy(&conn, 42, &fields).unwrap());
        assert_eq!(fetch_toys(&conn).unwrap(), before);
    }

    #[test]
    fn delete_removes_one_row() {
        let conn = setup();
        assert!(delete_toy(&conn, 3).unwrap());
        assert!(fetch_toy(&conn, 3).unwrap().is_none());
        assert_eq!(fetch_toys(&conn).unwrap().len(), 3);
        assert!(!delete_toy(&conn, 3).unwrap());
        assert_eq!(fetch_toys(&conn).unwrap().len(), 3);
    }
}
