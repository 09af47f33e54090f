use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::info;

use crate::models::Toy;

use super::toys::fetch_toys;

/// Demonstration inventory inserted into an empty `toys` table:
/// (name, type, material, color, price).
pub const SEED_TOYS: &[(&str, &str, &str, &str, f64)] = &[
    ("Машина", "Транспорт", "Пластик", "Красный", 10.99),
    ("Поезд", "Транспорт", "Металл", "Синий", 15.99),
    ("Кукла", "Фигура", "Ткань", "Розовый", 8.99),
    ("Робот", "Робот", "Металл", "Серебряный", 19.99),
    ("Мяч", "Спорт", "Резина", "Зеленый", 5.99),
    ("Кубики", "Игрушка", "Дерево", "Желтый", 12.99),
    ("Медведь", "Игрушка", "Плюш", "Коричневый", 9.99),
    ("Самолет", "Транспорт", "Пластик", "Белый", 17.99),
    ("Каталка", "Игрушка", "Пластик", "Оранжевый", 14.99),
    ("Кукольный домик", "Игрушка", "Дерево", "Фиолетовый", 24.99),
    ("Мягкий мяч", "Спорт", "Ткань", "Серый", 7.99),
    ("Игровой набор", "Игрушка", "Пластик", "Голубой", 11.99),
    ("Тетрис", "Игрушка", "Пластик", "Черный", 16.99),
    ("Игрушечный компьютер", "Игрушка", "Пластик", "Фиолетовый", 21.99),
    ("Магнитный конструктор", "Игрушка", "Металл", "Желтый", 19.99),
    ("Лошадка на пружине", "Игрушка", "Пластик", "Коричневый", 27.99),
    ("Пазл", "Игрушка", "Картон", "Зеленый", 13.99),
    ("Роликовые коньки", "Спорт", "Металл", "Черный", 34.99),
    ("Беговел", "Транспорт", "Металл", "Красный", 29.99),
    ("Набор инструментов", "Игрушка", "Пластик", "Оранжевый", 18.99),
    ("Карточные игры", "Игрушка", "Картон", "Синий", 9.99),
    ("Игрушечный телефон", "Игрушка", "Пластик", "Белый", 7.99),
    ("Кукольная коляска", "Игрушка", "Пластик", "Розовый", 23.99),
    ("Велосипед", "Транспорт", "Металл", "Синий", 45.99),
    ("Пластиковые фигурки", "Игрушка", "Пластик", "Зеленый", 8.99),
    ("Комплект посуды", "Игрушка", "Пластик", "Желтый", 12.99),
    ("Бильярдный стол", "Игрушка", "Дерево", "Коричневый", 69.99),
    ("Водный пистолет", "Игрушка", "Пластик", "Голубой", 6.99),
    ("Малярный набор", "Игрушка", "Пластик", "Оранжевый", 15.99),
    ("Магнитный пазл", "Игрушка", "Пластик", "Красный", 11.99),
    ("Конструктор LEGO", "Игрушка", "Пластик", "Желтый", 33.99),
    ("Пистолет-пулемет", "Игрушка", "Пластик", "Серый", 7.99),
    ("Набор для рисования", "Игрушка", "Пластик", "Фиолетовый", 14.99),
    ("Игрушечная кухня", "Игрушка", "Пластик", "Коричневый", 19.99),
    ("Масса для лепки", "Игрушка", "Пластик", "Зеленый", 9.99),
    ("Футбольные ворота", "Спорт", "Металл", "Белый", 25.99),
    ("Детский тренажер", "Спорт", "Пластик", "Синий", 28.99),
    ("Мягкий пазл", "Игрушка", "Ткань", "Красный", 10.99),
    ("Игрушечная ракета", "Игрушка", "Пластик", "Серый", 18.99),
    ("Магнитный лабиринт", "Игрушка", "Пластик", "Голубой", 16.99),
    ("Рулетка для измерений", "Игрушка", "Пластик", "Белый", 9.99),
    ("Детский смартфон", "Игрушка", "Пластик", "Коричневый", 7.99),
    ("Набор доктора", "Игрушка", "Пластик", "Розовый", 13.99),
    ("Игрушечный вертолет", "Игрушка", "Пластик", "Синий", 20.99),
    ("Скакалка", "Спорт", "Пластик", "Красный", 4.99),
];

/// Insert the demonstration rows when the table holds nothing yet. Returns
/// how many rows were written (zero for an already populated table).
pub fn seed_if_empty(conn: &Connection) -> Result<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM toys", [], |row| row.get(0))
        .context("failed to count toys")?;
    if count > 0 {
        return Ok(0);
    }

    let tx = conn
        .unchecked_transaction()
        .context("failed to start seed transaction")?;
    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO toys (name, type, material, color, price)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .context("failed to prepare seed insert")?;
        for (name, kind, material, color, price) in SEED_TOYS {
            stmt.execute(params![name, kind, material, color, price])
                .with_context(|| format!("failed to seed toy `{name}`"))?;
        }
    }
    tx.commit().context("failed to commit seed data")?;

    info!(rows = SEED_TOYS.len(), "seeded empty toys table");
    Ok(SEED_TOYS.len())
}

/// Seed the table if it is empty, then load the full list for the first
/// render.
pub fn load_or_seed_toys(conn: &Connection) -> Result<Vec<Toy>> {
    seed_if_empty(conn)?;
    fetch_toys(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::initialize_schema;
    use crate::db::toys::create_toy;
    use crate::models::ToyFields;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn seeds_an_empty_table_once() {
        let conn = setup();
        assert_eq!(seed_if_empty(&conn).unwrap(), 45);
        assert_eq!(seed_if_empty(&conn).unwrap(), 0);
        assert_eq!(fetch_toys(&conn).unwrap().len(), 45);
    }

    #[test]
    fn leaves_populated_tables_alone() {
        let conn = setup();
        create_toy(&conn, &ToyFields::new("Test", "Toy", "Plastic", "Red", 9.99)).unwrap();
        let toys = load_or_seed_toys(&conn).unwrap();
        assert_eq!(toys.len(), 1);
        assert_eq!(toys[0].name, "Test");
    }

    #[test]
    fn seed_rows_keep_their_order_and_values() {
        let conn = setup();
        let toys = load_or_seed_toys(&conn).unwrap();
        assert_eq!(toys[0].name, "Машина");
        assert_eq!(toys[0].id, 1);
        let last = toys.last().unwrap();
        assert_eq!(last.name, "Скакалка");
        assert_eq!(last.price, 4.99);
    }
}
