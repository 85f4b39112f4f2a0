use rusqlite::Connection;

#[test]
fn migrate_collapses_duplicate_aggregates_before_unique_key() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("legacy.sqlite");
    {
        let conn = Connection::open(&db_path).expect("open conn");
        let migration = include_str!("../migrations/0001_init.sql");
        conn.execute_batch(migration).expect("migrate 0001");
        for (timestamp, value) in [("first", 10.0), ("second", 20.0)] {
            conn.execute(
                "INSERT INTO hourly_aggregate (node, timestamp, unix_time, cmg_weighted) VALUES ('CHARRUA__220', ?1, 100, ?2)",
                rusqlite::params![timestamp, value],
            )
            .expect("insert duplicate");
        }
    }

    let mut db = cmg_db::Db::open(&db_path).expect("open db");
    db.migrate().expect("migrate db");

    let conn = Connection::open(&db_path).expect("open conn");
    let (count, value): (i64, f64) = conn
        .query_row(
            "SELECT COUNT(*), MAX(cmg_weighted) FROM hourly_aggregate WHERE node = 'CHARRUA__220'",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("aggregate rows");
    assert_eq!(count, 1);
    assert_eq!(value, 20.0);

    let duplicate = conn.execute(
        "INSERT INTO hourly_aggregate (node, timestamp, unix_time, cmg_weighted) VALUES ('CHARRUA__220', 'x', 100, 1.0)",
        [],
    );
    assert!(duplicate.is_err());
}

#[test]
fn migrate_adds_missing_parameter_columns() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("params.sqlite");
    {
        let conn = Connection::open(&db_path).expect("open conn");
        conn.execute_batch(
            r#"
            CREATE TABLE plant_parameter (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              plant TEXT NOT NULL,
              generating INTEGER NOT NULL DEFAULT 0,
              provider_rate REAL NOT NULL,
              brent_percentage REAL NOT NULL,
              plant_rate REAL NOT NULL,
              brent_price REAL NOT NULL,
              brent_reference_date TEXT NOT NULL,
              operational_cost REAL NOT NULL,
              editor TEXT NOT NULL,
              registered_at TEXT NOT NULL
            );
            INSERT INTO plant_parameter (
              plant, generating, provider_rate, brent_percentage, plant_rate, brent_price,
              brent_reference_date, operational_cost, editor, registered_at
            ) VALUES ('Quillota', 1, 0.1, 0.1, 0.1, 80.0, '2026-10-01', 110.0, 'operator', '01.10.26 09:00:00');
            "#,
        )
        .expect("legacy schema");
    }

    let mut db = cmg_db::Db::open(&db_path).expect("open db");
    db.migrate().expect("migrate db");
    db.migrate().expect("migrate twice");

    let snapshot = db
        .latest_parameter_snapshot("Quillota")
        .expect("query")
        .expect("row");
    assert_eq!(snapshot.guarantee_margin, 0.0);
    assert!(!snapshot.external_update);
}

#[test]
fn migrate_keeps_the_first_of_duplicate_raw_samples() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("legacy_raw.sqlite");
    {
        let conn = Connection::open(&db_path).expect("open conn");
        let migration = include_str!("../migrations/0001_init.sql");
        conn.execute_batch(migration).expect("migrate 0001");
        for (cmg, reference) in [(55.0, "SANTA_MARIA"), (61.0, "NEHUENCO")] {
            conn.execute(
                "INSERT INTO raw_sample (node, year, month, day, hour, unix_time, decoupled, cmg, reference_node) VALUES ('CHARRUA__220', 2026, 10, 16, '14:00:00', 100, 0, ?1, ?2)",
                rusqlite::params![cmg, reference],
            )
            .expect("insert duplicate");
        }
    }

    let mut db = cmg_db::Db::open(&db_path).expect("open db");
    db.migrate().expect("migrate db");
    db.migrate().expect("migrate twice");

    assert_eq!(db.count_raw_samples("CHARRUA__220").expect("count"), 1);
    let reading = db
        .last_known_reading("CHARRUA__220")
        .expect("read")
        .expect("reading");
    assert_eq!(reading.cmg, 55.0);

    let conn = Connection::open(&db_path).expect("open conn");
    let duplicate = conn.execute(
        "INSERT INTO raw_sample (node, year, month, day, hour, unix_time, decoupled, cmg, reference_node) VALUES ('CHARRUA__220', 2026, 10, 16, '14:00:00', 100, 0, 1.0, 'X')",
        [],
    );
    assert!(duplicate.is_err());
}
