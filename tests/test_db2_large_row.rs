mod test_utils;

use drda::{Dialect, Value};

// Exercises CNTQRY continuation: a 4096-char VARCHAR times 20 rows forces
// QRYDTA to span multiple DSS blocks.
// cargo test --test test_db2_large_row -- --nocapture
#[test]
fn test_db2_large_row_continuation() {
    test_utils::init_logger();
    let Some(mut conn) = test_utils::connect_from_env(Dialect::Db2) else {
        return;
    };

    conn.execute("DROP TABLE test_large_row", &[]).ok();
    conn.execute("CREATE TABLE test_large_row(s VARCHAR(4096))", &[])
        .unwrap();

    let big = "x".repeat(4096);
    for _ in 0..20 {
        conn.execute(
            "INSERT INTO test_large_row VALUES (?)",
            &[Value::Varchar(big.clone())],
        )
        .unwrap();
    }

    let (rows, _description) = conn.query("SELECT * FROM test_large_row", &[]).unwrap();
    assert_eq!(rows.len(), 20);
    for row in &rows {
        assert_eq!(row.get(0).unwrap().as_str(), Some(big.as_str()));
    }

    conn.close().unwrap();
}
