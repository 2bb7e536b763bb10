mod test_utils;

use drda::{Dialect, Value};

// cargo test --test test_db2_params -- --nocapture
#[test]
fn test_db2_parameterized_query() {
    test_utils::init_logger();
    let Some(mut conn) = test_utils::connect_from_env(Dialect::Db2) else {
        return;
    };

    conn.execute("DROP TABLE test_basic", &[]).ok();
    conn.execute("CREATE TABLE test_basic(s VARCHAR(20), i INTEGER)", &[])
        .unwrap();
    conn.execute(
        "INSERT INTO test_basic VALUES (?, ?)",
        &[
            Value::Varchar("abcdefghijklmnopq".to_string()),
            Value::Integer(1),
        ],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO test_basic VALUES (?, ?)",
        &[Value::Varchar("other".to_string()), Value::Integer(2)],
    )
    .unwrap();

    let (rows, _description) = conn
        .query(
            "SELECT * FROM test_basic WHERE s = ? AND i = ?",
            &[
                Value::Varchar("abcdefghijklmnopq".to_string()),
                Value::Integer(1),
            ],
        )
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get(0).unwrap().as_str(), Some("abcdefghijklmnopq"));
    assert_eq!(rows[0].get(1).unwrap(), &Value::Integer(1));

    conn.close().unwrap();
}
