mod test_utils;

use bigdecimal::BigDecimal;
use drda::{Dialect, Value};
use std::str::FromStr;

// cargo test --test test_derby_ddl_dml -- --nocapture
#[test]
fn test_derby_ddl_dml() {
    test_utils::init_logger();
    let Some(mut conn) = test_utils::connect_from_env(Dialect::Derby) else {
        return;
    };

    conn.execute("DROP TABLE test", &[]).ok();
    conn.execute(
        "CREATE TABLE test(s VARCHAR(20), i int, d1 decimal(2,1), d2 decimal(11,2))",
        &[],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO test VALUES ('abcdefghijklmnopq', 1, 1.1, 123456789.12)",
        &[],
    )
    .unwrap();
    conn.execute("INSERT INTO test VALUES ('B', 2, 1.2, 2)", &[]).unwrap();
    conn.execute("INSERT INTO test VALUES ('C', 3, null, null)", &[])
        .unwrap();

    let (rows, description) = conn.query("SELECT * FROM test", &[]).unwrap();
    assert_eq!(rows.len(), 3);

    assert_eq!(rows[0].get(0).unwrap().as_str(), Some("abcdefghijklmnopq"));
    assert_eq!(rows[0].get(1).unwrap(), &Value::Integer(1));
    assert_eq!(rows[0].get(2).unwrap(), &Value::Decimal(BigDecimal::from_str("1.1").unwrap()));
    assert_eq!(
        rows[0].get(3).unwrap(),
        &Value::Decimal(BigDecimal::from_str("123456789.12").unwrap())
    );

    assert_eq!(rows[2].get(2).unwrap(), &Value::Null);
    assert_eq!(rows[2].get(3).unwrap(), &Value::Null);

    // Expected description shape: (name, sqltype, display-size,
    // internal-size, precision, scale, null-ok=None).
    assert_eq!(description[0].name, "S");
    assert_eq!(description[1].name, "I");
    assert_eq!(description[2].name, "D1");
    assert_eq!(description[2].precision, 2);
    assert_eq!(description[2].scale, 1);
    assert_eq!(description[3].name, "D2");
    assert_eq!(description[3].precision, 11);
    assert_eq!(description[3].scale, 2);

    conn.close().unwrap();
}
