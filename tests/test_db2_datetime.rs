mod test_utils;

use drda::{Dialect, Value};
use time::{Date, Month, PrimitiveDateTime, Time};

// cargo test --test test_db2_datetime -- --nocapture
#[test]
fn test_db2_datetime_round_trip() {
    test_utils::init_logger();
    let Some(mut conn) = test_utils::connect_from_env(Dialect::Db2) else {
        return;
    };

    conn.execute("DROP TABLE test_datetime", &[]).ok();
    conn.execute(
        "CREATE TABLE test_datetime(d DATE, t TIME, ts TIMESTAMP)",
        &[],
    )
    .unwrap();

    let date = Date::from_calendar_date(2019, Month::April, 30).unwrap();
    let time = Time::from_hms(12, 34, 56).unwrap();
    let timestamp = PrimitiveDateTime::new(date, Time::from_hms_micro(12, 34, 56, 123_456).unwrap());

    conn.execute(
        "INSERT INTO test_datetime VALUES (?, ?, ?)",
        &[
            Value::Date(date),
            Value::Time(time),
            Value::Timestamp(timestamp),
        ],
    )
    .unwrap();

    let (rows, _description) = conn.query("SELECT * FROM test_datetime", &[]).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get(0).unwrap(), &Value::Date(date));
    assert_eq!(rows[0].get(1).unwrap(), &Value::Time(time));
    assert_eq!(rows[0].get(2).unwrap(), &Value::Timestamp(timestamp));

    conn.close().unwrap();
}
