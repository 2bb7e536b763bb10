mod test_utils;

use drda::{Dialect, DrdaError};

// cargo test --test test_derby_error -- --nocapture
#[test]
fn test_derby_error() {
    test_utils::init_logger();
    let Some(mut conn) = test_utils::connect_from_env(Dialect::Derby) else {
        return;
    };

    let result = conn.execute("invalid query", &[]);
    match result {
        Err(DrdaError::OperationalError { sqlcode, .. }) => {
            assert!(sqlcode < 0);
        }
        other => panic!("expected OperationalError, got {other:?}"),
    }

    conn.close().unwrap();
}
