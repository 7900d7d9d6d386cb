//! Session lifecycle against SQLite: the users scenario, soft and hard
//! failure channels after close, and sessions shared through a registry.

use std::collections::BTreeMap;

use wings::{
    ConnectionConfig, FetchMode, Row, SelectQuery, Session, SessionRegistry, SqlValue,
    WingsError,
};

fn name_row(name: &str) -> Row {
    let mut map = BTreeMap::new();
    map.insert(String::from("name"), SqlValue::Text(String::from(name)));
    Row::Assoc(map)
}

async fn users_session(config: &ConnectionConfig) -> Session {
    let mut session: Session = Session::open(config, "users").await.unwrap();
    session
        .query("CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY, name TEXT)")
        .await
        .unwrap();
    session
}

#[tokio::test]
async fn users_scenario() {
    let config = ConnectionConfig::new("sqlite::memory:");
    let mut users: Session = Session::open(&config, "users").await.unwrap();
    assert_eq!(users.queries(), Some(0));
    users
        .query("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")
        .await
        .unwrap();
    let baseline = users.queries().unwrap();

    // insert -> true, one more query
    assert!(users
        .insert([
            ("id", SqlValue::Int(1)),
            ("name", SqlValue::Text(String::from("a"))),
        ])
        .await
        .unwrap());
    assert_eq!(users.queries(), Some(baseline + 1));

    // select -> session, fetch -> {name: "a"}, count -> 1
    let query = SelectQuery::new(&["name"]).where_clause("id = 1").limit(1);
    let session = users.select(&query).await.unwrap().unwrap();
    assert_eq!(session.fetch(FetchMode::Assoc), Some(name_row("a")));
    assert_eq!(session.count(), Some(1));

    // update -> true, then the new value is read back
    let updated = users.update([("name", "b")], Some("id = 1")).await;
    assert!(updated.unwrap());
    users
        .select(&SelectQuery::new(&["name"]).where_clause("id = 1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(users.fetch(FetchMode::Assoc), Some(name_row("b")));

    // delete -> 1, repeated delete -> nothing
    assert_eq!(users.delete(Some("id = 1")).await.unwrap(), Some(1));
    assert_eq!(users.delete(Some("id = 1")).await.unwrap(), None);

    users.close().await;
}

#[tokio::test]
async fn closed_session_keeps_failure_channels_apart() {
    let mut users = users_session(&ConnectionConfig::new("sqlite::memory:")).await;
    users.close().await;
    users.close().await;

    assert!(users.select(&SelectQuery::all()).await.unwrap().is_none());
    assert!(users.fetch(FetchMode::Assoc).is_none());
    assert_eq!(users.count(), None);
    assert_eq!(users.last_id(), None);
    assert_eq!(users.queries(), None);
    assert!(!users.rollback().await);
    assert!(users.debug().is_none());

    assert!(matches!(
        users.insert([("id", 1_i64)]).await,
        Err(WingsError::NotFlying)
    ));
    assert!(matches!(
        users.delete(Some("id = 1")).await,
        Err(WingsError::NotFlying)
    ));
}

#[tokio::test]
async fn delete_and_update_without_condition_touch_every_row() {
    let mut users = users_session(&ConnectionConfig::new("sqlite::memory:")).await;
    for id in 1..=4 {
        users
            .insert([
                ("id", SqlValue::Int(id)),
                ("name", SqlValue::Text(String::from("x"))),
            ])
            .await
            .unwrap();
    }

    assert!(users.update([("name", "y")], None).await.unwrap());
    assert_eq!(users.count(), Some(4));

    assert_eq!(users.delete(None).await.unwrap(), Some(4));
}

#[tokio::test]
async fn registry_sessions_share_a_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");
    let config = ConnectionConfig::new(format!("sqlite://{}?mode=rwc", path.display()));
    drop(users_session(&config).await);

    let registry: SessionRegistry = SessionRegistry::new(config);
    let writer = registry.session("users").await.unwrap();
    writer
        .lock()
        .await
        .insert([
            ("id", SqlValue::Int(1)),
            ("name", SqlValue::Text(String::from("a"))),
        ])
        .await
        .unwrap();

    let reader = registry.session("users").await.unwrap();
    let mut session = reader.lock().await;
    session
        .select(&SelectQuery::new(&["name"]))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.fetch(FetchMode::Assoc), Some(name_row("a")));
    drop(session);

    registry.close_all().await;
    assert!(!writer.lock().await.is_open());
}
