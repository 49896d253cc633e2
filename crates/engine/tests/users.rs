use std::sync::Arc;

use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Engine, EngineError, FixedRates, UserChanges};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for username in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (username, password, first_name, last_name, preferred_currency_id) \
             VALUES (?, ?, ?, ?, \
             (SELECT id FROM currencies WHERE code = 'EUR' AND owner_username IS NULL))",
            vec![
                username.into(),
                "password".into(),
                "Test".into(),
                "User".into(),
            ],
        ))
        .await
        .unwrap();
    }
    let rates = FixedRates::new().with("EUR", "GBP", dec!(0.50));
    let engine = Engine::builder()
        .database(db.clone())
        .rates(Arc::new(rates))
        .build()
        .await
        .unwrap();
    (engine, db)
}

#[tokio::test]
async fn preferred_currency_change_rescales_owned_rates() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_currency("alice", "AAA", "Alpha points", dec!(2.000))
        .await
        .unwrap();
    engine
        .create_currency("alice", "BBB", "Beta points", dec!(0.500))
        .await
        .unwrap();
    engine
        .create_currency("bob", "CCC", "Gamma points", dec!(3.000))
        .await
        .unwrap();

    let profile = engine
        .update_user(
            "alice",
            "alice",
            UserChanges {
                preferred_currency: Some("GBP".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(profile.preferred_currency.as_deref(), Some("GBP"));

    let currencies = engine.list_currencies("alice").await.unwrap();
    let rate_of = |code: &str| {
        currencies
            .iter()
            .find(|currency| currency.code == code)
            .unwrap()
            .rate
    };
    assert_eq!(rate_of("AAA"), dec!(1.000));
    assert_eq!(rate_of("BBB"), dec!(0.250));
    // Shared rows keep their rate.
    assert_eq!(rate_of("EUR"), dec!(1.000));
    assert_eq!(rate_of("GBP"), dec!(1.000));

    // Another user's owned rates are untouched.
    let bobs = engine.list_currencies("bob").await.unwrap();
    let ccc = bobs.iter().find(|currency| currency.code == "CCC").unwrap();
    assert_eq!(ccc.rate, dec!(3.000));
}

#[tokio::test]
async fn unknown_preferred_currency_is_skipped_but_other_fields_apply() {
    let (engine, _db) = engine_with_db().await;

    let profile = engine
        .update_user(
            "alice",
            "alice",
            UserChanges {
                first_name: Some("Alicia".to_string()),
                preferred_currency: Some("XXX".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(profile.first_name, "Alicia");
    assert_eq!(profile.preferred_currency.as_deref(), Some("EUR"));
}

#[tokio::test]
async fn preferred_currency_without_rate_is_bad_request() {
    let (engine, _db) = engine_with_db().await;

    // USD resolves but no EUR->USD rate is configured.
    let err = engine
        .update_user(
            "alice",
            "alice",
            UserChanges {
                preferred_currency: Some("USD".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BadRequest(_)));
}

#[tokio::test]
async fn users_can_only_update_their_own_profile() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .update_user(
            "alice",
            "bob",
            UserChanges {
                first_name: Some("Robert".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Forbidden(_)));
}

#[tokio::test]
async fn own_profile_carries_more_details_than_others() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_email("alice", "alice@example.net")
        .await
        .unwrap();

    let own = engine.user("alice", "alice").await.unwrap();
    assert_eq!(own.preferred_currency.as_deref(), Some("EUR"));
    assert_eq!(
        own.emails,
        Some(vec!["alice@example.net".to_string()])
    );

    let other = engine.user("bob", "alice").await.unwrap();
    assert_eq!(other.preferred_currency, None);
    assert_eq!(other.emails, None);

    let err = engine.user("alice", "nobody").await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("user".to_string()));
}

#[tokio::test]
async fn email_addresses_are_unique_per_user() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_email("alice", "alice@example.net")
        .await
        .unwrap();
    let err = engine
        .create_email("alice", "alice@example.net")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::BadRequest(_)));

    // The same address under another user is fine.
    engine
        .create_email("bob", "alice@example.net")
        .await
        .unwrap();

    let err = engine.create_email("alice", "not-an-address").await.unwrap_err();
    assert!(matches!(err, EngineError::BadRequest(_)));

    engine
        .update_email("alice", "alice@example.net", "a@example.net")
        .await
        .unwrap();
    assert_eq!(
        engine.list_emails("alice").await.unwrap(),
        vec!["a@example.net".to_string()]
    );

    engine.delete_email("alice", "a@example.net").await.unwrap();
    assert!(engine.list_emails("alice").await.unwrap().is_empty());
    let err = engine
        .delete_email("alice", "a@example.net")
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("email address".to_string()));
}

#[tokio::test]
async fn contacts_are_links_to_existing_users() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.create_contact("alice", "nobody").await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("user".to_string()));

    engine.create_contact("alice", "bob").await.unwrap();
    let err = engine.create_contact("alice", "bob").await.unwrap_err();
    assert!(matches!(err, EngineError::BadRequest(_)));

    let contacts = engine.list_contacts("alice").await.unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].username, "bob");

    engine.delete_contact("alice", "bob").await.unwrap();
    assert!(engine.list_contacts("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn search_matches_names_or_exact_email() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_email("bob", "bob@example.net")
        .await
        .unwrap();

    let by_name = engine.search_users("alice", "bo").await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].username, "bob");

    let by_email = engine
        .search_users("alice", "bob@example.net")
        .await
        .unwrap();
    assert_eq!(by_email.len(), 1);
    assert_eq!(by_email[0].username, "bob");

    // Substring match never includes the requestor.
    let excluding_self = engine.search_users("alice", "Test").await.unwrap();
    assert_eq!(excluding_self.len(), 1);
    assert_eq!(excluding_self[0].username, "bob");
}
