use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    AccountChanges, AccountSplit, CategorySplit, Engine, EngineError, FixedRates,
    TransactionInput,
};
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
    let engine = Engine::builder()
        .database(db.clone())
        .rates(Arc::new(FixedRates::new()))
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

fn simple_input(description: &str, day: u32) -> TransactionInput {
    TransactionInput {
        description: description.to_string(),
        original_description: None,
        amount: dec!(20.000),
        currency: "EUR".to_string(),
        date: date(day),
        accounts: Vec::new(),
        categories: Vec::new(),
    }
}

#[tokio::test]
async fn create_records_header_and_split_lines() {
    let (engine, _db) = engine_with_db().await;

    let account = engine
        .create_account("alice", "Checking", "EUR", dec!(100.000))
        .await
        .unwrap();
    let category = engine
        .create_category("alice", "Food", "EUR", None)
        .await
        .unwrap();

    let mut input = simple_input("Groceries run", 10);
    input.original_description = Some("POS 1234 GROCERIES".to_string());
    input.accounts = vec![AccountSplit {
        account_id: account.id,
        amount: dec!(-20.000),
        verified: false,
    }];
    input.categories = vec![CategorySplit {
        category_id: category.id,
        amount: dec!(20.000),
    }];

    let tx = engine.create_transaction("alice", input).await.unwrap();
    assert_eq!(tx.description, "Groceries run");
    assert_eq!(tx.currency, "EUR");
    assert_eq!(tx.accounts.len(), 1);
    assert_eq!(tx.accounts[0].amount, dec!(-20.000));
    assert_eq!(tx.categories.len(), 1);
    assert_eq!(tx.categories[0].amount, dec!(20.000));

    let fetched = engine.transaction("alice", tx.id).await.unwrap();
    assert_eq!(fetched, tx);
}

#[tokio::test]
async fn splits_must_reference_own_accounts_and_categories() {
    let (engine, _db) = engine_with_db().await;

    let bobs_account = engine
        .create_account("bob", "Checking", "EUR", dec!(0.000))
        .await
        .unwrap();
    let bobs_category = engine
        .create_category("bob", "Food", "EUR", None)
        .await
        .unwrap();

    let mut input = simple_input("Sneaky", 1);
    input.accounts = vec![AccountSplit {
        account_id: bobs_account.id,
        amount: dec!(1.000),
        verified: false,
    }];
    let err = engine.create_transaction("alice", input).await.unwrap_err();
    assert!(matches!(err, EngineError::BadRequest(_)));

    let mut input = simple_input("Sneaky", 1);
    input.categories = vec![CategorySplit {
        category_id: bobs_category.id,
        amount: dec!(1.000),
    }];
    let err = engine.create_transaction("alice", input).await.unwrap_err();
    assert!(matches!(err, EngineError::BadRequest(_)));
}

#[tokio::test]
async fn duplicate_splits_are_rejected() {
    let (engine, _db) = engine_with_db().await;

    let category = engine
        .create_category("alice", "Food", "EUR", None)
        .await
        .unwrap();

    let mut input = simple_input("Twice", 2);
    input.categories = vec![
        CategorySplit {
            category_id: category.id,
            amount: dec!(10.000),
        },
        CategorySplit {
            category_id: category.id,
            amount: dec!(10.000),
        },
    ];
    let err = engine.create_transaction("alice", input).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::BadRequest("duplicate category split".to_string())
    );
}

#[tokio::test]
async fn listing_is_most_recent_first_and_owner_scoped() {
    let (engine, _db) = engine_with_db().await;

    engine
        .create_transaction("alice", simple_input("Older", 5))
        .await
        .unwrap();
    engine
        .create_transaction("alice", simple_input("Newer", 20))
        .await
        .unwrap();
    engine
        .create_transaction("bob", simple_input("Bobs", 25))
        .await
        .unwrap();

    let listed = engine.transactions("alice").await.unwrap();
    let descriptions: Vec<&str> = listed
        .iter()
        .map(|transaction| transaction.description.as_str())
        .collect();
    assert_eq!(descriptions, vec!["Newer", "Older"]);
}

#[tokio::test]
async fn delete_removes_transaction_and_lines() {
    let (engine, _db) = engine_with_db().await;

    let category = engine
        .create_category("alice", "Food", "EUR", None)
        .await
        .unwrap();
    let mut input = simple_input("Short lived", 3);
    input.categories = vec![CategorySplit {
        category_id: category.id,
        amount: dec!(20.000),
    }];
    let tx = engine.create_transaction("alice", input).await.unwrap();

    let err = engine.delete_transaction("bob", tx.id).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("transaction".to_string()));

    engine.delete_transaction("alice", tx.id).await.unwrap();
    let err = engine.transaction("alice", tx.id).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("transaction".to_string()));

    // With its lines gone, the category can be deleted again.
    engine.delete_category("alice", category.id).await.unwrap();
}

#[tokio::test]
async fn accounts_crud_is_owner_scoped() {
    let (engine, _db) = engine_with_db().await;

    let account = engine
        .create_account("alice", "Checking", "EUR", dec!(100.000))
        .await
        .unwrap();
    assert_eq!(account.currency, "EUR");

    let err = engine.account("bob", account.id).await.unwrap_err();
    assert_eq!(err, EngineError::NotFound("account".to_string()));

    let updated = engine
        .update_account(
            "alice",
            account.id,
            AccountChanges {
                name: Some("Main checking".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Main checking");
    assert_eq!(updated.start_balance, dec!(100.000));

    let listed = engine.list_accounts("alice").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(engine.list_accounts("bob").await.unwrap().is_empty());

    engine.delete_account("alice", account.id).await.unwrap();
    assert!(engine.list_accounts("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn account_with_lines_cannot_be_deleted() {
    let (engine, _db) = engine_with_db().await;

    let account = engine
        .create_account("alice", "Checking", "EUR", dec!(0.000))
        .await
        .unwrap();
    let mut input = simple_input("Linked", 4);
    input.accounts = vec![AccountSplit {
        account_id: account.id,
        amount: dec!(-20.000),
        verified: true,
    }];
    engine.create_transaction("alice", input).await.unwrap();

    let err = engine.delete_account("alice", account.id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::BadRequest("account still has transaction lines".to_string())
    );
}
