//! Integration tests for the Ledger Manager.

mod common;

use gophermart_core::ledger::{BalanceSnapshot, LedgerError};
use gophermart_db::entities::withdrawals;
use gophermart_db::{LedgerRepository, OrderRepository};
use gophermart_shared::types::{Amount, UserId};
use sea_orm::{EntityTrait, PaginatorTrait, TransactionTrait};

fn snapshot(current: i64, withdrawn: i64) -> BalanceSnapshot {
    BalanceSnapshot {
        current: Amount::from_minor(current),
        withdrawn: Amount::from_minor(withdrawn),
    }
}

#[tokio::test]
async fn test_balance_tracks_credits_and_debits() {
    let db = common::setup_db().await;
    let user_id = common::create_user(&db).await;
    let ledger = LedgerRepository::new(db.clone());

    for credit in [10_000, 2_550, 0] {
        LedgerRepository::credit(&db, user_id, Amount::from_minor(credit))
            .await
            .unwrap();
    }
    for debit in [1_000, 50] {
        LedgerRepository::debit(&db, user_id, Amount::from_minor(debit))
            .await
            .unwrap();
    }

    // 12_550 credited, 1_050 debited.
    assert_eq!(ledger.balance(user_id).await.unwrap(), snapshot(11_500, 1_050));
}

#[tokio::test]
async fn test_failed_debit_changes_nothing() {
    let db = common::setup_db().await;
    let user_id = common::create_funded_user(&db, 100).await;
    let ledger = LedgerRepository::new(db.clone());

    let err = LedgerRepository::debit(&db, user_id, Amount::from_minor(101))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::InsufficientFunds));
    assert_eq!(ledger.balance(user_id).await.unwrap(), snapshot(100, 0));
}

#[tokio::test]
async fn test_debit_of_entire_balance_succeeds() {
    let db = common::setup_db().await;
    let user_id = common::create_funded_user(&db, 100).await;
    let ledger = LedgerRepository::new(db.clone());

    LedgerRepository::debit(&db, user_id, Amount::from_minor(100))
        .await
        .unwrap();

    assert_eq!(ledger.balance(user_id).await.unwrap(), snapshot(0, 100));
}

#[tokio::test]
async fn test_unknown_user() {
    let db = common::setup_db().await;
    let ghost = UserId::new();
    let ledger = LedgerRepository::new(db.clone());

    assert!(matches!(
        LedgerRepository::credit(&db, ghost, Amount::from_minor(1)).await,
        Err(LedgerError::UserNotFound(id)) if id == ghost.into_inner()
    ));
    assert!(matches!(
        LedgerRepository::debit(&db, ghost, Amount::from_minor(1)).await,
        Err(LedgerError::UserNotFound(_))
    ));
    assert!(matches!(
        ledger.balance(ghost).await,
        Err(LedgerError::UserNotFound(_))
    ));
}

#[tokio::test]
async fn test_amount_sign_rules() {
    let db = common::setup_db().await;
    let user_id = common::create_funded_user(&db, 100).await;

    assert!(matches!(
        LedgerRepository::credit(&db, user_id, Amount::from_minor(-1)).await,
        Err(LedgerError::InvalidAmount)
    ));
    assert!(matches!(
        LedgerRepository::debit(&db, user_id, Amount::ZERO).await,
        Err(LedgerError::InvalidAmount)
    ));
}

#[tokio::test]
async fn test_withdraw_records_and_debits() {
    let db = common::setup_db().await;
    let user_id = common::create_funded_user(&db, 75_100).await;
    let ledger = LedgerRepository::new(db.clone());

    let withdrawal = ledger
        .withdraw("2377225624", Amount::from_minor(75_100), user_id)
        .await
        .unwrap();

    assert_eq!(withdrawal.number, "2377225624");
    assert_eq!(withdrawal.sum, Amount::from_minor(75_100));
    assert_eq!(withdrawal.user_id, user_id);
    assert_eq!(ledger.balance(user_id).await.unwrap(), snapshot(0, 75_100));
    assert_eq!(ledger.list_withdrawals(user_id).await.unwrap(), vec![withdrawal]);
}

#[tokio::test]
async fn test_withdraw_insufficient_funds_leaves_no_record() {
    let db = common::setup_db().await;
    let user_id = common::create_funded_user(&db, 100).await;
    let ledger = LedgerRepository::new(db.clone());

    let err = ledger
        .withdraw("2377225624", Amount::from_minor(500), user_id)
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::InsufficientFunds));
    assert_eq!(ledger.balance(user_id).await.unwrap(), snapshot(100, 0));
    assert_eq!(withdrawals::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_withdraw_validates_request_first() {
    let db = common::setup_db().await;
    let user_id = common::create_funded_user(&db, 100).await;
    let ledger = LedgerRepository::new(db.clone());

    assert!(matches!(
        ledger.withdraw("2377225625", Amount::from_minor(1), user_id).await,
        Err(LedgerError::InvalidNumber(_))
    ));
    assert!(matches!(
        ledger.withdraw("2377225624", Amount::ZERO, user_id).await,
        Err(LedgerError::InvalidAmount)
    ));
    assert_eq!(ledger.balance(user_id).await.unwrap(), snapshot(100, 0));
}

#[tokio::test]
async fn test_withdraw_number_used_by_withdrawal_conflicts() {
    let db = common::setup_db().await;
    let user_id = common::create_funded_user(&db, 1_000).await;
    let ledger = LedgerRepository::new(db.clone());

    ledger
        .withdraw("2377225624", Amount::from_minor(100), user_id)
        .await
        .unwrap();
    let err = ledger
        .withdraw("2377225624", Amount::from_minor(100), user_id)
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::DuplicateWithdrawalNumber(_)));
    assert_eq!(ledger.balance(user_id).await.unwrap(), snapshot(900, 100));
}

#[tokio::test]
async fn test_withdraw_number_used_by_order_conflicts() {
    let db = common::setup_db().await;
    let user_id = common::create_funded_user(&db, 1_000).await;
    let other = common::create_user(&db).await;
    OrderRepository::new(db.clone())
        .submit("12345678903", other)
        .await
        .unwrap();
    let ledger = LedgerRepository::new(db.clone());

    let err = ledger
        .withdraw("12345678903", Amount::from_minor(100), user_id)
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::DuplicateWithdrawalNumber(_)));
    assert_eq!(ledger.balance(user_id).await.unwrap(), snapshot(1_000, 0));
}

#[tokio::test]
async fn test_failed_record_rolls_back_debit() {
    let db = common::setup_db().await;
    let user_id = common::create_funded_user(&db, 1_000).await;
    let ledger = LedgerRepository::new(db.clone());
    ledger
        .withdraw("2377225624", Amount::from_minor(100), user_id)
        .await
        .unwrap();

    // Same steps as `withdraw`, minus its up-front uniqueness check.
    let txn = db.begin().await.unwrap();
    LedgerRepository::debit(&txn, user_id, Amount::from_minor(50))
        .await
        .unwrap();
    let recorded =
        LedgerRepository::record_withdrawal(&txn, "2377225624", Amount::from_minor(50), user_id)
            .await;
    drop(txn);

    assert!(matches!(
        recorded,
        Err(LedgerError::DuplicateWithdrawalNumber(number)) if number == "2377225624"
    ));
    assert_eq!(ledger.balance(user_id).await.unwrap(), snapshot(900, 100));
    assert_eq!(withdrawals::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_duplicate_number_reported_before_insufficient_funds() {
    let db = common::setup_db().await;
    let user_id = common::create_user(&db).await;
    OrderRepository::new(db.clone())
        .submit("12345678903", user_id)
        .await
        .unwrap();
    let ledger = LedgerRepository::new(db);

    assert!(matches!(
        ledger
            .withdraw("12345678903", Amount::from_minor(100), user_id)
            .await,
        Err(LedgerError::DuplicateWithdrawalNumber(_))
    ));
}

#[tokio::test]
async fn test_concurrent_withdrawals_cannot_overdraw() {
    let db = common::setup_db().await;
    let user_id = common::create_funded_user(&db, 100).await;
    let ledger = LedgerRepository::new(db.clone());

    let (a, b) = tokio::join!(
        ledger.withdraw("2377225624", Amount::from_minor(60), user_id),
        ledger.withdraw("79927398713", Amount::from_minor(60), user_id)
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);
    let failure = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
    assert!(matches!(failure, LedgerError::InsufficientFunds));
    assert_eq!(ledger.balance(user_id).await.unwrap(), snapshot(40, 60));
    assert_eq!(ledger.list_withdrawals(user_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_debits_cannot_overdraw() {
    let db = common::setup_db().await;
    let user_id = common::create_funded_user(&db, 100).await;

    let results = futures::future::join_all((0..5).map(|_| {
        let db = db.clone();
        async move { LedgerRepository::debit(&db, user_id, Amount::from_minor(60)).await }
    }))
    .await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let ledger = LedgerRepository::new(db);
    assert_eq!(ledger.balance(user_id).await.unwrap(), snapshot(40, 60));
}

#[tokio::test]
async fn test_list_withdrawals_oldest_first_and_scoped() {
    let db = common::setup_db().await;
    let user_id = common::create_funded_user(&db, 1_000).await;
    let other = common::create_funded_user(&db, 1_000).await;
    let ledger = LedgerRepository::new(db);

    ledger
        .withdraw("2377225624", Amount::from_minor(100), user_id)
        .await
        .unwrap();
    ledger
        .withdraw("79927398713", Amount::from_minor(200), user_id)
        .await
        .unwrap();
    ledger
        .withdraw("4561261212345467", Amount::from_minor(300), other)
        .await
        .unwrap();

    let list = ledger.list_withdrawals(user_id).await.unwrap();
    let numbers: Vec<&str> = list.iter().map(|w| w.number.as_str()).collect();
    assert_eq!(numbers, ["2377225624", "79927398713"]);
    assert!(ledger.list_withdrawals(UserId::new()).await.unwrap().is_empty());
}
