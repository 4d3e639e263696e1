// tests/wallet_tests.rs

use pawket_core::Error;
use pawket_core::test_utils::stack::TestStack;

#[tokio::test]
async fn balance_always_equals_history_sum() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(0).await?;

    stack.wallet.credit(user.user_id, 500, "signup bonus").await?;
    stack.wallet.debit(user.user_id, 120, "shop order").await?;
    stack.wallet.credit(user.user_id, 30, "daily login").await?;
    stack.wallet.debit(user.user_id, 10, "shop order").await?;

    assert_eq!(stack.wallet.get_balance(user.user_id).await?, 400);
    assert!(stack.wallet.audit(user.user_id).await?);
    Ok(())
}

#[tokio::test]
async fn debit_never_overdraws() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(100).await?;

    let err = stack
        .wallet
        .debit(user.user_id, 300, "shop order")
        .await
        .unwrap_err();
    match err {
        Error::InsufficientBalance {
            available,
            required,
        } => {
            assert_eq!(available, 100);
            assert_eq!(required, 300);
        }
        other => panic!("expected InsufficientBalance, got {:?}", other),
    }

    // Balance and ledger untouched by the rejected debit.
    assert_eq!(stack.wallet.get_balance(user.user_id).await?, 100);
    assert!(stack.wallet.audit(user.user_id).await?);
    assert_eq!(stack.wallet.history(user.user_id, 50).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(100).await?;

    assert!(matches!(
        stack.wallet.credit(user.user_id, 0, "nope").await,
        Err(Error::InvalidAmount(0))
    ));
    assert!(matches!(
        stack.wallet.credit(user.user_id, -5, "nope").await,
        Err(Error::InvalidAmount(-5))
    ));
    assert!(matches!(
        stack.wallet.debit(user.user_id, 0, "nope").await,
        Err(Error::InvalidAmount(0))
    ));

    assert_eq!(stack.wallet.get_balance(user.user_id).await?, 100);
    Ok(())
}

#[tokio::test]
async fn unknown_wallet_reports_not_found() {
    let stack = TestStack::new();
    let result = stack.wallet.get_balance(uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn history_is_newest_first_and_signed() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(0).await?;

    stack.wallet.credit(user.user_id, 200, "first").await?;
    stack.wallet.debit(user.user_id, 50, "second").await?;

    let history = stack.wallet.history(user.user_id, 10).await?;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].amount, -50);
    assert_eq!(history[0].reason, "second");
    assert_eq!(history[1].amount, 200);
    Ok(())
}
