// tests/issuance_tests.rs

use chrono::{Duration, Utc};
use uuid::Uuid;

use pawket_common::models::voucher::VoucherKind;
use pawket_common::traits::repository_traits::VoucherRepository;
use pawket_core::Error;
use pawket_core::test_utils::stack::TestStack;

#[tokio::test]
async fn purchase_debits_and_creates_voucher_atomically() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(500).await?;
    let ty = stack.voucher_type(VoucherKind::Coupon, 300).await?;

    let voucher = stack.issuance.issue(user.user_id, ty.voucher_type_id).await?;

    assert_eq!(stack.wallet.get_balance(user.user_id).await?, 200);
    assert!(!voucher.is_used);
    assert!(voucher.code.starts_with("CPN-"));

    let stored = VoucherRepository::get(&*stack.repos, voucher.voucher_id)
        .await?
        .expect("voucher should be persisted");
    assert_eq!(stored.user_id, user.user_id);

    // One -300 entry tagged as a coupon acquisition.
    let history = stack.wallet.history(user.user_id, 10).await?;
    assert_eq!(history[0].amount, -300);
    assert!(history[0].reason.starts_with("coupon purchase:"));
    assert!(stack.wallet.audit(user.user_id).await?);
    Ok(())
}

#[tokio::test]
async fn insufficient_balance_leaves_no_trace() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(100).await?;
    let ty = stack.voucher_type(VoucherKind::Coupon, 300).await?;

    let err = stack
        .issuance
        .issue(user.user_id, ty.voucher_type_id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientBalance { .. }));

    assert_eq!(stack.wallet.get_balance(user.user_id).await?, 100);
    assert!(
        VoucherRepository::list_for_user(&*stack.repos, user.user_id)
            .await?
            .is_empty()
    );
    assert!(stack.wallet.audit(user.user_id).await?);
    Ok(())
}

#[tokio::test]
async fn expired_type_is_rejected_before_any_debit() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(500).await?;
    let ty = stack
        .voucher_type_with_window(
            VoucherKind::Coupon,
            100,
            Utc::now() - Duration::days(10),
            Utc::now() - Duration::days(1),
        )
        .await?;

    let err = stack
        .issuance
        .issue(user.user_id, ty.voucher_type_id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TypeExpired(id) if id == ty.voucher_type_id));
    assert_eq!(stack.wallet.get_balance(user.user_id).await?, 500);
    Ok(())
}

#[tokio::test]
async fn unknown_type_is_not_found() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(500).await?;

    let err = stack
        .issuance
        .issue(user.user_id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn evoucher_purchases_use_the_evoucher_prefix_and_kind() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(500).await?;
    let ty = stack.voucher_type(VoucherKind::EVoucher, 200).await?;

    let voucher = stack.issuance.issue(user.user_id, ty.voucher_type_id).await?;
    assert!(voucher.code.starts_with("EVC-"));

    let history = stack.wallet.history(user.user_id, 10).await?;
    assert_eq!(
        history[0].kind,
        pawket_common::models::wallet::WalletEntryKind::EVoucher
    );
    Ok(())
}

#[tokio::test]
async fn grant_is_free_of_charge() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(50).await?;
    let ty = stack.voucher_type(VoucherKind::Coupon, 300).await?;

    // Costs more than the user has, but grants bypass the wallet.
    let voucher = stack.issuance.grant(user.user_id, ty.voucher_type_id).await?;
    assert!(!voucher.is_used);
    assert_eq!(stack.wallet.get_balance(user.user_id).await?, 50);
    assert!(stack.wallet.audit(user.user_id).await?);
    Ok(())
}

#[tokio::test]
async fn issued_codes_are_unique() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(10_000).await?;
    let ty = stack.voucher_type(VoucherKind::Coupon, 10).await?;

    let mut codes = std::collections::HashSet::new();
    for _ in 0..50 {
        let voucher = stack.issuance.issue(user.user_id, ty.voucher_type_id).await?;
        assert!(codes.insert(voucher.code), "duplicate code issued");
    }
    Ok(())
}
