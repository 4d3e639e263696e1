// tests/redemption_tests.rs

use chrono::{Duration, Utc};

use pawket_common::models::redeem::{EVoucherToken, RedeemStatus};
use pawket_common::models::voucher::{Voucher, VoucherKind};
use pawket_common::traits::repository_traits::{EVoucherTokenRepository, VoucherRepository};
use pawket_core::Error;
use pawket_core::test_utils::stack::TestStack;

#[tokio::test]
async fn direct_redeem_marks_used_and_logs_approval() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(500).await?;
    let ty = stack.voucher_type(VoucherKind::Coupon, 100).await?;
    let voucher = stack.issuance.issue(user.user_id, ty.voucher_type_id).await?;

    let log = stack
        .redemption
        .redeem_direct(voucher.voucher_id, Some("order-42"))
        .await?;
    assert_eq!(log.status, RedeemStatus::Approved);

    let stored = VoucherRepository::get(&*stack.repos, voucher.voucher_id)
        .await?
        .expect("voucher exists");
    assert!(stored.is_used);
    assert!(stored.used_at.is_some());
    assert_eq!(stored.used_in_order.as_deref(), Some("order-42"));
    Ok(())
}

#[tokio::test]
async fn double_redeem_fails_and_both_attempts_are_logged() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(500).await?;
    let ty = stack.voucher_type(VoucherKind::Coupon, 100).await?;
    let voucher = stack.issuance.issue(user.user_id, ty.voucher_type_id).await?;

    stack
        .redemption
        .redeem_direct(voucher.voucher_id, None)
        .await?;
    let err = stack
        .redemption
        .redeem_direct(voucher.voucher_id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AlreadyUsed(id) if id == voucher.voucher_id));

    let logs = stack.repos.all_logs();
    let approved = logs
        .iter()
        .filter(|l| l.voucher_id == Some(voucher.voucher_id) && l.status == RedeemStatus::Approved)
        .count();
    let already_used = logs
        .iter()
        .filter(|l| {
            l.voucher_id == Some(voucher.voucher_id) && l.status == RedeemStatus::AlreadyUsed
        })
        .count();
    assert_eq!(approved, 1);
    assert_eq!(already_used, 1);
    Ok(())
}

#[tokio::test]
async fn redeeming_past_validity_fails_expired_and_is_logged() -> Result<(), Error> {
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

    // Issued while the type was still valid; inserted directly since the
    // window has since closed.
    let voucher = Voucher::new(user.user_id, ty.voucher_type_id, "CPN-OLDTIMES1");
    VoucherRepository::create(&*stack.repos, &voucher).await?;

    let err = stack
        .redemption
        .redeem_direct(voucher.voucher_id, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Expired(id) if id == voucher.voucher_id));

    let logs = stack.repos.all_logs();
    assert!(
        logs.iter()
            .any(|l| l.voucher_id == Some(voucher.voucher_id)
                && l.status == RedeemStatus::Expired)
    );

    let stored = VoucherRepository::get(&*stack.repos, voucher.voucher_id)
        .await?
        .expect("voucher exists");
    assert!(!stored.is_used);
    Ok(())
}

#[tokio::test]
async fn token_flow_redeems_once_then_presents_as_unknown() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(500).await?;
    let ty = stack.voucher_type(VoucherKind::EVoucher, 200).await?;
    let voucher = stack.issuance.issue(user.user_id, ty.voucher_type_id).await?;

    let token = stack.redemption.issue_token(voucher.voucher_id).await?;
    let log = stack
        .redemption
        .redeem_by_token(&token.token_value, Some("kiosk-7"))
        .await?;
    assert_eq!(log.status, RedeemStatus::Approved);
    assert_eq!(log.token_id, Some(token.token_id));

    let stored = EVoucherTokenRepository::get_by_value(&*stack.repos, &token.token_value)
        .await?
        .expect("token exists");
    assert!(stored.is_consumed());

    // Replaying the consumed token is indistinguishable from an unknown
    // token.
    let err = stack
        .redemption
        .redeem_by_token(&token.token_value, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TokenNotFound));
    Ok(())
}

#[tokio::test]
async fn expired_token_fails_even_when_never_revoked() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(500).await?;
    let ty = stack.voucher_type(VoucherKind::EVoucher, 200).await?;
    let voucher = stack.issuance.issue(user.user_id, ty.voucher_type_id).await?;

    let mut token = EVoucherToken::new(voucher.voucher_id, "tok-expired", Duration::minutes(5));
    token.expires_at = Utc::now() - Duration::seconds(1);
    EVoucherTokenRepository::insert(&*stack.repos, &token).await?;

    let err = stack
        .redemption
        .redeem_by_token(&token.token_value, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TokenExpired));

    let logs = stack.repos.all_logs();
    assert!(
        logs.iter()
            .any(|l| l.token_id == Some(token.token_id) && l.status == RedeemStatus::Expired)
    );

    let stored = VoucherRepository::get(&*stack.repos, voucher.voucher_id)
        .await?
        .expect("voucher exists");
    assert!(!stored.is_used);
    Ok(())
}

#[tokio::test]
async fn revoked_token_is_rejected_and_revoke_is_idempotent() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(500).await?;
    let ty = stack.voucher_type(VoucherKind::EVoucher, 200).await?;
    let voucher = stack.issuance.issue(user.user_id, ty.voucher_type_id).await?;

    let token = stack.redemption.issue_token(voucher.voucher_id).await?;
    stack.redemption.revoke_token(&token.token_value).await?;
    stack.redemption.revoke_token(&token.token_value).await?;

    let err = stack
        .redemption
        .redeem_by_token(&token.token_value, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::TokenRevoked));

    let logs = stack.repos.all_logs();
    assert!(
        logs.iter()
            .any(|l| l.token_id == Some(token.token_id) && l.status == RedeemStatus::Revoked)
    );
    Ok(())
}

#[tokio::test]
async fn tokens_are_only_issued_for_evouchers() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(500).await?;
    let ty = stack.voucher_type(VoucherKind::Coupon, 100).await?;
    let voucher = stack.issuance.issue(user.user_id, ty.voucher_type_id).await?;

    let err = stack
        .redemption
        .issue_token(voucher.voucher_id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    Ok(())
}

#[tokio::test]
async fn redemption_never_touches_the_wallet() -> Result<(), Error> {
    let stack = TestStack::new();
    let user = stack.user_with_points(500).await?;
    let ty = stack.voucher_type(VoucherKind::Coupon, 300).await?;
    let voucher = stack.issuance.issue(user.user_id, ty.voucher_type_id).await?;
    assert_eq!(stack.wallet.get_balance(user.user_id).await?, 200);

    stack
        .redemption
        .redeem_direct(voucher.voucher_id, Some("order-1"))
        .await?;

    // No refund, no charge; ledger still consistent.
    assert_eq!(stack.wallet.get_balance(user.user_id).await?, 200);
    assert!(stack.wallet.audit(user.user_id).await?);
    Ok(())
}
