//! # Integration Test Flows
//!
//! Whole sale lifecycles driven through `CrowdsaleApi`:
//!
//! 1. **Seed → Stage 3 → close**: purchases at every price, then withdrawal
//! 2. **Stage caps**: a capped Seed stage sells out while later stages still sell
//! 3. **Fault handling**: vesting and payment failures leave no partial state
//! 4. **Config and telemetry**: JSON-configured sale with log output installed

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use stage_sale::prelude::*;

    // =============================================================================
    // FULL LIFECYCLE
    // =============================================================================

    #[tokio::test]
    async fn test_lifecycle_across_all_stages() {
        let sale = default_sale().unwrap();
        let mut rx = sale.events().subscribe();
        let alice = buyer(1);
        fund_buyer(&sale, alice, 7).unwrap();

        // Closed before the first stage.
        assert_eq!(
            sale.buy_token(alice, parse_units(50), 0).await,
            Err(SaleError::SaleNotActive)
        );

        // 50 tokens at each stage: 1 + 2 + 4 payment tokens.
        for raw in 1u8..=3 {
            sale.set_stage(OPERATOR, raw).await.unwrap();
            sale.buy_token(alice, parse_units(50), u64::from(raw)).await.unwrap();
        }
        sale.set_stage(OPERATOR, 4).await.unwrap();
        assert_eq!(
            sale.buy_token(alice, parse_units(50), 0).await,
            Err(SaleError::SaleNotActive)
        );

        assert!(sale.ledger().balance(alice).is_zero());
        assert_eq!(sale.ledger().balance(SALE_ADDRESS), parse_units(7));
        assert_eq!(sale.vesting().purchased(alice), parse_units(150));
        assert_eq!(
            sale.remaining_supply().await,
            parse_units(16_000_000 - 150)
        );

        sale.withdraw(OPERATOR, parse_units(7), 42).await.unwrap();
        assert_eq!(sale.ledger().balance(OPERATOR), parse_units(7));
        assert!(sale.ledger().balance(SALE_ADDRESS).is_zero());

        // Event order follows operation order.
        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(event.topic());
        }
        assert_eq!(
            kinds,
            vec![
                topics::STAGE_CHANGED,
                topics::TOKENS_PURCHASED,
                topics::STAGE_CHANGED,
                topics::TOKENS_PURCHASED,
                topics::STAGE_CHANGED,
                topics::TOKENS_PURCHASED,
                topics::STAGE_CHANGED,
                topics::FUNDS_WITHDRAWN,
            ]
        );

        let info = sale.sale_info().await;
        assert_eq!(info.stage, Stage::Stage4);
        assert_eq!(info.price, None);
        assert_eq!(info.collected, parse_units(7));
        assert_eq!(info.withdrawn, parse_units(7));
        assert!(info.treasury_outstanding().is_zero());

        let stats = sale.stats().await;
        assert_eq!(stats.purchases_settled, 3);
        assert_eq!(stats.purchases_rejected, 2);
        assert_eq!(stats.stage_changes, 4);
        assert_eq!(stats.withdrawals, 1);
    }

    #[tokio::test]
    async fn test_stage_can_be_reopened() {
        let sale = default_sale().unwrap();
        let alice = buyer(1);
        fund_buyer(&sale, alice, 10).unwrap();

        sale.set_stage(OPERATOR, 3).await.unwrap();
        sale.set_stage(OPERATOR, 1).await.unwrap();
        sale.buy_token(alice, parse_units(50), 0).await.unwrap();
        assert_eq!(sale.ledger().balance(alice), parse_units(9));
    }

    #[tokio::test]
    async fn test_rejections_leave_state_untouched() {
        let sale = default_sale().unwrap();
        let alice = buyer(1);
        sale.ledger().mint(alice, parse_units(1)).unwrap();
        sale.ledger().approve(alice, SALE_ADDRESS, parse_units(100)).unwrap();
        sale.set_stage(OPERATOR, 1).await.unwrap();
        let before = sale.sale_info().await;

        let attempts = [
            sale.buy_token(alice, U256::zero(), 0).await,
            sale.buy_token(alice, parse_units(17_000_000), 0).await,
            sale.buy_token(alice, parse_units(100), 0).await,
            sale.buy_token(alice, parse_units(10_000), 0).await,
            sale.buy_token(alice, U256::from(10u64), 0).await,
            sale.withdraw(alice, U256::one(), 0).await,
            sale.withdraw(OPERATOR, U256::one(), 0).await,
        ];
        assert!(attempts.iter().all(Result::is_err));
        // 10,000 tokens cost 200 against an approval of 100.
        assert!(matches!(
            attempts[3],
            Err(SaleError::InsufficientAllowance { .. })
        ));

        assert_eq!(sale.sale_info().await, before);
        assert_eq!(sale.ledger().balance(alice), parse_units(1));
        assert_eq!(
            sale.ledger().allowance(alice, SALE_ADDRESS).await.unwrap(),
            parse_units(100)
        );
        assert!(sale.vesting().total_allocated().is_zero());
    }

    // =============================================================================
    // STAGE CAPS
    // =============================================================================

    const CAPPED: &str = r#"{
        "operator": "0x0101010101010101010101010101010101010101",
        "sale_address": "0x5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a",
        "supply_for_sale_tokens": 1000,
        "stages": [
            { "stage": 1, "price": 500, "cap_tokens": 100 },
            { "stage": 2, "price": 250 },
            { "stage": 3, "price": 125 }
        ]
    }"#;

    #[tokio::test]
    async fn test_stage_cap_sells_out() {
        let sale = sale_from_json(CAPPED).unwrap();
        let alice = buyer(1);
        fund_buyer(&sale, alice, 1_000).unwrap();

        sale.set_stage(OPERATOR, 1).await.unwrap();
        sale.buy_token(alice, parse_units(100), 0).await.unwrap();

        let err = sale.buy_token(alice, parse_units(1), 0).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "All tokens in the Seed Stage sold, wait for the next sale"
        );

        sale.set_stage(OPERATOR, 2).await.unwrap();
        sale.buy_token(alice, parse_units(900), 0).await.unwrap();
        assert!(sale.remaining_supply().await.is_zero());

        sale.set_stage(OPERATOR, 3).await.unwrap();
        assert!(matches!(
            sale.buy_token(alice, parse_units(1), 0).await,
            Err(SaleError::SupplyExhausted { .. })
        ));

        let info = sale.sale_info().await;
        assert_eq!(
            info.sold,
            vec![
                (Stage::Seed, parse_units(100)),
                (Stage::Stage2, parse_units(900)),
                (Stage::Stage3, U256::zero()),
            ]
        );
    }

    // =============================================================================
    // FAULT HANDLING
    // =============================================================================

    #[tokio::test]
    async fn test_vesting_outage_moves_no_funds() {
        let sale = sale_with(FlakyLedger::default(), OfflineVesting).unwrap();
        let alice = buyer(1);
        fund_on_flaky(sale.ledger(), alice, 1).unwrap();
        sale.set_stage(OPERATOR, 1).await.unwrap();

        let err = sale.buy_token(alice, parse_units(50), 0).await.unwrap_err();
        assert!(matches!(err, SaleError::Vesting(VestingError::Unavailable(_))));
        assert_eq!(sale.ledger().inner.balance(alice), parse_units(1));
        assert_eq!(
            sale.ledger().allowance(alice, SALE_ADDRESS).await.unwrap(),
            parse_units(1)
        );
        assert!(sale.ledger().inner.balance(SALE_ADDRESS).is_zero());
        assert_eq!(sale.remaining_supply().await, parse_units(16_000_000));
    }

    #[tokio::test]
    async fn test_failed_payment_cancels_vesting_credit() {
        let vesting = InMemoryVestingRegistry::with_funding(parse_units(1_000));
        let sale = sale_with(FlakyLedger::default(), vesting).unwrap();
        let alice = buyer(1);
        fund_on_flaky(sale.ledger(), alice, 1).unwrap();
        sale.set_stage(OPERATOR, 1).await.unwrap();
        sale.ledger().break_transfer_from();

        let err = sale.buy_token(alice, parse_units(50), 0).await.unwrap_err();
        assert!(matches!(err, SaleError::Payment(TokenError::Unavailable(_))));
        assert!(!err.is_caller_error());
        assert!(sale.vesting().purchased(alice).is_zero());
        assert_eq!(sale.vesting().unallocated(), parse_units(1_000));
        assert_eq!(
            sale.ledger().allowance(alice, SALE_ADDRESS).await.unwrap(),
            parse_units(1)
        );
        assert_eq!(sale.remaining_supply().await, parse_units(16_000_000));
        assert!(sale.events().history().iter().all(|e| e.topic() != topics::TOKENS_PURCHASED));
    }

    #[tokio::test]
    async fn test_failed_rollback_is_reported() {
        let vesting = StickyVesting {
            inner: InMemoryVestingRegistry::with_funding(parse_units(1_000)),
        };
        let sale = sale_with(FlakyLedger::default(), vesting).unwrap();
        let alice = buyer(1);
        fund_on_flaky(sale.ledger(), alice, 1).unwrap();
        sale.set_stage(OPERATOR, 1).await.unwrap();
        sale.ledger().break_transfer_from();

        let err = sale.buy_token(alice, parse_units(50), 0).await.unwrap_err();
        assert!(matches!(err, SaleError::RollbackFailed(VestingError::Unavailable(_))));
        // Counters were never committed and no funds moved.
        assert_eq!(sale.remaining_supply().await, parse_units(16_000_000));
        assert!(sale.sale_info().await.collected.is_zero());
        assert_eq!(sale.ledger().inner.balance(alice), parse_units(1));
    }

    #[tokio::test]
    async fn test_direct_deposit_is_withdrawable() {
        let sale = default_sale().unwrap();
        sale.ledger().mint(SALE_ADDRESS, parse_units(5)).unwrap();

        // Direct deposits are withdrawable too.
        sale.withdraw(OPERATOR, parse_units(5), 0).await.unwrap();
        assert_eq!(sale.ledger().balance(OPERATOR), parse_units(5));
        assert_eq!(sale.sale_info().await.withdrawn, parse_units(5));
        assert!(sale.sale_info().await.collected.is_zero());
    }

    // =============================================================================
    // CONFIG AND TELEMETRY
    // =============================================================================

    #[tokio::test]
    async fn test_sale_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sale.json");
        std::fs::write(&path, CAPPED).unwrap();

        let config = SaleConfig::from_file(&path).unwrap();
        assert_eq!(config.operator, OPERATOR);
        assert_eq!(config.supply_for_sale(), parse_units(1000));

        let sale = create_in_memory_service(&config, ServiceConfig::default()).unwrap();
        assert_eq!(sale.remaining_supply().await, parse_units(1000));
        assert_eq!(sale.operator(), OPERATOR);
    }

    #[test]
    fn test_invalid_table_rejected_at_startup() {
        let json = r#"{
            "operator": "0x0101010101010101010101010101010101010101",
            "sale_address": "0x5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a",
            "stages": [
                { "stage": 1, "price": 500 },
                { "stage": 2, "price": 600 },
                { "stage": 3, "price": 125 }
            ]
        }"#;
        assert!(matches!(
            sale_from_json(json),
            Err(ConfigError::PriceNotDecreasing { .. })
        ));
    }

    #[tokio::test]
    async fn test_sale_runs_with_telemetry_installed() {
        let config = sale_telemetry::TelemetryConfig {
            console_output: false,
            log_level: "stage_sale=debug".to_string(),
            ..sale_telemetry::TelemetryConfig::default()
        };
        sale_telemetry::init_telemetry(config.clone()).unwrap();
        assert!(matches!(
            sale_telemetry::init_telemetry(config),
            Err(sale_telemetry::TelemetryError::SubscriberInit(_))
        ));

        let sale = default_sale().unwrap();
        assert!(sale.set_stage(buyer(1), 1).await.is_err());
        sale.set_stage(OPERATOR, 1).await.unwrap();
        assert_eq!(sale.stats().await.unauthorized_attempts, 1);
    }
}
