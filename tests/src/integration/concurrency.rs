//! # Concurrent Buyers
//!
//! Many tasks buying from one sale at once. Whatever the interleaving, the
//! sale never sells more than its supply and every unit of payment the
//! treasury holds is matched by a credited purchase.

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use futures::future::join_all;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use stage_sale::prelude::*;
    use std::sync::Arc;

    const SMALL_SUPPLY: &str = r#"{
        "operator": "0x0101010101010101010101010101010101010101",
        "sale_address": "0x5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a",
        "supply_for_sale_tokens": 1000
    }"#;

    const BUYERS: u8 = 16;
    const ORDERS_PER_BUYER: usize = 8;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_buyers_never_oversell() {
        let sale = Arc::new(sale_from_json(SMALL_SUPPLY).unwrap());
        for i in 0..BUYERS {
            fund_buyer(&sale, buyer(i), 1_000).unwrap();
        }
        sale.set_stage(OPERATOR, 1).await.unwrap();

        let handles = (0..BUYERS).map(|i| {
            let sale = Arc::clone(&sale);
            let mut rng = StdRng::seed_from_u64(u64::from(i));
            tokio::spawn(async move {
                let mut bought = U256::zero();
                for _ in 0..ORDERS_PER_BUYER {
                    let amount = parse_units(rng.gen_range(1..=40u64));
                    match sale.buy_token(buyer(i), amount, u64::from(i)).await {
                        Ok(()) => bought += amount,
                        Err(SaleError::SupplyExhausted { .. }) => {}
                        Err(other) => panic!("unexpected rejection: {other}"),
                    }
                }
                bought
            })
        });

        let mut total_bought = U256::zero();
        for result in join_all(handles).await {
            total_bought += result.unwrap();
        }

        let info = sale.sale_info().await;
        assert!(total_bought <= parse_units(1000));
        assert_eq!(info.remaining_supply + total_bought, parse_units(1000));
        assert_eq!(sale.vesting().total_allocated(), total_bought);

        // 500 tokens per 10 payment tokens: cost is exactly amount / 50.
        assert_eq!(info.collected, total_bought / U256::from(50u64));
        assert_eq!(sale.ledger().balance(SALE_ADDRESS), info.collected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_last_tokens_go_to_exactly_one_buyer() {
        let sale = Arc::new(sale_from_json(SMALL_SUPPLY).unwrap());
        for i in 0..BUYERS {
            fund_buyer(&sale, buyer(i), 100).unwrap();
        }
        sale.set_stage(OPERATOR, 1).await.unwrap();

        let attempts = (0..BUYERS).map(|i| {
            let sale = Arc::clone(&sale);
            tokio::spawn(async move { sale.buy_token(buyer(i), parse_units(1000), 0).await })
        });

        let winners = join_all(attempts)
            .await
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(()))))
            .count();
        assert_eq!(winners, 1);
        assert!(sale.remaining_supply().await.is_zero());
        assert_eq!(sale.stats().await.purchases_rejected, u64::from(BUYERS) - 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_withdrawals_race_purchases() {
        let sale = Arc::new(default_sale().unwrap());
        for i in 0..BUYERS {
            fund_buyer(&sale, buyer(i), 10).unwrap();
        }
        sale.set_stage(OPERATOR, 1).await.unwrap();

        let buys = (0..BUYERS).map(|i| {
            let sale = Arc::clone(&sale);
            tokio::spawn(async move { sale.buy_token(buyer(i), parse_units(500), 0).await })
        });
        let withdraws = (0..BUYERS).map(|_| {
            let sale = Arc::clone(&sale);
            tokio::spawn(async move { sale.withdraw(OPERATOR, parse_units(5), 0).await })
        });

        let (bought, withdrawn) = tokio::join!(join_all(buys), join_all(withdraws));
        assert!(bought.into_iter().all(|r| matches!(r, Ok(Ok(())))));
        let withdrawals = withdrawn
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(()))))
            .count();
        let paid_out = parse_units(5) * U256::from(withdrawals);

        // 16 buyers paid 10 each; every successful withdrawal took 5.
        assert_eq!(sale.ledger().balance(SALE_ADDRESS), parse_units(160) - paid_out);
        assert_eq!(sale.ledger().balance(OPERATOR), paid_out);
        assert_eq!(sale.sale_info().await.withdrawn, paid_out);
    }
}
