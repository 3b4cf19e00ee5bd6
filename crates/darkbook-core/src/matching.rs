//! Encrypted match evaluation.
//!
//! Whether two orders form a valid match is itself a secret: it depends on
//! encrypted directions, prices, and amounts. The predicate is computed
//! entirely in ciphertext algebra and comes back as an encrypted boolean
//! handle — nothing in-line ever branches on it.

use chrono::{DateTime, Utc};
use darkbook_engine::HomomorphicEngine;
use darkbook_types::{CtHandle, Order, OrderId, Result};
use serde::{Deserialize, Serialize};

/// One completed match: the pair, the encrypted verdict as computed at
/// match time, and when it was finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub buy_id: OrderId,
    pub sell_id: OrderId,
    /// The encrypted compatibility verdict, exposed for off-chain
    /// decryption by whoever holds a grant.
    pub can_match: CtHandle<bool>,
    pub matched_at: DateTime<Utc>,
}

/// Compute the encrypted can-match predicate for a candidate pair:
///
/// ```text
/// can_match = buy.is_buy
///           AND NOT sell.is_buy
///           AND buy.price >= sell.price
///           AND buy.amount == sell.amount
/// ```
///
/// # Errors
/// Engine errors only (unknown or mistyped handles).
pub fn evaluate<E: HomomorphicEngine>(
    engine: &mut E,
    buy: &Order,
    sell: &Order,
) -> Result<CtHandle<bool>> {
    let buy_side_ok = buy.is_buy;
    let sell_side_ok = engine.not(sell.is_buy)?;
    let price_ok = engine.ge(buy.price, sell.price)?;
    let amount_ok = engine.eq(buy.amount, sell.amount)?;

    let sides = engine.and(buy_side_ok, sell_side_ok)?;
    let terms = engine.and(price_ok, amount_ok)?;
    engine.and(sides, terms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::AccessControlManager;
    use crate::orders::OrderStore;
    use darkbook_engine::{ClearEngine, EncryptedInput};
    use darkbook_types::Principal;

    struct Fixture {
        engine: ClearEngine,
        acl: AccessControlManager,
        store: OrderStore,
        pool: Principal,
    }

    impl Fixture {
        fn new() -> Self {
            let pool = Principal::random();
            Self {
                engine: ClearEngine::new(),
                acl: AccessControlManager::new(pool),
                store: OrderStore::new(),
                pool,
            }
        }

        fn place(&mut self, amount: u32, price: u32, is_buy: bool) -> Order {
            let trader = Principal::random();
            let mut nonce = [0u8; 32];
            rand::Rng::fill(&mut rand::thread_rng(), &mut nonce[..]);
            let (input, proof) = EncryptedInput::seal(
                &[u64::from(amount), u64::from(price), u64::from(is_buy)],
                nonce,
                trader,
                self.pool,
            );
            let id = self
                .store
                .place(
                    &mut self.engine,
                    &mut self.acl,
                    trader,
                    &input,
                    &proof,
                    Utc::now(),
                )
                .unwrap();
            self.store.get(id)
        }

        fn verdict(&mut self, buy: &Order, sell: &Order) -> bool {
            let handle = evaluate(&mut self.engine, buy, sell).unwrap();
            self.engine.reveal(handle).unwrap()
        }
    }

    #[test]
    fn compatible_pair_matches() {
        let mut fx = Fixture::new();
        let buy = fx.place(100, 50, true);
        let sell = fx.place(100, 45, false);
        assert!(fx.verdict(&buy, &sell));
    }

    #[test]
    fn equal_prices_match() {
        let mut fx = Fixture::new();
        let buy = fx.place(100, 50, true);
        let sell = fx.place(100, 50, false);
        assert!(fx.verdict(&buy, &sell));
    }

    #[test]
    fn buy_price_below_sell_price_fails() {
        let mut fx = Fixture::new();
        let buy = fx.place(100, 40, true);
        let sell = fx.place(100, 45, false);
        assert!(!fx.verdict(&buy, &sell));
    }

    #[test]
    fn amount_mismatch_fails() {
        let mut fx = Fixture::new();
        let buy = fx.place(100, 50, true);
        let sell = fx.place(99, 45, false);
        assert!(!fx.verdict(&buy, &sell));
    }

    #[test]
    fn wrong_sides_fail() {
        let mut fx = Fixture::new();
        let sell_as_buy = fx.place(100, 50, false);
        let sell = fx.place(100, 45, false);
        assert!(!fx.verdict(&sell_as_buy, &sell));

        let buy = fx.place(100, 50, true);
        let buy_as_sell = fx.place(100, 45, true);
        assert!(!fx.verdict(&buy, &buy_as_sell));
    }

    #[test]
    fn record_serde_roundtrip() {
        let record = MatchRecord {
            buy_id: OrderId(0),
            sell_id: OrderId(1),
            can_match: CtHandle::null(),
            matched_at: Utc::now(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: MatchRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
