//! Per-user escrow accounting.
//!
//! A wallet holds an `available` balance that survives across hands and, per
//! game, an `authorized` amount: chips taken out of `available` for that hand
//! but not yet paid out. Every operation on one wallet is serialized.

use crate::game::{GameId, Money, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WalletError {
    #[error("not enough money: available {available}, requested {requested}")]
    InsufficientFunds { available: Money, requested: Money },
    #[error("wallet balance would overflow")]
    Overflow,
    #[error("wallet is not empty: {0} available")]
    NotEmpty(Money),
}

/// The five escrow operations plus a read of the escrowed amount.
///
/// Implementations must make each call atomic with respect to every other
/// call on the same wallet.
pub trait Wallet: Send + Sync {
    /// Move `amount` from `available` into the escrow for `game_id`.
    fn authorize(&self, game_id: GameId, amount: Money) -> Result<(), WalletError>;

    /// Move the whole available balance into escrow; returns the moved amount.
    fn authorize_all(&self, game_id: GameId) -> Money;

    /// Credit `available`.
    fn inc(&self, amount: Money) -> Result<(), WalletError>;

    /// Credit `amount` only if `available` is zero, checked and credited in
    /// one step. Returns the new balance.
    fn inc_if_empty(&self, amount: Money) -> Result<Money, WalletError>;

    /// Drop the escrow for `game_id`. Clearing an empty escrow is a no-op.
    fn approve(&self, game_id: GameId);

    /// Current available balance.
    fn value(&self) -> Money;

    /// Amount currently escrowed for `game_id`.
    fn authorized(&self, game_id: GameId) -> Money;
}

/// Resolves a user to their wallet. The engine receives one of these
/// explicitly instead of reaching for a global.
pub trait WalletStore: Send + Sync {
    fn wallet(&self, user_id: UserId) -> Arc<dyn Wallet>;
}

#[derive(Debug, Default)]
struct Balance {
    available: Money,
    authorized: HashMap<GameId, Money>,
}

/// Wallet kept in process memory behind a mutex.
#[derive(Debug, Default)]
pub struct InMemoryWallet {
    inner: Mutex<Balance>,
}

impl InMemoryWallet {
    pub fn new(available: Money) -> Self {
        Self { inner: Mutex::new(Balance { available, authorized: HashMap::new() }) }
    }

    fn lock(&self) -> MutexGuard<'_, Balance> {
        // no mutation below can panic halfway, so a poisoned balance is intact
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Wallet for InMemoryWallet {
    fn authorize(&self, game_id: GameId, amount: Money) -> Result<(), WalletError> {
        let mut b = self.lock();
        if amount > b.available {
            return Err(WalletError::InsufficientFunds { available: b.available, requested: amount });
        }
        let escrow = b.authorized.get(&game_id).copied().unwrap_or(0);
        let escrow = escrow.checked_add(amount).ok_or(WalletError::Overflow)?;
        b.available -= amount;
        b.authorized.insert(game_id, escrow);
        Ok(())
    }

    fn authorize_all(&self, game_id: GameId) -> Money {
        let mut b = self.lock();
        let amount = b.available;
        b.available = 0;
        *b.authorized.entry(game_id).or_insert(0) += amount;
        amount
    }

    fn inc(&self, amount: Money) -> Result<(), WalletError> {
        let mut b = self.lock();
        b.available = b.available.checked_add(amount).ok_or(WalletError::Overflow)?;
        Ok(())
    }

    fn inc_if_empty(&self, amount: Money) -> Result<Money, WalletError> {
        let mut b = self.lock();
        if b.available > 0 {
            return Err(WalletError::NotEmpty(b.available));
        }
        b.available = amount;
        Ok(amount)
    }

    fn approve(&self, game_id: GameId) {
        self.lock().authorized.remove(&game_id);
    }

    fn value(&self) -> Money {
        self.lock().available
    }

    fn authorized(&self, game_id: GameId) -> Money {
        self.lock().authorized.get(&game_id).copied().unwrap_or(0)
    }
}

/// All wallets of a process. Unknown users get a wallet funded with the
/// configured default balance on first access.
#[derive(Debug)]
pub struct InMemoryLedger {
    default_balance: Money,
    wallets: Mutex<HashMap<UserId, Arc<InMemoryWallet>>>,
}

impl InMemoryLedger {
    pub fn new(default_balance: Money) -> Self {
        Self { default_balance, wallets: Mutex::new(HashMap::new()) }
    }

    /// Sum of available and escrowed money over every wallet for `game_id`.
    pub fn total(&self, game_id: GameId) -> Money {
        let wallets = self.wallets.lock().unwrap_or_else(|e| e.into_inner());
        wallets.values().map(|w| w.value() + w.authorized(game_id)).sum()
    }
}

impl WalletStore for InMemoryLedger {
    fn wallet(&self, user_id: UserId) -> Arc<dyn Wallet> {
        let mut wallets = self.wallets.lock().unwrap_or_else(|e| e.into_inner());
        let wallet = wallets
            .entry(user_id)
            .or_insert_with(|| Arc::new(InMemoryWallet::new(self.default_balance)));
        Arc::clone(wallet) as Arc<dyn Wallet>
    }
}

/// Refill an empty wallet with `amount`. Wallets that still hold money are
/// left untouched.
pub fn top_up(wallet: &dyn Wallet, amount: Money) -> Result<Money, WalletError> {
    let balance = wallet.inc_if_empty(amount)?;
    log::debug!("wallet topped up to {balance}");
    Ok(balance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use uuid::Uuid;

    #[test]
    fn authorize_moves_money_into_escrow() {
        let game = Uuid::new_v4();
        let w = InMemoryWallet::new(100);
        w.authorize(game, 30).unwrap();
        w.authorize(game, 20).unwrap();
        assert_eq!(w.value(), 50);
        assert_eq!(w.authorized(game), 50);
    }

    #[test]
    fn authorize_beyond_available_fails_without_side_effects() {
        let game = Uuid::new_v4();
        let w = InMemoryWallet::new(10);
        let err = w.authorize(game, 11).unwrap_err();
        assert_eq!(err, WalletError::InsufficientFunds { available: 10, requested: 11 });
        assert_eq!(w.value(), 10);
        assert_eq!(w.authorized(game), 0);
    }

    #[test]
    fn authorize_all_empties_available() {
        let game = Uuid::new_v4();
        let w = InMemoryWallet::new(75);
        w.authorize(game, 5).unwrap();
        assert_eq!(w.authorize_all(game), 70);
        assert_eq!(w.value(), 0);
        assert_eq!(w.authorized(game), 75);
    }

    #[test]
    fn escrow_is_tracked_per_game() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let w = InMemoryWallet::new(100);
        w.authorize(a, 10).unwrap();
        w.authorize(b, 20).unwrap();
        w.approve(a);
        assert_eq!(w.authorized(a), 0);
        assert_eq!(w.authorized(b), 20);
    }

    #[test]
    fn approve_twice_is_a_no_op() {
        let game = Uuid::new_v4();
        let w = InMemoryWallet::new(100);
        w.authorize(game, 40).unwrap();
        w.approve(game);
        w.approve(game);
        assert_eq!(w.authorized(game), 0);
        assert_eq!(w.value(), 60);
    }

    #[test]
    fn inc_detects_overflow() {
        let w = InMemoryWallet::new(Money::MAX);
        assert_eq!(w.inc(1), Err(WalletError::Overflow));
        assert_eq!(w.value(), Money::MAX);
    }

    #[test]
    fn top_up_only_refills_empty_wallets() {
        let w = InMemoryWallet::new(5);
        assert_eq!(top_up(&w, 1000), Err(WalletError::NotEmpty(5)));
        w.authorize_all(Uuid::new_v4());
        assert_eq!(top_up(&w, 1000), Ok(1000));
    }

    #[test]
    fn ledger_hands_out_the_same_wallet_per_user() {
        let ledger = InMemoryLedger::new(1000);
        let game = Uuid::new_v4();
        ledger.wallet(7).authorize(game, 100).unwrap();
        assert_eq!(ledger.wallet(7).value(), 900);
        assert_eq!(ledger.wallet(8).value(), 1000);
        assert_eq!(ledger.total(game), 2000);
    }

    #[test]
    fn concurrent_authorize_and_credit_stay_consistent() {
        let game = Uuid::new_v4();
        let w = Arc::new(InMemoryWallet::new(10_000));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let w = Arc::clone(&w);
                thread::spawn(move || {
                    for _ in 0..500 {
                        if i % 2 == 0 {
                            let _ = w.authorize(game, 3);
                        } else {
                            w.inc(1).unwrap();
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        // 4 crediting threads * 500
        assert_eq!(w.value() + w.authorized(game), 10_000 + 2_000);
        assert_eq!(w.authorized(game) % 3, 0);
    }

    #[test]
    fn concurrent_top_ups_credit_once() {
        let w = Arc::new(InMemoryWallet::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let w = Arc::clone(&w);
                thread::spawn(move || top_up(w.as_ref(), 1000).is_ok())
            })
            .collect();
        let credited = handles.into_iter().map(|h| h.join().unwrap()).filter(|&ok| ok).count();
        assert_eq!(credited, 1);
        assert_eq!(w.value(), 1000);
    }

    #[test]
    fn top_up_racing_authorize_never_double_credits() {
        let game = Uuid::new_v4();
        for _ in 0..50 {
            let w = Arc::new(InMemoryWallet::new(0));
            let spender = {
                let w = Arc::clone(&w);
                thread::spawn(move || {
                    for _ in 0..10 {
                        let _ = w.authorize(game, 100);
                    }
                })
            };
            let refills: Vec<_> = (0..4)
                .map(|_| {
                    let w = Arc::clone(&w);
                    thread::spawn(move || top_up(w.as_ref(), 1000).is_ok())
                })
                .collect();
            let credited = refills.into_iter().map(|h| h.join().unwrap()).filter(|&ok| ok).count() as Money;
            spender.join().unwrap();
            assert_eq!(w.value() + w.authorized(game), credited * 1000);
        }
    }
}
