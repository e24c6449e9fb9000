//! Multi-threaded tests of the balance engine
//!
//! These exercise the engine through its public API from many OS threads at
//! once and check the properties that must hold whatever the interleaving:
//! one lock per account, no deadlock between opposite transfers, conserved
//! totals, non-negative balances and no lost updates.

use balance_engine::{BalanceEngine, ErrorKind, InMemoryAccountStore, LockRegistry, Operation};
use rust_decimal::Decimal;
use std::sync::{Arc, Barrier};
use std::thread;

type Engine = BalanceEngine<InMemoryAccountStore>;

fn dec(units: i64) -> Decimal {
    Decimal::new(units, 0)
}

fn engine_with(accounts: &[(&str, i64)]) -> Engine {
    let engine = BalanceEngine::new(Arc::new(InMemoryAccountStore::new()));
    for (number, balance) in accounts {
        engine.open_account(number, dec(*balance)).unwrap();
    }
    engine
}

fn total(engine: &Engine) -> Decimal {
    engine
        .list_accounts()
        .unwrap()
        .iter()
        .map(|a| a.balance().value())
        .sum()
}

fn balance_of(engine: &Engine, account: &str) -> Decimal {
    engine.get_account(account).unwrap().balance().value()
}

/// Small deterministic generator so every run uses the same interleaving seeds
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

#[test]
fn test_registry_hands_out_one_lock_per_account() {
    let registry = Arc::new(LockRegistry::new());
    let barrier = Arc::new(Barrier::new(16));
    let mut handles = vec![];

    for _ in 0..16 {
        let registry = Arc::clone(&registry);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            registry.lock_for("shared")
        }));
    }

    let locks: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(locks.iter().all(|l| Arc::ptr_eq(l, &locks[0])));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_opposite_transfers_do_not_deadlock() {
    let engine = engine_with(&[("S", 10_000), ("T", 10_000)]);
    let barrier = Arc::new(Barrier::new(2));
    let mut handles = vec![];

    for (from, to) in [("S", "T"), ("T", "S")] {
        let engine = engine.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let mut applied = 0;
            for _ in 0..500 {
                let op = Operation::Transfer {
                    source: from.to_string(),
                    target: to.to_string(),
                    amount: dec(1),
                };
                match engine.apply_with_retry(&op, 100_000) {
                    Ok(_) => applied += 1,
                    Err(e) => assert_eq!(e.kind(), ErrorKind::Conflict),
                }
            }
            applied
        }));
    }

    let applied: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(total(&engine), dec(20_000));
    assert_eq!(balance_of(&engine, "S"), dec(10_000 - applied[0] + applied[1]));
}

#[test]
fn test_concurrent_random_transfers_conserve_total() {
    let accounts = ["A", "B", "C", "D", "E"];
    let engine = engine_with(&[("A", 100), ("B", 100), ("C", 100), ("D", 100), ("E", 100)]);
    let mut handles = vec![];

    for seed in 0..8u64 {
        let engine = engine.clone();
        handles.push(thread::spawn(move || {
            let mut rng = Lcg(seed + 1);
            for _ in 0..500 {
                let from = accounts[(rng.next() % 5) as usize];
                let to = accounts[(rng.next() % 5) as usize];
                let amount = dec((rng.next() % 50 + 1) as i64);
                match engine.transfer(from, to, amount) {
                    Ok(receipt) => {
                        assert_eq!(receipt.amount.value(), amount);
                    }
                    Err(e) => assert!(
                        matches!(
                            e.kind(),
                            ErrorKind::InvalidRequest
                                | ErrorKind::Conflict
                                | ErrorKind::InsufficientFunds
                        ),
                        "unexpected error: {}",
                        e
                    ),
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(total(&engine), dec(500));
    for account in engine.list_accounts().unwrap() {
        assert!(account.balance().value() >= Decimal::ZERO);
    }
}

#[test]
fn test_concurrent_withdrawals_never_overdraw() {
    let engine = engine_with(&[("W", 100)]);
    let barrier = Arc::new(Barrier::new(8));
    let mut handles = vec![];

    for _ in 0..8 {
        let engine = engine.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let op = Operation::Withdraw {
                account: "W".to_string(),
                amount: dec(30),
            };
            engine.apply_with_retry(&op, 100_000).is_ok()
        }));
    }

    let succeeded = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(succeeded, 3);
    assert_eq!(balance_of(&engine, "W"), dec(10));
}

/// Both deposits may succeed when the threads do not overlap, so this only
/// checks that no applied deposit is lost. The exactly-one-conflict outcome
/// is pinned by `test_deposit_against_held_lock_is_a_conflict`.
#[test]
fn test_racing_deposits_never_lose_an_applied_update() {
    let engine = engine_with(&[("A", 100)]);
    let barrier = Arc::new(Barrier::new(2));
    let mut handles = vec![];

    for _ in 0..2 {
        let engine = engine.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            engine.deposit("A", dec(10))
        }));
    }

    let mut applied = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(_) => applied += 1,
            Err(e) => assert_eq!(e.kind(), ErrorKind::Conflict),
        }
    }

    assert!(applied >= 1);
    assert_eq!(balance_of(&engine, "A"), dec(100 + 10 * applied));
}

#[test]
fn test_deposits_and_withdrawals_racing_transfers_keep_books_balanced() {
    let engine = engine_with(&[("A", 1_000), ("B", 1_000)]);
    let barrier = Arc::new(Barrier::new(6));
    let mut handles = vec![];

    // Transfer threads move money back and forth; they return no net flow
    for (from, to) in [("A", "B"), ("B", "A")] {
        let engine = engine.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for _ in 0..300 {
                let op = Operation::Transfer {
                    source: from.to_string(),
                    target: to.to_string(),
                    amount: dec(7),
                };
                if let Err(e) = engine.apply_with_retry(&op, 100_000) {
                    assert!(
                        matches!(e.kind(), ErrorKind::Conflict | ErrorKind::InsufficientFunds),
                        "unexpected error: {}",
                        e
                    );
                }
            }
            Decimal::ZERO
        }));
    }

    // Two depositors and two withdrawers on A, returning their net flow
    for (deposit, amount) in [(true, 5), (true, 3), (false, 4), (false, 6)] {
        let engine = engine.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            let mut net = Decimal::ZERO;
            for _ in 0..300 {
                let op = if deposit {
                    Operation::Deposit {
                        account: "A".to_string(),
                        amount: dec(amount),
                    }
                } else {
                    Operation::Withdraw {
                        account: "A".to_string(),
                        amount: dec(amount),
                    }
                };
                match engine.apply_with_retry(&op, 100_000) {
                    Ok(_) if deposit => net += dec(amount),
                    Ok(_) => net -= dec(amount),
                    Err(e) => assert!(
                        matches!(e.kind(), ErrorKind::Conflict | ErrorKind::InsufficientFunds),
                        "unexpected error: {}",
                        e
                    ),
                }
            }
            net
        }));
    }

    let net_flow: Decimal = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(total(&engine), dec(2_000) + net_flow);
    for account in engine.list_accounts().unwrap() {
        assert!(account.balance().value() >= Decimal::ZERO);
    }
    for account in ["A", "B"] {
        assert!(engine.lock_registry().lock_for(account).try_lock().is_some());
    }
}

#[test]
fn test_deposit_against_held_lock_is_a_conflict() {
    let engine = engine_with(&[("A", 100)]);
    let lock = engine.lock_registry().lock_for("A");
    let guard = lock.lock();

    let contender = engine.clone();
    let result = thread::spawn(move || contender.deposit("A", dec(10)))
        .join()
        .unwrap();
    drop(guard);

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(balance_of(&engine, "A"), dec(100));

    engine.deposit("A", dec(10)).unwrap();
    assert_eq!(balance_of(&engine, "A"), dec(110));
}

#[test]
fn test_failed_operations_leave_state_and_locks_untouched() {
    let engine = engine_with(&[("A", 10), ("B", 0)]);

    let err = engine.transfer("A", "B", dec(50)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    let err = engine.withdraw("B", dec(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    let err = engine.transfer("A", "missing", dec(1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    assert_eq!(balance_of(&engine, "A"), dec(10));
    assert_eq!(balance_of(&engine, "B"), dec(0));

    for account in ["A", "B"] {
        let lock = engine.lock_registry().lock_for(account);
        assert!(lock.try_lock().is_some(), "{} still locked", account);
    }
}
