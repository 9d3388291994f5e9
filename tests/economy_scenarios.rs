use mrc_economy::{
    Action, Address, EconomyConfig, EconomyError, EconomyEvent, LedgerConfig, LedgerEvent,
    MiningEconomy, TickSchedule, TokenLedger,
};
use std::time::Duration;

const NOW: u64 = 1_700_000_000;

#[test]
fn session_from_first_click_to_mint() {
    let economy = MiningEconomy::default();
    let mut state = economy.initial_state();

    for _ in 0..150 {
        state = economy.apply(&state, Action::Mine).unwrap().state;
    }
    // one threshold crossed at 100 experience
    assert_eq!(state.level, 2);
    assert_eq!(state.mining_rate, 1);
    assert_eq!(state.balance, 150);

    let amount = economy.mint_amount(&state, true).unwrap();
    assert_eq!(amount, 150);
    let t = economy.apply(&state, Action::SettleMint(amount)).unwrap();
    assert_eq!(t.state.balance, 0);
    assert_eq!(t.state.total_mined, 150);
    assert_eq!(t.events, vec![EconomyEvent::Minted { amount: 150 }]);
}

#[test]
fn idle_catch_up_matches_stepping() {
    let economy = MiningEconomy::default();
    let mut state = economy.initial_state();
    for _ in 0..60 {
        state = economy.mine(&state).state;
    }
    state = economy.upgrade(&state).unwrap().state;
    state = economy.toggle_active(&state).state;

    let mut schedule = TickSchedule::new(Duration::from_millis(1_000)).unwrap();
    let owed = schedule.advance(Duration::from_millis(90_500));
    assert_eq!(owed, 90);

    let mut stepped = state.clone();
    for _ in 0..owed {
        stepped = economy.apply(&stepped, Action::Tick).unwrap().state;
    }
    let batched = economy.apply(&state, Action::TickMany(owed)).unwrap().state;
    assert_eq!(stepped, batched);
}

#[test]
fn level_cap_holds_across_operations() {
    let config = EconomyConfig::default().with_max_level(Some(3));
    let economy = MiningEconomy::new(config).unwrap();
    let mut state = economy.initial_state();
    for _ in 0..1_000 {
        state = economy.mine(&state).state;
    }
    assert_eq!(state.level, 3);
    assert!(matches!(
        economy.upgrade(&state),
        Err(EconomyError::MaxLevelReached { level: 3 })
    ));
}

#[test]
fn ledger_rewards_grow_with_level() {
    let owner = Address::from_label("owner");
    let player = Address::from_label("player1");
    let config = LedgerConfig::default().with_cooldown(60);
    let unit = config.unit();
    let mut ledger = TokenLedger::deploy(owner, config.clone()).unwrap();
    ledger.set_game_status(player, true).unwrap();

    let first = ledger
        .mine_tokens(player, config.to_base_units(1_000), NOW)
        .unwrap();
    assert_eq!(first, 1_000 * unit);
    assert_eq!(ledger.get_player_stats(player).unwrap().level, 2);

    assert!(matches!(
        ledger.mine_tokens(player, unit, NOW + 59),
        Err(EconomyError::MiningCooldownActive {
            next_allowed_at
        }) if next_allowed_at == NOW + 60
    ));

    // level 2 pays +10%
    let second = ledger.mine_tokens(player, 10 * unit, NOW + 60).unwrap();
    assert_eq!(second, 11 * unit);
    assert_eq!(ledger.balance_of(player), first + second);

    let events = ledger.drain_events();
    assert!(events.contains(&LedgerEvent::LevelUp {
        player,
        new_level: 2
    }));
}

#[test]
fn ledger_supply_cap_and_pause() {
    let owner = Address::from_label("owner");
    let player = Address::from_label("player1");
    let mut ledger = TokenLedger::deploy(owner, LedgerConfig::default()).unwrap();

    let headroom = ledger.max_supply() - ledger.total_supply();
    ledger.emergency_mint(owner, player, headroom).unwrap();
    assert_eq!(ledger.total_supply(), ledger.max_supply());

    assert!(matches!(
        ledger.emergency_mint(owner, player, 1),
        Err(EconomyError::MaxSupplyExceeded { available: 0, .. })
    ));

    ledger.set_game_status(player, true).unwrap();
    ledger.pause(owner).unwrap();
    assert!(matches!(
        ledger.mine_tokens(player, 1, NOW),
        Err(EconomyError::Paused)
    ));
    assert!(matches!(
        ledger.unpause(player),
        Err(EconomyError::Unauthorized)
    ));
}
