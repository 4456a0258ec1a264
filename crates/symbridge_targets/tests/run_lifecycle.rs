//! Drives the runtime the way an interpreter and instrumented code use it together.

use std::sync::Once;

use log::LevelFilter;
use symbridge_core::StderrLogger;
use symbridge_targets::{
    HasLen, InstructionLocation, MockRecord, ObjectIdentity, RuntimeContext, RuntimeOptions,
    StaticFieldAccess, StaticFieldAccessKind, SymbolicHandle, SymbolicList, SymbolicMap, Trace,
};

static LOGGER: Once = Once::new();

/// Routes the runtime's log output to stderr, so failing runs show what the runtime saw.
fn init_logger() {
    LOGGER.call_once(|| StderrLogger::install(LevelFilter::Debug).unwrap());
}

struct Account {
    balance: i64,
}

fn location(method_id: u16, instruction_index: u32) -> InstructionLocation {
    InstructionLocation::new(1, method_id, instruction_index).unwrap()
}

/// What the instrumentation of `Account::fetch_balance` boils down to.
fn fetch_balance(ctx: &mut RuntimeContext, account: &Account) -> i64 {
    let entry = location(2, 0);
    ctx.record_instruction(entry.encode());

    let site_id = entry.method_site_id();
    let receiver = ObjectIdentity::of(account);
    if ctx.mocks().is_mocked(site_id, receiver) {
        return unsafe { ctx.mocks().get_long_mock_value(site_id, receiver) };
    }

    ctx.record_instruction(location(2, 1).encode());
    account.balance
}

/// A static call the interpreter may replace globally, no matter who calls it.
fn exchange_rate(ctx: &mut RuntimeContext) -> i64 {
    let entry = location(3, 0);
    ctx.record_instruction(entry.encode());

    let site_id = entry.method_site_id();
    if ctx.mocks().is_global_mocked(site_id) {
        return unsafe { ctx.mocks().get_long_mock_value(site_id, ObjectIdentity::NULL) };
    }

    ctx.record_instruction(location(3, 1).encode());
    100
}

/// What the instrumentation of the code under test boils down to.
fn withdraw(ctx: &mut RuntimeContext, account: &Account, amount: i64) -> bool {
    ctx.record_instruction(location(1, 0).encode());
    let limit = StaticFieldAccess::new(77, StaticFieldAccessKind::Get).unwrap();
    ctx.record_static_field_access(limit.encode());

    let balance = fetch_balance(ctx, account);
    if balance >= amount {
        ctx.record_instruction(location(1, 1).encode());
        true
    } else {
        ctx.record_instruction(location(1, 2).encode());
        false
    }
}

#[test]
fn test_mocked_run_follows_expected_path() {
    init_logger();
    let mut ctx = RuntimeContext::new(RuntimeOptions::builder().buffer_capacity(2).build());
    let rich = Account { balance: 1_000 };
    let poor = Account { balance: 1_000 };

    // The interpreter decided that `fetch_balance` on `poor` returns 5 in this run.
    ctx.mocks_mut().add(MockRecord::new(
        location(2, 0).method_site_id(),
        ObjectIdentity::of(&poor),
        5_i64,
    ));
    ctx.begin_run();

    assert!(withdraw(&mut ctx, &rich, 100));
    assert!(!withdraw(&mut ctx, &poor, 100));
    assert!(!withdraw(&mut ctx, &poor, 100));

    let trace = ctx.finish_run();
    assert!(ctx.mocks().is_empty());

    let expected_poor = [
        location(1, 0).encode(),
        location(2, 0).encode(),
        location(1, 2).encode(),
    ];
    let mut expected = vec![
        location(1, 0).encode(),
        location(2, 0).encode(),
        location(2, 1).encode(),
        location(1, 1).encode(),
    ];
    expected.extend_from_slice(&expected_poor);
    expected.extend_from_slice(&expected_poor);

    assert_eq!(trace.first_divergence(&expected), None);
    assert_eq!(trace.len(), expected.len());
    assert_eq!(trace.accessed_statics().len(), 1);
    assert_eq!(trace.covered_instructions().len(), 5);

    let decoded = Trace::from_bytes(&trace.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded, trace);
}

#[test]
fn test_unmocked_rerun_diverges() {
    init_logger();
    let mut ctx = RuntimeContext::default();
    let account = Account { balance: 10 };

    ctx.begin_run();
    assert!(!withdraw(&mut ctx, &account, 100));
    let expected = ctx.finish_run();

    ctx.mocks_mut().add(MockRecord::new(
        location(2, 0).method_site_id(),
        ObjectIdentity::of(&account),
        500_i64,
    ));
    ctx.begin_run();
    assert!(withdraw(&mut ctx, &account, 100));
    let actual = ctx.finish_run();

    assert_eq!(actual.first_divergence(expected.instructions()), Some(2));
    assert_eq!(ctx.runs(), 2);
}

#[test]
fn test_decoding_boundary_rebuilds_collections() {
    let list: SymbolicList<i32> = [Some(1), None, Some(3)].into_iter().collect();
    assert!(!list.is_symbolic());
    assert_eq!(list.size(), 3);

    let map: SymbolicMap<u8, i32> = list
        .iter()
        .copied()
        .enumerate()
        .filter_map(|(index, value)| value.map(|value| (index as u8, value)))
        .collect();
    assert_eq!(map.size(), 2);
    assert_eq!(map.get(&2), Some(&3));

    let placeholder = SymbolicList::<i32>::from_handle(SymbolicHandle::new(12));
    assert_eq!(placeholder.symbolic_handle().map(SymbolicHandle::id), Some(12));
}

#[test]
fn test_global_mock_only_applies_to_test_body() {
    init_logger();
    let mut ctx = RuntimeContext::default();
    ctx.mocks_mut().add_value(
        location(3, 0).method_site_id(),
        ObjectIdentity::NULL,
        250_i64,
    );
    ctx.begin_run();

    // Setup and the test body both call the globally mocked method.
    assert_eq!(exchange_rate(&mut ctx), 100);
    assert_eq!(ctx.execute(exchange_rate), 250);
    assert_eq!(exchange_rate(&mut ctx), 100);

    let trace = ctx.finish_run();
    let expected = [
        location(3, 0).encode(),
        location(3, 1).encode(),
        location(3, 0).encode(),
        location(3, 0).encode(),
        location(3, 1).encode(),
    ];
    assert_eq!(trace.first_divergence(&expected), None);
    assert_eq!(trace.len(), expected.len());
}

#[test]
#[should_panic(expected = "not intercepted")]
fn test_reached_intrinsic_is_fatal() {
    init_logger();
    let mut ctx = RuntimeContext::default();
    ctx.begin_run();
    ctx.execute(|_| symbridge_targets::engine::assume(true));
}
