use matching_engine::command::Command;
use matching_engine::events::{Event, UpdateAction};
use matching_engine::orderbook::MatchingEngine;
use matching_engine::validation::{LotSizeRules, SymbolSet, TickSizeRules};

fn engine() -> MatchingEngine {
    MatchingEngine::new(
        TickSizeRules::default(),
        LotSizeRules::default(),
        SymbolSet::new(["ABC".to_string()]),
    )
}

fn cmd(json: &str) -> Command {
    Command::from_json(json).unwrap()
}

#[test]
fn scenario_price_time_priority() {
    let mut e = engine();
    e.process(cmd(
        r#"{"type":"NEW","time":1,"order_id":1,"symbol":"ABC","side":"bid","tif":"day","quantity":100,"limit_price":"10.01"}"#,
    ));
    e.process(cmd(
        r#"{"type":"NEW","time":2,"order_id":2,"symbol":"ABC","side":"bid","tif":"day","quantity":200,"limit_price":"10.01"}"#,
    ));
    let events = e.process(cmd(
        r#"{"type":"NEW","time":3,"order_id":3,"symbol":"ABC","side":"ask","tif":"immediate_or_cancel","quantity":150}"#,
    ));

    let trades: Vec<_> = events
        .iter()
        .filter_map(|ev| match ev {
            Event::Trade(t) => Some(t.quantity),
            _ => None,
        })
        .collect();
    assert_eq!(trades, vec![100, 50]);
}

#[test]
fn scenario_iceberg_display_then_hidden_then_replenish() {
    let mut e = engine();
    e.process(cmd(
        r#"{"type":"NEW","time":1,"order_id":1,"symbol":"ABC","side":"bid","tif":"good_till_cancel","display_quantity":100,"hidden_quantity":300,"limit_price":"10.00"}"#,
    ));

    let events = e.process(cmd(
        r#"{"type":"NEW","time":2,"order_id":2,"symbol":"ABC","side":"ask","tif":"immediate_or_cancel","quantity":250}"#,
    ));
    let trades: Vec<_> = events
        .iter()
        .filter_map(|ev| match ev {
            Event::Trade(t) => Some(t.quantity),
            _ => None,
        })
        .collect();
    assert_eq!(trades, vec![100, 150]);

    let events = e.process(cmd(
        r#"{"type":"REPLENISH","order_id":1,"quantity":100,"symbol":"ABC"}"#,
    ));
    let depth = events
        .iter()
        .find_map(|ev| match ev {
            Event::Depth(d) => Some(d),
            _ => None,
        })
        .expect("replenish should emit a depth update");
    assert_eq!(depth.bid[0].quantity, 100);
    assert_eq!(depth.bid[0].action, UpdateAction::Add);
}

#[test]
fn scenario_cancel_reports_remaining_aggregate() {
    let mut e = engine();
    e.process(cmd(
        r#"{"type":"NEW","time":1,"order_id":1,"symbol":"ABC","side":"bid","tif":"day","quantity":100,"limit_price":"10.01"}"#,
    ));
    e.process(cmd(
        r#"{"type":"NEW","time":2,"order_id":2,"symbol":"ABC","side":"bid","tif":"day","quantity":200,"limit_price":"10.01"}"#,
    ));

    let events = e.process(cmd(r#"{"type":"CANCEL","order_id":1}"#));
    let depth = match &events[0] {
        Event::Depth(d) => d,
        _ => panic!("expected a depth update"),
    };
    assert_eq!(depth.bid[0].quantity, 200);
    assert_eq!(depth.bid[0].action, UpdateAction::Modify);
}

#[test]
fn ioc_remainder_is_discarded_not_rested() {
    let mut e = engine();
    let events = e.process(cmd(
        r#"{"type":"NEW","time":1,"order_id":1,"symbol":"ABC","side":"bid","tif":"immediate_or_cancel","quantity":100,"limit_price":"10.00"}"#,
    ));
    // Nothing to match against: no trade, no rest, no depth update at all.
    assert!(events.is_empty());

    let events = e.process(cmd(r#"{"type":"CANCEL","order_id":1}"#));
    assert!(events.is_empty());
}

#[test]
fn market_order_with_no_liquidity_produces_no_events() {
    let mut e = engine();
    let events = e.process(cmd(
        r#"{"type":"NEW","time":1,"order_id":1,"symbol":"ABC","side":"bid","tif":"immediate_or_cancel","quantity":100}"#,
    ));
    assert!(events.is_empty());
}

#[test]
fn duplicate_order_id_new_is_silently_dropped() {
    let mut e = engine();
    e.process(cmd(
        r#"{"type":"NEW","time":1,"order_id":1,"symbol":"ABC","side":"bid","tif":"day","quantity":100,"limit_price":"10.00"}"#,
    ));
    let events = e.process(cmd(
        r#"{"type":"NEW","time":2,"order_id":1,"symbol":"ABC","side":"bid","tif":"day","quantity":50,"limit_price":"10.00"}"#,
    ));
    assert!(events.is_empty());
}
