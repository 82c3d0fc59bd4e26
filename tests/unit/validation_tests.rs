use matching_engine::command::Command;
use matching_engine::orderbook::MatchingEngine;
use matching_engine::price::Price;
use matching_engine::validation::{LotSizeRules, PriceInterval, SymbolSet, TickSizeRules};
use std::str::FromStr;

fn cmd(json: &str) -> Command {
    Command::from_json(json).unwrap()
}

#[test]
fn tick_size_rejection_drops_command_silently() {
    let mut e = MatchingEngine::new(
        TickSizeRules::new(vec![
            PriceInterval {
                from: Price::from_str("0").unwrap(),
                to: Some(Price::from_str("1").unwrap()),
                value: 1,
            },
            PriceInterval {
                from: Price::from_str("1").unwrap(),
                to: None,
                value: 100,
            },
        ]),
        LotSizeRules::default(),
        SymbolSet::new(["ABC".to_string()]),
    );

    let events = e.process(cmd(
        r#"{"type":"NEW","time":1,"order_id":1,"symbol":"ABC","side":"bid","tif":"day","quantity":100,"limit_price":"10.015"}"#,
    ));
    assert!(events.is_empty());

    let events = e.process(cmd(
        r#"{"type":"NEW","time":2,"order_id":2,"symbol":"ABC","side":"bid","tif":"day","quantity":100,"limit_price":"10.01"}"#,
    ));
    assert!(!events.is_empty());
}

#[test]
fn odd_lot_is_rejected() {
    let mut e = MatchingEngine::new(
        TickSizeRules::default(),
        LotSizeRules::new(vec![PriceInterval {
            from: Price::from_str("0").unwrap(),
            to: None,
            value: 100,
        }]),
        SymbolSet::new(["ABC".to_string()]),
    );

    let events = e.process(cmd(
        r#"{"type":"NEW","time":1,"order_id":1,"symbol":"ABC","side":"bid","tif":"day","quantity":150,"limit_price":"10.00"}"#,
    ));
    assert!(events.is_empty(), "mixed lot of 150 at a 100-step should be rejected");
}

#[test]
fn unknown_symbol_is_rejected() {
    let mut e = MatchingEngine::new(
        TickSizeRules::default(),
        LotSizeRules::default(),
        SymbolSet::new(["ABC".to_string()]),
    );
    let events = e.process(cmd(
        r#"{"type":"NEW","time":1,"order_id":1,"symbol":"NOTLISTED","side":"bid","tif":"day","quantity":100,"limit_price":"10.00"}"#,
    ));
    assert!(events.is_empty());
}
