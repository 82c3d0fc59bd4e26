/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! # matching-engine
//!
//! A single-venue, price-time-priority limit order book matching engine.
//!
//! The engine processes one command at a time — `NEW`, `CANCEL`, or
//! `REPLENISH` — against a collection of per-`(symbol, side)` order
//! books, and returns the trades and depth updates each command
//! produced. There is no networking, no scheduling, and no concurrency
//! anywhere in this crate: a session is a synchronous sequence of
//! `process` calls bracketed by `market_open`/`market_close`.
//!
//! ## Design
//!
//! - [`price`] carries the fixed-point `Price` type: four decimal
//!   digits, exact integer arithmetic, no floating point near a price.
//! - [`order`] defines the order variants (`Market`, `Limit`, `Iceberg`)
//!   as a single tagged enum rather than a trait hierarchy.
//! - [`validation`] holds the tick-size, lot-size, and symbol-whitelist
//!   rules an order is checked against before it reaches a book.
//! - [`orderbook`] is the core: [`orderbook::OrderBook`] is one side of
//!   one instrument's resting liquidity, and [`orderbook::MatchingEngine`]
//!   owns the full collection and routes commands to it.
//! - [`events`] defines what the engine emits: trades, depth updates,
//!   and the one-time market-open snapshot.
//! - [`session`] and [`config`] are the thin persistence/config layers;
//! - [`command`] is the wire framing of an inbound request.
//!
//! Use [`prelude`] to pull in the commonly-needed types.

pub mod command;
pub mod config;
pub mod error;
pub mod events;
pub mod order;
pub mod orderbook;
pub mod prelude;
pub mod price;
pub mod session;
pub mod validation;
