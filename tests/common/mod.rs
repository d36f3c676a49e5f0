//! Shared fake components for bench scenario tests
//!
//! Each helper wires a small component as a tokio task behind a port
//! registry, standing in for the real network the bench is excluded from
//! building. Components consume packets from their inport channels and
//! deliver events through output emitters.

#![allow(dead_code)]

use flowbench::{Bench, OutputEmitter, Packet, PortRegistry};
use serde_json::Value;
use std::sync::Once;
use tokio::sync::mpsc::UnboundedReceiver;

static TRACING: Once = Once::new();

/// Route bench tracing through the test capture, honoring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Bench around an echo component: every data packet posted to `in` comes
/// back on `out` as one unified data packet.
pub fn echo_bench() -> Bench {
    init_tracing();
    let mut registry = PortRegistry::new();
    let input = registry.open_input("in");
    let out = registry.open_output("out");
    tokio::spawn(echo(input, out));
    Bench::new(registry)
}

async fn echo(mut input: UnboundedReceiver<Packet>, out: OutputEmitter) {
    while let Some(packet) = input.recv().await {
        if let Packet::Data(payload) = packet {
            out.ip(Packet::Data(payload));
        }
    }
}

/// Bench around a multiplier: one data packet on `x` and one on `y`
/// produce their product on `xy`.
pub fn multiplier_bench() -> Bench {
    init_tracing();
    let mut registry = PortRegistry::new();
    let x = registry.open_input("x");
    let y = registry.open_input("y");
    let xy = registry.open_output("xy");
    tokio::spawn(multiplier(x, y, xy));
    Bench::new(registry)
}

async fn multiplier(
    mut x: UnboundedReceiver<Packet>,
    mut y: UnboundedReceiver<Packet>,
    xy: OutputEmitter,
) {
    loop {
        let (Some(a), Some(b)) = (next_data(&mut x).await, next_data(&mut y).await) else {
            return;
        };
        let product = a.as_i64().unwrap_or(0) * b.as_i64().unwrap_or(0);
        xy.ip(Packet::data(product));
    }
}

/// Bench around an async integer divider: `dividend` and `divisor` in,
/// `quotient` and `remainder` out, emitted after a scheduler yield with the
/// quotient always first.
pub fn divider_bench() -> Bench {
    init_tracing();
    let mut registry = PortRegistry::new();
    let dividend = registry.open_input("dividend");
    let divisor = registry.open_input("divisor");
    let quotient = registry.open_output("quotient");
    let remainder = registry.open_output("remainder");
    tokio::spawn(divider(dividend, divisor, quotient, remainder));
    Bench::new(registry)
}

async fn divider(
    mut dividend: UnboundedReceiver<Packet>,
    mut divisor: UnboundedReceiver<Packet>,
    quotient: OutputEmitter,
    remainder: OutputEmitter,
) {
    loop {
        let (Some(a), Some(b)) = (next_data(&mut dividend).await, next_data(&mut divisor).await)
        else {
            return;
        };
        let (a, b) = (a.as_i64().unwrap_or(0), b.as_i64().unwrap_or(0));
        if b == 0 {
            continue;
        }
        // Emit asynchronously, like a component doing real work
        tokio::task::yield_now().await;
        quotient.ip(Packet::data(a / b));
        remainder.ip(Packet::data(a % b));
    }
}

/// Pulls the next data payload off an inport channel, skipping other kinds.
async fn next_data(rx: &mut UnboundedReceiver<Packet>) -> Option<Value> {
    while let Some(packet) = rx.recv().await {
        if let Packet::Data(payload) = packet {
            return Some(payload);
        }
    }
    None
}
