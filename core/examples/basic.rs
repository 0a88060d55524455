//! Basic transaction instrumentation example

use eframework::{
    BreakerBoard, BreakerMode, Eframework, MemoryRegistry, ProgressStage, SourceLocation,
    Transaction, flows, logging,
};
use std::sync::Arc;

fn main() {
    logging::init_logging();

    println!("=== Eframework Basic Example ===\n");

    let registry = Arc::new(MemoryRegistry::new());
    registry.register_fn(flows::AUDIT, |envelope| {
        println!("📒 audit: {}", envelope.transaction_msg().unwrap_or_default());
        Ok(())
    });
    registry.register_fn(flows::ERROR, |envelope| {
        println!("🔥 error: {}", envelope.transaction_msg().unwrap_or_default());
        Ok(())
    });

    let board = Arc::new(
        BreakerBoard::new()
            .on_open(|_, name| println!("🔴 Circuit '{}' opened!", name))
            .on_close(|_, name| println!("🟢 Circuit '{}' closed!", name)),
    );
    board.install(&registry);

    let eframework = Eframework::builder("order-service")
        .registry(registry)
        .build()
        .expect("application id is set");

    let location = SourceLocation::new("orderFlow")
        .with_file_name("orders.xml")
        .with_line_number(42);

    println!("--- Audit and error events ---");
    eframework.emit_audit(
        Transaction::new("ORDER_CREATE", ProgressStage::Validate)
            .attribute("orderId", "42")
            .location(location.clone()),
    );
    eframework.emit_error(
        Transaction::new("ORDER_CREATE", "FAILURE")
            .message("ERROR: payment declined")
            .attribute("orderId", "42")
            .location(location.clone()),
    );

    // Nothing is registered for notifications: the event is dropped with a warning
    eframework.emit_notification(Transaction::new("ORDER_CREATE", "SUCCESS"));
    println!();

    println!("--- Circuit breaker ---");
    let tx = || Transaction::new("PAYMENT_API", "FAILURE").location(location.clone());

    match eframework.circuit_breaker_trip(tx()) {
        Ok(()) => println!("✓ Trip signaled"),
        Err(e) => println!("✗ {}", e),
    }
    println!(
        "State: {}\n",
        board.state(BreakerMode::Manual, "PAYMENT_API")
    );

    eframework.circuit_breaker_check(tx());
    if board.is_open(BreakerMode::Manual, "PAYMENT_API") {
        println!("Circuit is open, skipping payment call");
        if let Err(e) = eframework.raise_circuit_breaker_open_error(tx()) {
            println!("✗ {}", e);
        }
    }
    println!();

    println!("--- Resetting circuit ---");
    eframework.circuit_breaker_reset(tx());
    println!(
        "State after reset: {}",
        board.state(BreakerMode::Manual, "PAYMENT_API")
    );
}
