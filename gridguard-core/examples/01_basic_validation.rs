//! Basic Validation Example
//!
//! Checks a handful of solar plant and grid imbalance readings with the
//! pure validators, without any engine or history store.
//!
//! ## What You'll Learn
//!
//! - Range checks and the adjusted (clamped) value they report
//! - Jump checks against a previous reading
//! - Reading a verdict's reason and kind
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_basic_validation
//! ```

use gridguard_core::{
    validators::{validate_bounds, validate_trend, BoundsValidator},
    Rejection, ValidationVerdict,
};

fn main() {
    println!("GridGuard Basic Validation Example");
    println!("==================================\n");

    // Solar plant rated at 5 MW
    let solar = BoundsValidator::solar_production();
    println!("Solar production limits: [{} kW, {} kW]\n", solar.min(), solar.max());

    let solar_cases = [
        (1250.0, "Midday output"),
        (0.0, "Night, inverter idle"),
        (-5.0, "Negative output (meter offset)"),
        (6000.0, "Above rated capacity"),
    ];

    for (value, description) in &solar_cases {
        print!("{:.<45} ", description);
        report(&solar.validate(*value));
    }

    // Imbalance readings arrive once per minute
    println!("\nGrid imbalance trend (max jump 100 MW):\n");
    let history = [120.0, 135.0, 160.0];

    let trend_cases = [
        (175.0, "Small step"),
        (260.0, "Step of exactly 100 MW"),
        (310.0, "Step of 150 MW"),
        (-20.0, "Sign flip of 180 MW"),
    ];

    for (value, description) in &trend_cases {
        print!("{:.<45} ", description);
        report(&validate_trend(*value, &history, 100.0));
    }

    // Same rule, free function form
    println!("\nDirect range check:");
    print!("{:.<45} ", "validate_bounds(-5, 0, 5000)");
    report(&validate_bounds(-5.0, 0.0, 5000.0));
}

fn report(verdict: &ValidationVerdict) {
    match verdict.rejection() {
        None => println!("VALID ({})", verdict.original_value()),
        Some(rejection) => {
            println!("INVALID ({})", verdict.original_value());
            println!("    Reason: {}", rejection);
            if let Some(adjusted) = verdict.adjusted_value() {
                println!("    Adjusted to: {}", adjusted);
            }
            if let Rejection::ImplausibleTrend { delta, .. } = rejection {
                println!("    Jump: {} MW", delta);
            }
        }
    }
}
