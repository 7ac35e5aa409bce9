//! List rules command implementation.

use idiom_lint_core::{Category, PatternId};
use idiom_lint_rules::{describe, Preset};

/// Runs the list-rules command.
pub fn run() {
    println!("Available patterns:\n");
    println!("{:<8} {:<28} {:<11} Description", "Code", "Name", "Category");
    println!("{}", "-".repeat(96));

    for pattern in PatternId::ALL {
        println!(
            "{:<8} {:<28} {:<11} {}",
            pattern.code(),
            pattern.name(),
            pattern.category().name(),
            describe(*pattern)
        );
    }

    println!("\nPresets:");
    for preset in Preset::ALL {
        let note = match preset {
            Preset::Recommended => "all detectors (default)",
            Preset::Strict => "all detectors, unwrap raised to error",
            Preset::Minimal => "error handling plus blocking async calls",
        };
        println!("  {:<12} - {note}", preset.name());
    }

    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.name()).collect();
    println!("\nCategories: {}", categories.join(", "));

    println!("\nUse --rules or --category to filter, e.g.:");
    println!("  idiom-lint check --rules unwrap,IL101");
    println!("  idiom-lint check --category async,errors");
}
