//! The `mathrank init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    let path = std::path::Path::new("mathrank.toml");
    if path.exists() {
        println!("mathrank.toml already exists, skipping.");
    } else {
        std::fs::write(path, SAMPLE_CONFIG)?;
        println!("Created mathrank.toml");
    }

    println!("\nNext steps:");
    println!("  1. Adjust mode, difficulty and timing in mathrank.toml");
    println!("  2. Run: mathrank play");
    println!("  3. Run: mathrank summary --report <path printed after the game>");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# mathrank configuration

# main (30 rounds, pass at 25), practice-15 (pass at 12), practice-20 (pass at 15)
default_mode = "main"
default_difficulty = "medium"

round_seconds = 15
advance_delay_ms = 500
max_generation_attempts = 10000

# seed = 42
output_dir = "./mathrank-results"
"#;
