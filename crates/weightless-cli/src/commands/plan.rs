use weightless_core::format::{format_clock, format_total};
use weightless_core::{validate, ConfigStore, KvConfigStore, RoundPlan};

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = KvConfigStore::open()?.load()?;
    validate(&config).into_result()?;
    let plan = RoundPlan::generate(&config);

    if json {
        let out = serde_json::json!({
            "rounds": plan.rounds,
            "totalSecs": plan.total_secs(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{:<7} {:>8} {:>8}", "Round", "Breathe", "Hold");
    for (i, round) in plan.iter().enumerate() {
        println!(
            "{:<7} {:>8} {:>8}",
            i + 1,
            format_clock(round.breathe),
            format_clock(round.hold)
        );
    }
    println!("Total time: {}", format_total(plan.total_secs()));
    Ok(())
}
