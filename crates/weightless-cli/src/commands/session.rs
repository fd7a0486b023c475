use clap::Subcommand;
use weightless_core::format::{format_field, format_total};
use weightless_core::{
    validate, ConfigField, ConfigStore, CoreError, KvConfigStore, RoundPlan, SessionConfig,
};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Show the stored configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change fields (breathe, hold, decrease, rounds); validated together
    Set {
        /// Field and value pairs, e.g. `breathe "1m 30s" rounds 4`
        #[arg(
            required = true,
            num_args = 2..,
            allow_hyphen_values = true,
            value_names = ["FIELD", "VALUE"]
        )]
        pairs: Vec<String>,
    },
    /// Forget the stored configuration and use the defaults
    Reset,
    /// Check the stored configuration
    Validate,
}

/// Apply `field value` pairs in order. Nothing is validated here, so
/// fields that depend on each other can change together.
fn apply_pairs(config: &mut SessionConfig, pairs: &[String]) -> Result<(), CoreError> {
    if pairs.len() % 2 != 0 {
        return Err(CoreError::Custom(format!(
            "expected field/value pairs, got {} arguments",
            pairs.len()
        )));
    }
    for pair in pairs.chunks(2) {
        let (name, value) = (&pair[0], &pair[1]);
        let field = ConfigField::parse(name)
            .ok_or_else(|| CoreError::Custom(format!("unknown field: {name}")))?;
        field.set(config, field.parse_value(value)?);
    }
    Ok(())
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = KvConfigStore::open()?;

    match action {
        SessionAction::Show { json } => {
            let config = store.load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("First breath  {}", format_field(config.breathe_sec));
                println!("Hold          {}", format_field(config.hold_sec));
                println!("Decrease      {}", format_field(config.decrease_sec));
                println!("Rounds        {}", config.rounds);
                if validate(&config).ok {
                    let total = RoundPlan::generate(&config).total_secs();
                    println!("Total         {}", format_total(total));
                }
            }
        }
        SessionAction::Set { pairs } => {
            let mut config = store.load()?;
            apply_pairs(&mut config, &pairs)?;
            validate(&config).into_result()?;
            store.save(&config)?;
            println!("ok");
        }
        SessionAction::Reset => {
            store.clear()?;
            println!("session config reset to defaults");
        }
        SessionAction::Validate => {
            let result = validate(&store.load()?);
            for (field, message) in &result.errors {
                println!("{field}: {message}");
            }
            result.into_result()?;
            println!("ok");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dependent_fields_change_together() {
        let mut config = SessionConfig::default();
        apply_pairs(&mut config, &pairs(&["breathe", "30s", "rounds", "3"])).unwrap();
        assert_eq!(config.breathe_sec, 30);
        assert_eq!(config.rounds, 3);
        assert!(validate(&config).ok);

        let mut alone = SessionConfig::default();
        apply_pairs(&mut alone, &pairs(&["breathe", "30s"])).unwrap();
        assert!(!validate(&alone).ok);
    }

    #[test]
    fn rejects_odd_and_unknown_input() {
        let mut config = SessionConfig::default();
        assert!(apply_pairs(&mut config, &pairs(&["breathe", "30s", "rounds"])).is_err());
        assert!(apply_pairs(&mut config, &pairs(&["tempo", "5"])).is_err());
        assert!(apply_pairs(&mut config, &pairs(&["hold", "soon"])).is_err());
    }
}
