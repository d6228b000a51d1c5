/// Closed set of completion strategies. Each variant contributes a prompt
/// template and the continuation seeds injected ahead of the model's
/// output, which govern whether the model is nudged to continue the
/// current line or to start a new one. Selection is a pure function of
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStrategy {
    /// Finish the line under the cursor; sampling stops at the newline.
    SingleLine,
    /// Allow a multi-line continuation; fans out one request continuing
    /// in place and one starting on a fresh line.
    MultiLine,
}

/// Per-variant data record: no subclass dispatch, just values.
#[derive(Debug, Clone, Copy)]
pub struct StrategyParams {
    pub template_id: &'static str,
    /// One request is issued per seed (capped by `default_n`); the seed is
    /// prepended to whatever the model returns.
    pub inject_seeds: &'static [&'static str],
    pub stop_sequences: &'static [&'static str],
}

impl ProviderStrategy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "single-line" => Some(ProviderStrategy::SingleLine),
            "multi-line" => Some(ProviderStrategy::MultiLine),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProviderStrategy::SingleLine => "single-line",
            ProviderStrategy::MultiLine => "multi-line",
        }
    }

    pub fn params(&self) -> StrategyParams {
        match self {
            ProviderStrategy::SingleLine => StrategyParams {
                template_id: "single-line",
                inject_seeds: &[""],
                stop_sequences: &["\n"],
            },
            ProviderStrategy::MultiLine => StrategyParams {
                template_id: "multi-line",
                inject_seeds: &["", "\n"],
                stop_sequences: &["\n\n\n"],
            },
        }
    }
}

/// Known strategy names, for config validation messages.
pub const STRATEGY_NAMES: &[&str] = &["single-line", "multi-line"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_round_trips() {
        for name in STRATEGY_NAMES {
            let s = ProviderStrategy::from_name(name).unwrap();
            assert_eq!(s.name(), *name);
        }
    }

    #[test]
    fn test_unknown_name() {
        assert!(ProviderStrategy::from_name("chat").is_none());
    }

    #[test]
    fn test_single_line_stops_at_newline() {
        let p = ProviderStrategy::SingleLine.params();
        assert_eq!(p.inject_seeds, &[""]);
        assert!(p.stop_sequences.contains(&"\n"));
    }

    #[test]
    fn test_multi_line_seeds_differ() {
        let p = ProviderStrategy::MultiLine.params();
        assert_eq!(p.inject_seeds.len(), 2);
        assert_ne!(p.inject_seeds[0], p.inject_seeds[1]);
    }
}
