//! Configuration validation.
//!
//! Problems found here never abort a load. They are reported to the
//! operator and the affected slot falls back to "no pack".

use super::{AssignmentBlock, Config};
use crate::pack::{HashError, PackHash};
use std::collections::HashSet;
use thiserror::Error;

/// Non-fatal configuration problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigWarning {
    #[error("pack '{0}' has no url and will be ignored")]
    MissingUrl(String),
    #[error("pack '{pack}' has an invalid hash ({error}); it will be sent without one")]
    InvalidHash { pack: String, error: HashError },
    #[error("pack '{0}' is defined more than once (names are case-insensitive)")]
    DuplicateName(String),
    #[error("{slot} references unknown pack '{name}'")]
    UnknownPack { slot: String, name: String },
    #[error("engine.tick_millis is 0, using 50")]
    ZeroTick,
}

/// Validate a configuration, returning every problem found.
pub fn validate(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();
    let mut known = HashSet::new();

    for (name, block) in &config.packs {
        if block.url.trim().is_empty() {
            warnings.push(ConfigWarning::MissingUrl(name.clone()));
            continue;
        }
        if !known.insert(name.to_lowercase()) {
            warnings.push(ConfigWarning::DuplicateName(name.clone()));
            continue;
        }
        if let Some(hash) = block.hash.as_deref().filter(|h| !h.is_empty())
            && let Err(error) = PackHash::from_hex(hash)
        {
            warnings.push(ConfigWarning::InvalidHash {
                pack: name.clone(),
                error,
            });
        }
    }

    let mut check = |slot: String, name: &str| {
        if !known.contains(&name.to_lowercase()) {
            warnings.push(ConfigWarning::UnknownPack {
                slot,
                name: name.to_string(),
            });
        }
    };

    if let Some(empty) = config.empty.as_deref().filter(|n| !n.is_empty()) {
        check("empty".to_string(), empty);
    }
    check_assignment("global", &config.global, &mut check);
    for (server, block) in &config.servers {
        check_assignment(&format!("servers.{server}"), block, &mut check);
    }

    if config.engine.tick_millis == 0 {
        warnings.push(ConfigWarning::ZeroTick);
    }

    warnings
}

fn check_assignment(prefix: &str, block: &AssignmentBlock, check: &mut impl FnMut(String, &str)) {
    if let Some(pack) = block.pack_name() {
        check(format!("{prefix}.pack"), pack);
    }
    for secondary in &block.secondary {
        check(format!("{prefix}.secondary"), secondary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Config {
        Config::parse(toml).unwrap()
    }

    #[test]
    fn test_valid_config_passes() {
        let config = parse(
            r#"
[packs.lobby]
url = "https://example.net/lobby.zip"
hash = "0123456789abcdef0123456789abcdef01234567"

[global]
pack = "lobby"

[servers.hub]
secondary = ["Lobby"]
"#,
        );
        assert!(validate(&config).is_empty());
    }

    #[test]
    fn test_unknown_references_are_reported_per_slot() {
        let config = parse(
            r#"
empty = "nothing"

[packs.lobby]
url = "https://example.net/lobby.zip"

[global]
pack = "missing"

[servers.hub]
secondary = ["lobby", "ghost"]
"#,
        );
        let warnings = validate(&config);
        assert_eq!(warnings.len(), 3);
        assert!(warnings.contains(&ConfigWarning::UnknownPack {
            slot: "empty".into(),
            name: "nothing".into(),
        }));
        assert!(warnings.contains(&ConfigWarning::UnknownPack {
            slot: "global.pack".into(),
            name: "missing".into(),
        }));
        assert!(warnings.contains(&ConfigWarning::UnknownPack {
            slot: "servers.hub.secondary".into(),
            name: "ghost".into(),
        }));
    }

    #[test]
    fn test_pack_without_url_is_unknown_to_assignments() {
        let config = parse(
            r#"
[packs.lobby]
hash = "0123456789abcdef0123456789abcdef01234567"

[global]
pack = "lobby"
"#,
        );
        let warnings = validate(&config);
        assert!(warnings.contains(&ConfigWarning::MissingUrl("lobby".into())));
        assert!(
            warnings
                .iter()
                .any(|w| matches!(w, ConfigWarning::UnknownPack { name, .. } if name == "lobby"))
        );
    }

    #[test]
    fn test_bad_hash_and_case_duplicates() {
        let config = parse(
            r#"
[packs.Lobby]
url = "https://a"
hash = "nothex"

[packs.lobby]
url = "https://b"

[engine]
tick_millis = 0
"#,
        );
        let warnings = validate(&config);
        assert!(
            warnings
                .iter()
                .any(|w| matches!(w, ConfigWarning::InvalidHash { pack, .. } if pack == "Lobby"))
        );
        assert!(warnings.contains(&ConfigWarning::DuplicateName("lobby".into())));
        assert!(warnings.contains(&ConfigWarning::ZeroTick));
    }
}
