//! Assignment resolution.
//!
//! Precedence: backend override > server assignment > global assignment.
//! Secondary packs are the global ones followed by the server's own.

use super::AssignmentStore;
use crate::error::PlatformError;
use crate::pack::ResourcePack;
use std::collections::HashSet;
use std::sync::Arc;

/// The ordered pack set a client should hold on a server.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Primary (if any) first, then de-duplicated secondaries.
    packs: Vec<Arc<ResourcePack>>,
    has_primary: bool,
    /// Effective delay in ticks before sending after a switch.
    pub send_delay: u64,
}

impl Resolution {
    pub fn packs(&self) -> &[Arc<ResourcePack>] {
        &self.packs
    }

    pub fn primary(&self) -> Option<&Arc<ResourcePack>> {
        if self.has_primary {
            self.packs.first()
        } else {
            None
        }
    }

    pub fn secondaries(&self) -> &[Arc<ResourcePack>] {
        if self.has_primary {
            &self.packs[1..]
        } else {
            &self.packs
        }
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }

    /// The packs a client may receive given its stacking support.
    ///
    /// A client that cannot stack only takes the primary; when secondaries
    /// would be dropped this fails with `UnsupportedStacking` so the caller
    /// can decide to degrade with [`primary_only`](Self::primary_only).
    pub fn for_client(&self, stacking: bool) -> Result<&[Arc<ResourcePack>], PlatformError> {
        let skipped = self.secondaries().len();
        if stacking || skipped == 0 {
            Ok(&self.packs)
        } else {
            Err(PlatformError::UnsupportedStacking { skipped })
        }
    }

    pub fn primary_only(&self) -> &[Arc<ResourcePack>] {
        if self.has_primary {
            &self.packs[..1]
        } else {
            &[]
        }
    }
}

/// Resolve the packs for a client on `server`.
///
/// `server` is `None` while the client has no backend yet; only the global
/// assignment applies then. A client whose backend pushed its own pack gets
/// an empty set.
pub fn resolve(store: &AssignmentStore, server: Option<&str>, backend_override: bool) -> Resolution {
    let global = store.get_global_assignment();
    let server_assignment = server.map(|name| store.get_assignment(name));

    let send_delay = server_assignment
        .map(|a| a.send_delay)
        .filter(|delay| *delay >= 0)
        .or_else(|| Some(global.send_delay).filter(|delay| *delay >= 0))
        .map(|delay| delay as u64)
        .unwrap_or(0);

    if backend_override {
        return Resolution {
            send_delay,
            ..Default::default()
        };
    }

    let primary = server_assignment
        .and_then(|a| a.primary.clone())
        .or_else(|| global.primary.clone());

    let mut seen = HashSet::new();
    let mut packs = Vec::new();
    if let Some(primary) = &primary {
        seen.insert(primary.id());
        packs.push(primary.clone());
    }

    let server_secondary = server_assignment.map(|a| a.secondary.as_slice()).unwrap_or(&[]);
    for pack in global.secondary.iter().chain(server_secondary) {
        if seen.insert(pack.id()) {
            packs.push(pack.clone());
        }
    }

    Resolution {
        packs,
        has_primary: primary.is_some(),
        send_delay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::Assignment;

    fn pack(name: &str) -> Arc<ResourcePack> {
        Arc::new(ResourcePack::new(name, format!("https://example.net/{name}.zip"), None))
    }

    fn names(resolution: &Resolution) -> Vec<&str> {
        resolution.packs().iter().map(|p| p.name()).collect()
    }

    #[test]
    fn server_primary_wins_over_global() {
        let (a, g) = (pack("a"), pack("g"));
        let mut store = AssignmentStore::new(Assignment {
            primary: Some(g.clone()),
            ..Default::default()
        });
        store.insert(
            "lobby",
            Assignment {
                primary: Some(a.clone()),
                ..Default::default()
            },
        );

        let resolution = resolve(&store, Some("lobby"), false);
        assert_eq!(resolution.primary(), Some(&a));
        assert_eq!(names(&resolution), vec!["a"]);

        let elsewhere = resolve(&store, Some("survival"), false);
        assert_eq!(elsewhere.primary(), Some(&g));
    }

    #[test]
    fn override_returns_empty_set() {
        let mut store = AssignmentStore::new(Assignment {
            primary: Some(pack("g")),
            secondary: vec![pack("s")],
            send_delay: 5,
        });
        store.insert(
            "lobby",
            Assignment {
                primary: Some(pack("a")),
                ..Default::default()
            },
        );

        let resolution = resolve(&store, Some("lobby"), true);
        assert!(resolution.is_empty());
        assert_eq!(resolution.send_delay, 5);
    }

    #[test]
    fn secondaries_are_global_then_server_without_duplicates() {
        let (a, b, c, d) = (pack("a"), pack("b"), pack("c"), pack("d"));
        let mut store = AssignmentStore::new(Assignment {
            secondary: vec![b.clone(), a.clone()],
            ..Default::default()
        });
        store.insert(
            "lobby",
            Assignment {
                primary: Some(a.clone()),
                secondary: vec![c.clone(), b.clone(), d.clone()],
                send_delay: -1,
            },
        );

        let resolution = resolve(&store, Some("lobby"), false);
        assert_eq!(names(&resolution), vec!["a", "b", "c", "d"]);
        assert_eq!(resolution.secondaries().len(), 3);
    }

    #[test]
    fn lobby_scenario_resolves_primary_then_global_secondary() {
        let (a, b) = (pack("a"), pack("b"));
        let mut store = AssignmentStore::new(Assignment {
            secondary: vec![b.clone()],
            ..Default::default()
        });
        store.insert(
            "lobby",
            Assignment {
                primary: Some(a.clone()),
                ..Default::default()
            },
        );

        let resolution = resolve(&store, Some("lobby"), false);
        assert_eq!(names(&resolution), vec!["a", "b"]);
    }

    #[test]
    fn nothing_configured_resolves_empty() {
        let store = AssignmentStore::default();
        let resolution = resolve(&store, Some("lobby"), false);
        assert!(resolution.is_empty());
        assert!(resolution.primary().is_none());
        assert_eq!(resolution.send_delay, 0);
    }

    #[test]
    fn no_server_uses_global_only() {
        let g = pack("g");
        let store = AssignmentStore::new(Assignment {
            primary: Some(g.clone()),
            send_delay: 3,
            ..Default::default()
        });
        let resolution = resolve(&store, None, false);
        assert_eq!(resolution.primary(), Some(&g));
        assert_eq!(resolution.send_delay, 3);
    }

    #[test]
    fn send_delay_inherits_then_defaults_to_zero() {
        let mut store = AssignmentStore::new(Assignment {
            send_delay: 20,
            ..Default::default()
        });
        store.insert("fast", Assignment {
            send_delay: 0,
            ..Default::default()
        });
        store.insert("inherit", Assignment::default());

        assert_eq!(resolve(&store, Some("fast"), false).send_delay, 0);
        assert_eq!(resolve(&store, Some("inherit"), false).send_delay, 20);
        assert_eq!(resolve(&store, Some("unknown"), false).send_delay, 20);

        let store = AssignmentStore::default();
        assert_eq!(resolve(&store, Some("any"), false).send_delay, 0);
    }

    #[test]
    fn non_stacking_client_is_told_what_was_skipped() {
        let (a, b, c) = (pack("a"), pack("b"), pack("c"));
        let store = AssignmentStore::new(Assignment {
            primary: Some(a.clone()),
            secondary: vec![b, c],
            ..Default::default()
        });
        let resolution = resolve(&store, None, false);

        assert_eq!(resolution.for_client(true).unwrap().len(), 3);
        assert_eq!(
            resolution.for_client(false).unwrap_err(),
            PlatformError::UnsupportedStacking { skipped: 2 }
        );
        assert_eq!(resolution.primary_only(), &[a]);
    }

    #[test]
    fn single_primary_is_fine_without_stacking() {
        let a = pack("a");
        let store = AssignmentStore::new(Assignment {
            primary: Some(a),
            ..Default::default()
        });
        assert_eq!(resolve(&store, None, false).for_client(false).unwrap().len(), 1);
    }
}
