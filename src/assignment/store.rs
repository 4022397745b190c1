//! Per-server and global assignment rules.

use super::Assignment;
use std::collections::HashMap;

/// Read-only assignment rules. A reload replaces the whole store.
#[derive(Debug, Default)]
pub struct AssignmentStore {
    global: Assignment,
    servers: HashMap<String, Assignment>,
    /// Returned for servers without a configured assignment.
    unassigned: Assignment,
}

impl AssignmentStore {
    pub fn new(global: Assignment) -> Self {
        Self {
            global,
            servers: HashMap::new(),
            unassigned: Assignment::default(),
        }
    }

    /// Set the assignment of one server, replacing any previous one.
    pub fn insert(&mut self, server: impl Into<String>, assignment: Assignment) {
        self.servers.insert(server.into(), assignment);
    }

    /// Assignment of `server`, or an empty one inheriting the global delay.
    pub fn get_assignment(&self, server: &str) -> &Assignment {
        self.servers.get(server).unwrap_or(&self.unassigned)
    }

    pub fn get_global_assignment(&self) -> &Assignment {
        &self.global
    }

    /// Configured server names, sorted.
    pub fn servers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.servers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
