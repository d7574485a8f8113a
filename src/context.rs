//! Per-run generation state: reserved identifiers and scratch variable names.
//!
//! One [`GenerationContext`] is created for every run and dropped with it, so
//! several runs in the same process never share counters or reservations.

use std::collections::BTreeSet;

use crate::naming::{sanitize_identifier, to_snake_case, DEFAULT_TARGET};

const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
];

#[derive(Debug, Clone)]
pub struct GenerationContext {
    target: String,
    reserved: BTreeSet<String>,
    temp_count: usize,
}

impl GenerationContext {
    /// Create a context for `target`, the module generated types live in.
    ///
    /// The target is normalized to a snake_case identifier (empty means
    /// [`DEFAULT_TARGET`]) and reserved so no generated name collides with it.
    pub fn new(target: &str) -> Self {
        let mut reserved: BTreeSet<String> =
            RUST_KEYWORDS.iter().map(|k| (*k).to_string()).collect();
        let target = match to_snake_case(target) {
            t if t.is_empty() => DEFAULT_TARGET.to_string(),
            t => {
                let t = sanitize_identifier(&t);
                if reserved.contains(&t) {
                    format!("{t}_")
                } else {
                    t
                }
            }
        };
        reserved.insert(target.clone());
        Self {
            target,
            reserved,
            temp_count: 0,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn reserve(&mut self, name: &str) {
        self.reserved.insert(name.to_string());
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// Identifier for `name` that does not collide with a reserved word.
    pub fn safe_ident(&self, name: &str) -> String {
        let ident = sanitize_identifier(name);
        if self.is_reserved(&ident) {
            format!("{ident}_")
        } else {
            ident
        }
    }

    /// Next scratch variable name: `c`, then `c2`, `c3`, ...
    pub fn tempvar(&mut self) -> String {
        self.temp_count += 1;
        if self.temp_count == 1 {
            "c".to_string()
        } else {
            format!("c{}", self.temp_count)
        }
    }
}

impl Default for GenerationContext {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET)
    }
}
