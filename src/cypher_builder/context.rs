//! Per-build alias and parameter allocation.
//!
//! [`CypherContext`] is threaded by `&mut` through every render call. It maps
//! reference identities to names the first time the renderer visits them:
//!
//! ```text
//! first alias      -> this       (bare prefix)
//! later aliases    -> this0, this1, var2, ...   (one shared counter)
//! parameters       -> param0, param1, ...       (own counter, never reset)
//! ```
//!
//! Names are stored in a vector indexed by [`RefId::index`], so a repeated
//! lookup for the same identity always returns the same string.

use serde_json::{Map, Value};

use crate::config::BuilderConfig;

use super::errors::CypherBuilderError;
use super::references::{ArenaId, Param, RefId, Reference, ReferenceKind};

#[derive(Debug)]
pub struct CypherContext {
    arena: ArenaId,
    alias_prefix: String,
    variable_prefix: String,
    param_prefix: String,
    max_subquery_depth: usize,
    /// Assigned name per reference index (alias or parameter name)
    names: Vec<Option<String>>,
    alias_count: usize,
    param_count: usize,
    params: Map<String, Value>,
    subquery_depth: usize,
}

impl CypherContext {
    pub fn new(arena: ArenaId, config: &BuilderConfig) -> Self {
        Self {
            arena,
            alias_prefix: config.alias_prefix.clone(),
            variable_prefix: config.variable_prefix.clone(),
            param_prefix: config.param_prefix.clone(),
            max_subquery_depth: config.max_subquery_depth,
            names: Vec::new(),
            alias_count: 0,
            param_count: 0,
            params: Map::new(),
            subquery_depth: 0,
        }
    }

    /// Alias of a node, relationship, or variable, allocated on first use.
    ///
    /// # Panics
    /// If the reference was handed out by a different arena.
    pub fn alias_for(&mut self, reference: &Reference) -> String {
        let id = reference.id();
        if let Some(existing) = self.lookup(id) {
            return existing.to_string();
        }

        let prefix = match reference.kind() {
            ReferenceKind::Node | ReferenceKind::Relationship => &self.alias_prefix,
            ReferenceKind::Variable => &self.variable_prefix,
        };
        let alias = if self.alias_count == 0 {
            prefix.clone()
        } else {
            format!("{}{}", prefix, self.alias_count - 1)
        };
        self.alias_count += 1;

        log::trace!("alias {} -> {:?} #{}", alias, reference.kind(), id.index());
        self.assign(id, alias.clone());
        alias
    }

    /// Parameter name for `param`, allocated on first use. The value is
    /// recorded at the same moment.
    ///
    /// # Panics
    /// If the parameter was handed out by a different arena.
    pub fn param_name_for(&mut self, param: &Param) -> String {
        let id = param.id();
        if let Some(existing) = self.lookup(id) {
            return existing.to_string();
        }

        let name = format!("{}{}", self.param_prefix, self.param_count);
        self.param_count += 1;

        log::trace!("param {} -> #{}", name, id.index());
        self.assign(id, name.clone());
        self.record_value(&name, param.value());
        name
    }

    /// Store the value bound to `name`. Only the first call for a name counts.
    pub fn record_value(&mut self, name: &str, value: &Value) {
        if !self.params.contains_key(name) {
            self.params.insert(name.to_string(), value.clone());
        }
    }

    /// Name→value table accumulated so far, in allocation order.
    pub fn collect_params(&self) -> Map<String, Value> {
        self.params.clone()
    }

    pub fn into_params(self) -> Map<String, Value> {
        self.params
    }

    /// Number of aliases handed out so far.
    pub fn alias_count(&self) -> usize {
        self.alias_count
    }

    /// Open a `CALL { }` or `EXISTS { }` scope. Only the depth is tracked;
    /// aliases and parameter numbering carry straight through.
    pub fn enter_subquery(&mut self) -> Result<(), CypherBuilderError> {
        let depth = self.subquery_depth + 1;
        if depth > self.max_subquery_depth {
            return Err(CypherBuilderError::SubqueryTooDeep {
                depth,
                max: self.max_subquery_depth,
            });
        }
        self.subquery_depth = depth;
        Ok(())
    }

    pub fn exit_subquery(&mut self) {
        self.subquery_depth = self.subquery_depth.saturating_sub(1);
    }

    fn check_arena(&self, id: RefId) {
        if id.arena() != self.arena {
            panic!(
                "reference #{} belongs to build {:?} but is rendered in build {:?}",
                id.index(),
                id.arena(),
                self.arena
            );
        }
    }

    fn lookup(&self, id: RefId) -> Option<&str> {
        self.check_arena(id);
        self.names.get(id.index()).and_then(|name| name.as_deref())
    }

    fn assign(&mut self, id: RefId, name: String) {
        let index = id.index();
        if self.names.len() <= index {
            self.names.resize(index + 1, None);
        }
        self.names[index] = Some(name);
    }
}
