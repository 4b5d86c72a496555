use super::types::*;
use crate::operation::{Operation, OperationKind};
use std::collections::HashSet;
use std::sync::Arc;

/// Arena owning every value and operation of a transformation.
///
/// Slots are never reused: removing a member leaves a tombstone so that stale
/// identifiers held elsewhere resolve to "unknown" rather than to a newcomer.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    values: Vec<Option<Value>>,
    operations: Vec<Option<Operation>>,

    // Identifiers are unique across values and operations.
    used_names: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    /// Number of operation slots, live or removed.
    pub fn operation_slots(&self) -> usize { self.operations.len() }
    pub fn value_slots(&self) -> usize { self.values.len() }

    pub fn is_name_used(&self, name: &str) -> bool {
        self.used_names.contains(name)
    }

    /// Returns `base` if free, otherwise the first free `base_1`, `base_2`, ...
    pub fn unique_name(&self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut counter = 1;
        while self.used_names.contains(&candidate) {
            candidate = format!("{}_{}", base, counter);
            counter += 1;
        }
        candidate
    }

    /// Callers check the name with [`Registry::is_name_used`] first.
    pub fn add_value(&mut self, name: String, value_type: ValueType, source: ValueSource) -> ValueId {
        let id = ValueId::new(self.values.len());
        self.used_names.insert(name.clone());
        self.values.push(Some(Value { id, name, value_type, source }));
        id
    }

    /// Callers check the name with [`Registry::is_name_used`] first.
    pub fn add_operation(&mut self, name: String, kind: Arc<dyn OperationKind>) -> OperationId {
        let id = OperationId::new(self.operations.len());
        self.used_names.insert(name.clone());
        self.operations.push(Some(Operation::new(id, name, kind)));
        id
    }

    pub fn remove_value(&mut self, id: ValueId) -> Option<Value> {
        let removed = self.values.get_mut(id.index())?.take()?;
        self.used_names.remove(&removed.name);
        Some(removed)
    }

    pub fn remove_operation(&mut self, id: OperationId) -> Option<Operation> {
        let removed = self.operations.get_mut(id.index())?.take()?;
        self.used_names.remove(&removed.name);
        Some(removed)
    }

    #[inline(always)]
    pub fn value(&self, id: ValueId) -> Option<&Value> {
        self.values.get(id.index())?.as_ref()
    }

    pub fn value_mut(&mut self, id: ValueId) -> Option<&mut Value> {
        self.values.get_mut(id.index())?.as_mut()
    }

    #[inline(always)]
    pub fn operation(&self, id: OperationId) -> Option<&Operation> {
        self.operations.get(id.index())?.as_ref()
    }

    pub fn operation_mut(&mut self, id: OperationId) -> Option<&mut Operation> {
        self.operations.get_mut(id.index())?.as_mut()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().flatten()
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.iter().flatten()
    }

    pub fn value_named(&self, name: &str) -> Option<&Value> {
        self.values().find(|v| v.name == name)
    }

    pub fn operation_named(&self, name: &str) -> Option<&Operation> {
        self.operations().find(|op| op.name == name)
    }

    /// Live operations listing `value` among their inputs.
    pub fn consumers_of(&self, value: ValueId) -> Vec<OperationId> {
        self.operations()
            .filter(|op| op.inputs().contains(&value))
            .map(|op| op.id)
            .collect()
    }

    /// Values exposing the result of `op`, live or not.
    pub fn outputs_of(&self, op: OperationId) -> Vec<ValueId> {
        self.values().filter(|v| v.upstream() == Some(op)).map(|v| v.id).collect()
    }

    /// Operations feeding `op` through its inputs, in input order, deduplicated.
    pub fn upstream_of(&self, op: OperationId) -> Vec<OperationId> {
        let mut seen = HashSet::new();
        self.operation(op)
            .into_iter()
            .flat_map(|o| o.inputs().iter())
            .filter_map(|v| self.value(*v).and_then(Value::upstream))
            .filter(|up| self.operation(*up).is_some() && seen.insert(*up))
            .collect()
    }
}
