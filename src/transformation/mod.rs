//! The transformation: owns values and operations, and runs the
//! validate-then-compute protocol over them.
//!
//! Every mutation discards the cached result of the affected operations and of
//! everything downstream, and marks them stale. Stale operations are
//! revalidated lazily, the first time their problems, state or result are
//! asked for. A result is only ever calculated for an operation whose current
//! problems contain no error.
pub mod error;

pub use error::{EngineError, FetchError};

use crate::analysis::topology;
use crate::compute::Ledger;
use crate::config::EngineConfig;
use crate::operation::{EvalContext, Operation, OperationDescriptor, OperationKind, OperationState, Term};
use crate::store::{Datum, OperationId, Registry, Value, ValueId, ValueSource};
use crate::validation::{validate_operation, FetchedTerm, MessageKey, ValidationProblem, ValidationProblems};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct Transformation {
    id: String,
    config: EngineConfig,
    registry: Registry,
    ledger: Ledger,
}

impl Transformation {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_config(id, EngineConfig::default())
    }

    pub fn with_config(id: impl Into<String>, config: EngineConfig) -> Self {
        Self { id: id.into(), config, registry: Registry::new(), ledger: Ledger::new() }
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn config(&self) -> &EngineConfig { &self.config }
    pub fn registry(&self) -> &Registry { &self.registry }

    /// Replaces the numeric policies. Every operation is invalidated.
    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
        let all: Vec<OperationId> = self.registry.operations().map(|op| op.id).collect();
        self.invalidate(&all);
    }

    // --- Construction ---

    fn claim_name(&self, name: &str) -> Result<(), EngineError> {
        if self.registry.is_name_used(name) {
            return Err(EngineError::DuplicateIdentifier(name.to_string()));
        }
        Ok(())
    }

    pub fn add_literal(&mut self, name: impl Into<String>, datum: impl Into<Datum>) -> Result<ValueId, EngineError> {
        let name = name.into();
        self.claim_name(&name)?;
        let datum = datum.into();
        let id = self.registry.add_value(name, datum.value_type(), ValueSource::Literal(datum));
        debug!(transformation = %self.id, value = %id, "Added literal");
        Ok(id)
    }

    pub fn add_operation<K: OperationKind + 'static>(
        &mut self,
        name: impl Into<String>,
        kind: K,
    ) -> Result<OperationId, EngineError> {
        self.add_shared_operation(name, Arc::new(kind))
    }

    /// Adds an operation whose kind is shared, e.g. one handed out by an
    /// [`OperationCatalog`](crate::operation::OperationCatalog).
    pub fn add_shared_operation(
        &mut self,
        name: impl Into<String>,
        kind: Arc<dyn OperationKind>,
    ) -> Result<OperationId, EngineError> {
        let name = name.into();
        self.claim_name(&name)?;
        let kind_id = kind.descriptor().id;
        let id = self.registry.add_operation(name, kind);
        self.ledger.ensure_capacity(self.registry.operation_slots());
        debug!(transformation = %self.id, operation = %id, kind = kind_id, "Added operation");
        Ok(id)
    }

    /// Exposes the live result of `op` as a value other operations can consume.
    ///
    /// Without a name, the identifier is `<operation>.result`, suffixed with
    /// `_1`, `_2`, ... when taken.
    pub fn expose_output(&mut self, op: OperationId, name: Option<&str>) -> Result<ValueId, EngineError> {
        let operation = self.registry.operation(op).ok_or(EngineError::UnknownOperation(op))?;
        let value_type = operation.descriptor().output;
        let name = match name {
            Some(name) => {
                self.claim_name(name)?;
                name.to_string()
            }
            None => self.registry.unique_name(&format!("{}.result", operation.name)),
        };
        Ok(self.registry.add_value(name, value_type, ValueSource::Output(op)))
    }

    /// Removes a value. Operations still listing it as an input become
    /// invalid on their next pass.
    pub fn remove_value(&mut self, value: ValueId) -> Result<Value, EngineError> {
        let consumers = self.registry.consumers_of(value);
        let removed = self.registry.remove_value(value).ok_or(EngineError::UnknownValue(value))?;
        debug!(transformation = %self.id, value = %value, consumers = consumers.len(), "Removed value");
        self.invalidate(&consumers);
        Ok(removed)
    }

    /// Removes an operation. Its exposed outputs stay but no longer fetch.
    pub fn remove_operation(&mut self, op: OperationId) -> Result<Operation, EngineError> {
        if self.registry.operation(op).is_none() {
            return Err(EngineError::UnknownOperation(op));
        }
        self.invalidate(&[op]);
        let removed = self.registry.remove_operation(op).ok_or(EngineError::UnknownOperation(op))?;
        debug!(transformation = %self.id, operation = %op, "Removed operation");
        Ok(removed)
    }

    pub fn update_literal(&mut self, value: ValueId, datum: impl Into<Datum>) -> Result<(), EngineError> {
        let datum = datum.into();
        let entry = self.registry.value_mut(value).ok_or(EngineError::UnknownValue(value))?;
        if !entry.is_literal() {
            return Err(EngineError::NotALiteral(value));
        }
        entry.value_type = datum.value_type();
        entry.source = ValueSource::Literal(datum);

        let consumers = self.registry.consumers_of(value);
        debug!(transformation = %self.id, value = %value, consumers = consumers.len(), "Updated literal");
        self.invalidate(&consumers);
        Ok(())
    }

    // --- Inputs ---

    /// Appends `values` to the inputs of `op`, then revalidates.
    ///
    /// The batch is atomic: if any value is unknown or, for kinds with unique
    /// inputs, already present, nothing is added.
    pub fn add_input(&mut self, op: OperationId, values: &[ValueId]) -> Result<(), EngineError> {
        let operation = self.registry.operation(op).ok_or(EngineError::UnknownOperation(op))?;
        let unique = operation.descriptor().unique_inputs;
        let mut pending: HashSet<ValueId> = HashSet::new();
        for &value in values {
            if self.registry.value(value).is_none() {
                return Err(EngineError::UnknownValue(value));
            }
            if unique && (operation.inputs().contains(&value) || !pending.insert(value)) {
                return Err(EngineError::DuplicateInput { operation: operation.name.clone(), value });
            }
        }

        if let Some(operation) = self.registry.operation_mut(op) {
            operation.inputs.extend_from_slice(values);
        }
        self.invalidate(&[op]);
        self.refresh(op, &mut HashSet::new())
    }

    /// Removes the first occurrence of each of `values` from the inputs of
    /// `op`, then revalidates. Atomic like [`Transformation::add_input`].
    pub fn remove_input(&mut self, op: OperationId, values: &[ValueId]) -> Result<(), EngineError> {
        let operation = self.registry.operation(op).ok_or(EngineError::UnknownOperation(op))?;
        let mut remaining = operation.inputs.clone();
        for &value in values {
            match remaining.iter().position(|v| *v == value) {
                Some(pos) => {
                    remaining.remove(pos);
                }
                None => {
                    return Err(EngineError::InputNotFound { operation: operation.name.clone(), value });
                }
            }
        }

        if let Some(operation) = self.registry.operation_mut(op) {
            operation.inputs = remaining;
        }
        self.invalidate(&[op]);
        self.refresh(op, &mut HashSet::new())
    }

    // --- Read access ---

    pub fn value(&self, id: ValueId) -> Option<&Value> {
        self.registry.value(id)
    }

    pub fn operation(&self, id: OperationId) -> Option<&Operation> {
        self.registry.operation(id)
    }

    pub fn value_named(&self, name: &str) -> Option<&Value> {
        self.registry.value_named(name)
    }

    pub fn operation_named(&self, name: &str) -> Option<&Operation> {
        self.registry.operation_named(name)
    }

    pub fn inputs(&self, op: OperationId) -> Result<&[ValueId], EngineError> {
        self.registry.operation(op).map(Operation::inputs).ok_or(EngineError::UnknownOperation(op))
    }

    /// The input of `op` carrying the identifier `name`, if any.
    pub fn input_named(&self, op: OperationId, name: &str) -> Option<&Value> {
        self.registry
            .operation(op)?
            .inputs()
            .iter()
            .filter_map(|v| self.registry.value(*v))
            .find(|v| v.name == name)
    }

    pub fn descriptor(&self, op: OperationId) -> Result<&OperationDescriptor, EngineError> {
        self.registry.operation(op).map(Operation::descriptor).ok_or(EngineError::UnknownOperation(op))
    }

    /// The cached result of `op`, without validating or calculating.
    pub fn cached(&self, op: OperationId) -> Option<&Datum> {
        self.ledger.get(op)
    }

    /// Reads a value's datum. An exposed output evaluates its producer on demand.
    pub fn fetch(&mut self, value: ValueId) -> Result<Datum, FetchError> {
        self.fetch_guarded(value, &mut HashSet::new())
    }

    // --- Validation and computation ---

    /// The current diagnosis of `op`, revalidating first if it is stale.
    pub fn problems(&mut self, op: OperationId) -> Result<&ValidationProblems, EngineError> {
        self.refresh(op, &mut HashSet::new())?;
        self.registry.operation(op).map(|o| &o.problems).ok_or(EngineError::UnknownOperation(op))
    }

    pub fn state(&mut self, op: OperationId) -> Result<OperationState, EngineError> {
        self.refresh(op, &mut HashSet::new())?;
        let operation = self.registry.operation(op).ok_or(EngineError::UnknownOperation(op))?;
        let state = if operation.inputs.is_empty() {
            OperationState::Constructed
        } else if operation.problems.is_error() {
            OperationState::Invalid
        } else if self.ledger.contains(op) {
            OperationState::ValidComputed
        } else {
            OperationState::ValidUncomputed
        };
        Ok(state)
    }

    /// The result of `op`, calculated at most once between mutations.
    ///
    /// Fails with [`EngineError::NotReady`] while `op` has error problems.
    pub fn get(&mut self, op: OperationId) -> Result<Datum, EngineError> {
        self.evaluate(op, &mut HashSet::new())
    }

    /// Alias of [`Transformation::get`].
    pub fn result(&mut self, op: OperationId) -> Result<Datum, EngineError> {
        self.get(op)
    }

    /// A fresh transformation-wide diagnosis: dependency cycles first, then
    /// the problems of every operation in creation order.
    pub fn problems_all(&mut self) -> ValidationProblems {
        let mut all = ValidationProblems::new();
        for cycle in topology::cycles(&self.registry) {
            let names = self.names_of(&cycle).join(", ");
            all.add(ValidationProblem::error(
                self.id.clone(),
                MessageKey::CyclicDependency,
                vec![self.id.clone(), names],
            ));
        }

        let ops: Vec<OperationId> = self.registry.operations().map(|op| op.id).collect();
        for op in ops {
            if let Ok(problems) = self.problems(op) {
                all.extend(problems);
            }
        }
        all
    }

    /// Operations ordered so that producers precede their consumers.
    pub fn evaluation_order(&self) -> Result<Vec<OperationId>, EngineError> {
        topology::sort(&self.registry).map_err(|cycle| EngineError::CyclicDependency(self.names_of(&cycle)))
    }

    /// Computes every operation in evaluation order. Individual operations
    /// may fail; only a dependency cycle fails the whole pass.
    pub fn evaluate_all(&mut self) -> Result<Vec<(OperationId, Result<Datum, EngineError>)>, EngineError> {
        let order = self.evaluation_order()?;
        Ok(order.into_iter().map(|op| (op, self.get(op))).collect())
    }

    // --- Internals ---

    fn names_of(&self, ops: &[OperationId]) -> Vec<String> {
        ops.iter()
            .map(|op| self.registry.operation(*op).map_or_else(|| op.to_string(), |o| o.name.clone()))
            .collect()
    }

    /// Drops the cached results of `ops` and everything downstream of them.
    fn invalidate(&mut self, ops: &[OperationId]) {
        let affected = topology::downstream_from(&self.registry, ops);
        debug!(transformation = %self.id, roots = ops.len(), affected = affected.len(), "Invalidating");
        self.ledger.invalidate(affected.iter().copied());
        for op in affected {
            if let Some(operation) = self.registry.operation_mut(op) {
                operation.stale = true;
            }
        }
    }

    fn fetch_guarded(&mut self, value: ValueId, visiting: &mut HashSet<OperationId>) -> Result<Datum, FetchError> {
        let entry = self.registry.value(value).ok_or(FetchError::UnknownValue(value))?;
        trace!(transformation = %self.id, value = %value, "Fetching");
        let producer = match &entry.source {
            ValueSource::Literal(datum) => return Ok(datum.clone()),
            ValueSource::Output(op) => *op,
        };
        let name = match self.registry.operation(producer) {
            Some(operation) => operation.name.clone(),
            None => return Err(FetchError::OperationRemoved(producer)),
        };
        if visiting.contains(&producer) {
            return Err(FetchError::Cycle(producer));
        }

        self.evaluate(producer, visiting).map_err(|e| match e {
            EngineError::Fetch(cycle @ FetchError::Cycle(_)) => cycle,
            other => FetchError::Upstream { operation: name, reason: other.to_string() },
        })
    }

    /// Fetches every input of `op` with `op` marked as in progress.
    fn fetch_inputs(&mut self, op: OperationId, visiting: &mut HashSet<OperationId>) -> Result<Vec<FetchedTerm>, EngineError> {
        let inputs = self.registry.operation(op).ok_or(EngineError::UnknownOperation(op))?.inputs.clone();
        visiting.insert(op);
        let fetched = inputs
            .into_iter()
            .map(|value| {
                let name = self.registry.value(value).map_or_else(|| value.to_string(), |v| v.name.clone());
                let fetched = self.fetch_guarded(value, visiting);
                FetchedTerm { value, name, fetched }
            })
            .collect();
        visiting.remove(&op);
        Ok(fetched)
    }

    /// Revalidates `op` if it is stale.
    fn refresh(&mut self, op: OperationId, visiting: &mut HashSet<OperationId>) -> Result<(), EngineError> {
        let operation = self.registry.operation(op).ok_or(EngineError::UnknownOperation(op))?;
        if !operation.stale {
            return Ok(());
        }
        let kind = Arc::clone(operation.kind());
        let name = operation.name.clone();

        let fetched = self.fetch_inputs(op, visiting)?;
        let ctx = EvalContext { transformation: &self.id, operation: &name, config: &self.config };
        let problems = validate_operation(kind.as_ref(), &ctx, fetched);
        debug!(
            transformation = %self.id,
            operation = %name,
            errors = problems.errors().count(),
            total = problems.len(),
            "Validated operation"
        );

        if let Some(operation) = self.registry.operation_mut(op) {
            operation.problems = problems;
            operation.stale = false;
        }
        Ok(())
    }

    fn evaluate(&mut self, op: OperationId, visiting: &mut HashSet<OperationId>) -> Result<Datum, EngineError> {
        self.refresh(op, visiting)?;
        let operation = self.registry.operation(op).ok_or(EngineError::UnknownOperation(op))?;
        if operation.problems.is_error() {
            return Err(EngineError::NotReady { operation: operation.name.clone(), problems: operation.problems.clone() });
        }
        if let Some(datum) = self.ledger.get(op) {
            trace!(transformation = %self.id, operation = %operation.name, "Cache hit");
            return Ok(datum.clone());
        }
        let kind = Arc::clone(operation.kind());
        let name = operation.name.clone();

        let mut terms = Vec::new();
        for term in self.fetch_inputs(op, visiting)? {
            terms.push(Term { value: term.value, name: term.name, datum: term.fetched? });
        }
        let ctx = EvalContext { transformation: &self.id, operation: &name, config: &self.config };
        let datum = kind.calculate(&terms, &ctx)?;
        debug!(transformation = %self.id, operation = %name, result = %datum, "Calculated");

        self.ledger.insert(op, datum.clone());
        Ok(datum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::ComputationError;
    use crate::config::{AveragePolicy, NegativeRootPolicy};
    use crate::operation::average::Average;
    use crate::operation::basic::{Add, Divide};
    use crate::operation::descriptor::{Category, ValueDescriptor};
    use crate::operation::mode::Mode;
    use crate::operation::power::Power;
    use crate::operation::sign::Sign;
    use crate::operation::square_root::SquareRoot;
    use crate::operation::OperationCatalog;
    use crate::store::{Number, ValueType};
    use crate::validation::Severity;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn literals(t: &mut Transformation, values: Vec<Datum>) -> Vec<ValueId> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, d)| t.add_literal(format!("lit{}", i), d).unwrap())
            .collect()
    }

    fn ints(values: &[i64]) -> Vec<Datum> {
        values.iter().map(|v| Datum::from(*v)).collect()
    }

    static CALCULATIONS: AtomicUsize = AtomicUsize::new(0);

    const COUNTING_INPUTS: [ValueDescriptor; 1] =
        [ValueDescriptor::at_least("counting.term", "Term", "", ValueType::Number, 1)];

    static COUNTING: OperationDescriptor = OperationDescriptor {
        id: "counting",
        name: "Counting",
        description: "Counts its own calculations",
        abbreviation: "count",
        categories: &[Category::Arithmetic],
        inputs: &COUNTING_INPUTS,
        output: ValueType::Number,
        unique_inputs: true,
    };

    #[derive(Debug)]
    struct Counting;

    impl OperationKind for Counting {
        fn descriptor(&self) -> &OperationDescriptor {
            &COUNTING
        }

        fn calculate(&self, terms: &[Term], _ctx: &EvalContext<'_>) -> Result<Datum, ComputationError> {
            CALCULATIONS.fetch_add(1, Ordering::SeqCst);
            Ok(Datum::from(terms.len() as i64))
        }
    }

    #[test]
    fn test_new_operation_is_invalid() {
        let mut t = Transformation::new("t");
        let op = t.add_operation("avg", Average).unwrap();

        assert_eq!(t.state(op).unwrap(), OperationState::Constructed);
        let problems = t.problems(op).unwrap();
        assert!(problems.is_error());
        assert_eq!(problems.len(), 1);
        assert!(problems.contains_key(MessageKey::HasNoTerms));
        let problem = problems.iter().next().unwrap();
        assert_eq!(problem.owner(), "t/avg");
        assert_eq!(problem.to_string(), "error: Operation 'avg' in transformation 't' has no terms");

        let err = t.get(op).unwrap_err();
        assert!(matches!(err, EngineError::NotReady { ref operation, .. } if operation == "avg"));
        assert!(err.problems().is_some_and(|p| p.contains_key(MessageKey::HasNoTerms)));
    }

    #[test]
    fn test_calculates_once_between_mutations() {
        let mut t = Transformation::new("t");
        let op = t.add_operation("count", Counting).unwrap();
        let lits = literals(&mut t, ints(&[1, 2, 3]));
        t.add_input(op, &lits[..2]).unwrap();
        assert_eq!(t.state(op).unwrap(), OperationState::ValidUncomputed);

        let before = CALCULATIONS.load(Ordering::SeqCst);
        assert_eq!(t.get(op).unwrap(), Datum::from(2));
        assert_eq!(t.get(op).unwrap(), Datum::from(2));
        assert_eq!(t.state(op).unwrap(), OperationState::ValidComputed);
        assert_eq!(CALCULATIONS.load(Ordering::SeqCst) - before, 1);

        t.add_input(op, &lits[2..]).unwrap();
        assert_eq!(t.state(op).unwrap(), OperationState::ValidUncomputed);
        assert_eq!(t.get(op).unwrap(), Datum::from(3));
        assert_eq!(CALCULATIONS.load(Ordering::SeqCst) - before, 2);

        t.remove_input(op, &lits[..1]).unwrap();
        assert_eq!(t.get(op).unwrap(), Datum::from(2));
        assert_eq!(CALCULATIONS.load(Ordering::SeqCst) - before, 3);
    }

    #[test]
    fn test_get_succeeds_iff_no_errors() {
        let mut t = Transformation::new("t");
        let op = t.add_operation("pow", Power).unwrap();
        let lits = literals(&mut t, ints(&[2, 3, 4]));

        t.add_input(op, &lits).unwrap();
        let problems = t.problems(op).unwrap().clone();
        assert_eq!(problems.len(), 1);
        assert!(problems.contains_key(MessageKey::InvalidTermCount));
        assert_eq!(t.state(op).unwrap(), OperationState::Invalid);
        assert!(matches!(t.get(op), Err(EngineError::NotReady { .. })));

        t.remove_input(op, &lits[2..]).unwrap();
        assert!(t.problems(op).unwrap().is_ok());
        assert_eq!(t.get(op).unwrap(), Datum::from(8.0));
    }

    #[rstest]
    #[case(&[1, 1, 2, 3, 2, 1, 4], &[1])]
    #[case(&[1, 1, 2, 2], &[1, 2])]
    #[case(&[1, 2, 3], &[])]
    fn test_mode_scenarios(#[case] input: &[i64], #[case] expected: &[i64]) {
        let mut t = Transformation::new("t");
        let op = t.add_operation("mode", Mode).unwrap();
        let lits = literals(&mut t, ints(input));
        t.add_input(op, &lits).unwrap();
        assert_eq!(t.get(op).unwrap(), Datum::List(ints(expected)));
    }

    #[test]
    fn test_mode_of_single_term_warns_but_computes() {
        let mut t = Transformation::new("t");
        let op = t.add_operation("mode", Mode).unwrap();
        let lits = literals(&mut t, ints(&[5]));
        t.add_input(op, &lits).unwrap();

        let problems = t.problems(op).unwrap();
        assert!(problems.is_ok());
        assert_eq!(problems.count(Severity::Warning), 1);
        assert_eq!(t.get(op).unwrap(), Datum::List(vec![]));
    }

    #[rstest]
    #[case(AveragePolicy::Promote, vec![Datum::from(1), Datum::from(2)], Datum::from(1))]
    #[case(AveragePolicy::AlwaysFloat, vec![Datum::from(1), Datum::from(2)], Datum::from(1.5))]
    #[case(AveragePolicy::Promote, vec![Datum::from(1), Datum::from(3.0)], Datum::from(2.0))]
    fn test_average_scenarios(#[case] policy: AveragePolicy, #[case] values: Vec<Datum>, #[case] expected: Datum) {
        let config = EngineConfig { average: policy, ..Default::default() };
        let mut t = Transformation::with_config("t", config);
        let op = t.add_operation("avg", Average).unwrap();
        let lits = literals(&mut t, values);
        t.add_input(op, &lits).unwrap();
        assert_eq!(t.get(op).unwrap(), expected);
    }

    #[rstest]
    #[case(Datum::from(5), 1)]
    #[case(Datum::from(0), 0)]
    #[case(Datum::from(-3.2), -1)]
    fn test_sign_scenarios(#[case] datum: Datum, #[case] expected: i64) {
        let mut t = Transformation::new("t");
        let op = t.add_operation("sign", Sign).unwrap();
        let x = t.add_literal("x", datum).unwrap();
        t.add_input(op, &[x]).unwrap();
        assert_eq!(t.get(op).unwrap(), Datum::from(expected));
    }

    #[test]
    fn test_power_of_floats() {
        let mut t = Transformation::new("t");
        let op = t.add_operation("pow", Power).unwrap();
        let lits = literals(&mut t, vec![Datum::from(2.0), Datum::from(10.0)]);
        t.add_input(op, &lits).unwrap();
        assert_eq!(t.get(op).unwrap(), Datum::from(1024.0));
    }

    #[rstest]
    #[case(Arc::new(Average), vec![Datum::from(1), Datum::from(2), Datum::from("three")])]
    #[case(Arc::new(Power), vec![Datum::from(1), Datum::from("one")])]
    #[case(Arc::new(Sign), vec![Datum::from("one")])]
    #[case(Arc::new(SquareRoot), vec![Datum::from("one")])]
    #[case(Arc::new(Mode), vec![Datum::from(1), Datum::from(1), Datum::from("one")])]
    fn test_non_numeric_term_is_a_single_type_error(
        #[case] kind: Arc<dyn OperationKind>,
        #[case] values: Vec<Datum>,
    ) {
        let mut t = Transformation::new("t");
        let op = t.add_shared_operation("op", kind).unwrap();
        let lits = literals(&mut t, values);
        t.add_input(op, &lits).unwrap();

        let problems = t.problems(op).unwrap();
        assert!(problems.is_error());
        assert_eq!(problems.len(), 1);
        assert!(problems.contains_key(MessageKey::InvalidTermType));
        assert_eq!(t.state(op).unwrap(), OperationState::Invalid);
        assert!(matches!(t.get(op), Err(EngineError::NotReady { .. })));
    }

    #[rstest]
    #[case(NegativeRootPolicy::NotANumber, true)]
    #[case(NegativeRootPolicy::Reject, false)]
    fn test_negative_square_root_policy(#[case] policy: NegativeRootPolicy, #[case] computes: bool) {
        let config = EngineConfig { negative_square_root: policy, ..Default::default() };
        let mut t = Transformation::with_config("t", config);
        let op = t.add_operation("sqrt", SquareRoot).unwrap();
        let x = t.add_literal("x", -4).unwrap();
        t.add_input(op, &[x]).unwrap();

        match t.get(op) {
            Ok(Datum::Number(Number::Float(f))) => assert!(computes && f.is_nan()),
            Err(EngineError::NotReady { problems, .. }) => {
                assert!(!computes);
                assert_eq!(problems.len(), 1);
                assert!(problems.contains_key(MessageKey::NegativeSquareRoot));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_set_config_invalidates() {
        let mut t = Transformation::new("t");
        let op = t.add_operation("avg", Average).unwrap();
        let lits = literals(&mut t, ints(&[1, 2]));
        t.add_input(op, &lits).unwrap();
        assert_eq!(t.get(op).unwrap(), Datum::from(1));

        t.set_config(EngineConfig { average: AveragePolicy::AlwaysFloat, ..Default::default() });
        assert_eq!(t.get(op).unwrap(), Datum::from(1.5));
    }

    #[test]
    fn test_duplicate_inputs_are_rejected_atomically() {
        let mut t = Transformation::new("t");
        let op = t.add_operation("avg", Average).unwrap();
        let lits = literals(&mut t, ints(&[1, 2]));
        t.add_input(op, &lits[..1]).unwrap();

        let err = t.add_input(op, &[lits[1], lits[0]]).unwrap_err();
        assert_eq!(err, EngineError::DuplicateInput { operation: "avg".into(), value: lits[0] });
        assert_eq!(t.inputs(op).unwrap(), &lits[..1]);

        let err = t.add_input(op, &[lits[1], lits[1]]).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateInput { .. }));
        assert_eq!(t.inputs(op).unwrap().len(), 1);

        let err = t.add_input(op, &[ValueId::new(99)]).unwrap_err();
        assert_eq!(err, EngineError::UnknownValue(ValueId::new(99)));
    }

    #[test]
    fn test_non_unique_kinds_accept_repeats() {
        let mut t = Transformation::new("t");
        let op = t.add_operation("add", Add).unwrap();
        let x = t.add_literal("x", 4).unwrap();
        t.add_input(op, &[x, x]).unwrap();
        assert_eq!(t.get(op).unwrap(), Datum::from(8));
    }

    #[test]
    fn test_remove_missing_input_is_atomic() {
        let mut t = Transformation::new("t");
        let op = t.add_operation("avg", Average).unwrap();
        let lits = literals(&mut t, ints(&[1, 2]));
        t.add_input(op, &lits[..1]).unwrap();

        let err = t.remove_input(op, &[lits[0], lits[1]]).unwrap_err();
        assert_eq!(err, EngineError::InputNotFound { operation: "avg".into(), value: lits[1] });
        assert_eq!(t.inputs(op).unwrap(), &lits[..1]);
    }

    #[test]
    fn test_identifiers_are_unique() {
        let mut t = Transformation::new("t");
        t.add_literal("x", 1).unwrap();
        assert_eq!(t.add_operation("x", Average), Err(EngineError::DuplicateIdentifier("x".into())));
        let op = t.add_operation("avg", Average).unwrap();

        let first = t.expose_output(op, None).unwrap();
        let second = t.expose_output(op, None).unwrap();
        assert_eq!(t.value(first).map(|v| v.name.as_str()), Some("avg.result"));
        assert_eq!(t.value(second).map(|v| v.name.as_str()), Some("avg.result_1"));
        assert_eq!(t.expose_output(op, Some("x")), Err(EngineError::DuplicateIdentifier("x".into())));
        assert_eq!(t.value_named("avg.result").map(|v| v.id), Some(first));
        assert_eq!(t.operation_named("avg").map(|o| o.id), Some(op));
    }

    #[test]
    fn test_input_lookup_by_name() {
        let mut t = Transformation::new("t");
        let op = t.add_operation("pow", Power).unwrap();
        let base = t.add_literal("base", 2).unwrap();
        let exponent = t.add_literal("exponent", 3).unwrap();
        let unused = t.add_literal("unused", 4).unwrap();
        t.add_input(op, &[base, exponent]).unwrap();

        assert_eq!(t.input_named(op, "exponent").map(|v| v.id), Some(exponent));
        assert!(t.input_named(op, "unused").is_none());
        assert!(t.input_named(OperationId::new(42), "base").is_none());

        t.remove_value(base).unwrap();
        assert!(t.input_named(op, "base").is_none());
        assert_eq!(t.value(unused).map(|v| v.name.as_str()), Some("unused"));
    }

    #[test]
    fn test_upstream_change_invalidates_downstream() {
        let mut t = Transformation::new("t");
        let lits = literals(&mut t, ints(&[2, 4]));
        let avg = t.add_operation("avg", Average).unwrap();
        t.add_input(avg, &lits).unwrap();
        let avg_out = t.expose_output(avg, None).unwrap();
        assert_eq!(t.value(avg_out).map(|v| v.value_type), Some(ValueType::Number));

        let ten = t.add_literal("ten", 10).unwrap();
        let add = t.add_operation("add", Add).unwrap();
        t.add_input(add, &[avg_out, ten]).unwrap();
        assert_eq!(t.get(add).unwrap(), Datum::from(13));
        assert_eq!(t.state(avg).unwrap(), OperationState::ValidComputed);

        t.update_literal(lits[1], 8).unwrap();
        assert!(t.cached(avg).is_none());
        assert!(t.cached(add).is_none());
        assert_eq!(t.state(add).unwrap(), OperationState::ValidUncomputed);
        assert_eq!(t.get(add).unwrap(), Datum::from(15));

        t.update_literal(lits[1], "eight").unwrap();
        let problems = t.problems(add).unwrap();
        assert_eq!(problems.len(), 1);
        assert!(problems.contains_key(MessageKey::OperationValidationError));
        assert!(t.get(add).is_err());

        assert_eq!(t.update_literal(avg_out, 1), Err(EngineError::NotALiteral(avg_out)));
    }

    #[test]
    fn test_removed_members_fail_to_fetch() {
        let mut t = Transformation::new("t");
        let x = t.add_literal("x", 9).unwrap();
        let sqrt = t.add_operation("sqrt", SquareRoot).unwrap();
        t.add_input(sqrt, &[x]).unwrap();
        let out = t.expose_output(sqrt, Some("root")).unwrap();
        let sign = t.add_operation("sign", Sign).unwrap();
        t.add_input(sign, &[out]).unwrap();
        assert_eq!(t.fetch(out), Ok(Datum::from(3.0)));
        assert_eq!(t.get(sign).unwrap(), Datum::from(1));

        t.remove_operation(sqrt).unwrap();
        assert_eq!(t.fetch(out), Err(FetchError::OperationRemoved(sqrt)));
        assert!(t.problems(sign).unwrap().contains_key(MessageKey::OperationValidationError));
        assert_eq!(t.get(sqrt), Err(EngineError::UnknownOperation(sqrt)));

        t.remove_value(out).unwrap();
        assert_eq!(t.fetch(out), Err(FetchError::UnknownValue(out)));
        assert_eq!(t.state(sign).unwrap(), OperationState::Invalid);
    }

    #[test]
    fn test_upstream_errors_surface_as_fetch_problems() {
        let mut t = Transformation::new("t");
        let lits = literals(&mut t, ints(&[1, 0]));
        let div = t.add_operation("div", Divide).unwrap();
        t.add_input(div, &lits).unwrap();
        let out = t.expose_output(div, None).unwrap();
        let sign = t.add_operation("sign", Sign).unwrap();
        t.add_input(sign, &[out]).unwrap();

        assert!(t.problems(div).unwrap().contains_key(MessageKey::DivideByZero));
        assert!(matches!(t.fetch(out), Err(FetchError::Upstream { ref operation, .. }) if operation == "div"));
        assert!(t.problems(sign).unwrap().is_error());

        t.update_literal(lits[1], 4).unwrap();
        assert_eq!(t.get(sign).unwrap(), Datum::from(1));
    }

    #[test]
    fn test_cycles_are_reported_not_followed() {
        let mut t = Transformation::new("t");
        let a = t.add_operation("a", Add).unwrap();
        let b = t.add_operation("b", Add).unwrap();
        let a_out = t.expose_output(a, None).unwrap();
        let b_out = t.expose_output(b, None).unwrap();
        t.add_input(b, &[a_out]).unwrap();
        t.add_input(a, &[b_out]).unwrap();

        assert!(t.problems(a).unwrap().is_error());
        assert!(t.get(b).is_err());
        assert_eq!(t.evaluation_order(), Err(EngineError::CyclicDependency(vec!["a".into(), "b".into()])));
        assert_eq!(
            t.evaluation_order().unwrap_err().to_string(),
            "Dependency cycle through operations a, b"
        );
        assert!(t.evaluate_all().is_err());

        let all = t.problems_all();
        let first = all.iter().next().unwrap();
        assert_eq!(first.key(), MessageKey::CyclicDependency);
        assert_eq!(first.owner(), "t");
        assert_eq!(first.args(), ["t", "a, b"]);
    }

    #[test]
    fn test_evaluate_all_in_dependency_order() {
        let catalog = OperationCatalog::builtin();
        let mut t = Transformation::new("t");
        let lits = literals(&mut t, ints(&[3, 5]));
        let mult = t.add_shared_operation("product", catalog.get("*").unwrap()).unwrap();
        let add = t.add_shared_operation("sum", catalog.get("add").unwrap()).unwrap();
        let mult_out = t.expose_output(mult, None).unwrap();
        t.add_input(add, &[mult_out, lits[0]]).unwrap();
        t.add_input(mult, &lits).unwrap();

        assert_eq!(t.evaluation_order().unwrap(), vec![mult, add]);
        let results = t.evaluate_all().unwrap();
        assert_eq!(results, vec![(mult, Ok(Datum::from(15))), (add, Ok(Datum::from(18)))]);
        assert_eq!(t.descriptor(add).unwrap().id, "add");
    }
}
