use crate::store::{OperationId, ValueId, ValueSource};
use crate::transformation::Transformation;
use std::collections::HashMap;
use std::fmt::Write;

/// Renders the term tree of `target` as an indented audit trace.
///
/// Only cached results and the most recent problems are shown; nothing is
/// validated or calculated, so call `get` or `problems` first for a current view.
pub fn format_trace(transformation: &Transformation, target: OperationId) -> String {
    let mut tracer = Tracer { transformation, visited_at_level: HashMap::new(), output: String::new() };

    match transformation.operation(target) {
        Some(op) => {
            let _ = writeln!(tracer.output, "AUDIT TRACE for operation '{}':", op.name);
            let _ = writeln!(tracer.output, "--------------------------------------------------");
            tracer.trace_operation(target, 1, "");
        }
        None => {
            let _ = writeln!(tracer.output, "Error: Invalid Operation ID {}", target);
        }
    }
    tracer.output
}

struct Tracer<'a> {
    transformation: &'a Transformation,
    visited_at_level: HashMap<OperationId, usize>,
    output: String,
}

impl<'a> Tracer<'a> {
    fn trace_operation(&mut self, op_id: OperationId, level: usize, prefix: &str) {
        if let Some(&first_seen) = self.visited_at_level.get(&op_id) {
            let _ = writeln!(self.output, "{}-> (Ref to L{})", prefix, first_seen);
            return;
        }
        self.visited_at_level.insert(op_id, level);

        let Some(op) = self.transformation.operation(op_id) else {
            let _ = writeln!(self.output, "{}[L{}] {} (removed)", prefix, level, op_id);
            return;
        };

        let terms: Vec<String> = op.inputs().iter().map(|v| self.value_name(*v)).collect();
        let _ = writeln!(
            self.output,
            "{}[L{}] {}{} = {}({})",
            prefix,
            level,
            op.name,
            self.format_result(op_id),
            op.descriptor().abbreviation,
            terms.join(", ")
        );

        let stem = self.build_child_stem(prefix);
        for problem in op.last_problems() {
            let _ = writeln!(self.output, "{}!  {}", stem, problem);
        }

        let inputs = op.inputs().to_vec();
        for (i, &value) in inputs.iter().enumerate() {
            let connector = if i == inputs.len() - 1 { "`--" } else { "|--" };
            self.trace_value(value, level + 1, &format!("{}{}", stem, connector));
        }
    }

    fn trace_value(&mut self, value_id: ValueId, level: usize, prefix: &str) {
        let Some(value) = self.transformation.value(value_id) else {
            let _ = writeln!(self.output, "{}[L{}] {} (removed)", prefix, level, value_id);
            return;
        };

        match &value.source {
            ValueSource::Literal(datum) => {
                let _ = writeln!(self.output, "{}[L{}] {} -> Literal({})", prefix, level, value.name, datum);
            }
            ValueSource::Output(producer) => {
                let producer = *producer;
                let _ = writeln!(
                    self.output,
                    "{}[L{}] {}{} <- output",
                    prefix,
                    level,
                    value.name,
                    self.format_result(producer)
                );
                let child_prefix = format!("{}`--", self.build_child_stem(prefix));
                self.trace_operation(producer, level + 1, &child_prefix);
            }
        }
    }

    fn value_name(&self, id: ValueId) -> String {
        self.transformation.value(id).map_or_else(|| id.to_string(), |v| v.name.clone())
    }

    fn format_result(&self, op: OperationId) -> String {
        match (self.transformation.cached(op), self.transformation.operation(op)) {
            (Some(datum), _) => format!("[{}]", datum),
            (None, Some(o)) if o.last_problems().is_error() => "[Err]".to_string(),
            _ => "[?]".to_string(),
        }
    }

    fn build_child_stem(&self, current_prefix: &str) -> String {
        current_prefix.replace("`--", "   ").replace("|--", "|  ")
    }
}
