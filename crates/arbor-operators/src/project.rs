//! Project: reshape rows of one type into a declared output type.

use std::sync::Arc;

use arbor_core::prelude::{Error, Result as CoreResult, Row, RowType, Value};

use crate::stats::ExecStats;
use crate::traits::{OpError, OpState, Operator};

/// Rows of exactly `input_type` are rebuilt as `output_type` rows (same
/// hkey), pulling each output field by name; other rows pass through.
pub struct Project<'a> {
    input: Box<dyn Operator + 'a>,
    input_type: Arc<RowType>,
    output_type: Arc<RowType>,
    state: OpState,
}

impl<'a> Project<'a> {
    /// Fails at construction if any output field is missing from the input
    /// type's declared field list, or the output list repeats a field.
    pub fn new(
        input: Box<dyn Operator + 'a>,
        input_type: &Arc<RowType>,
        output_type: &Arc<RowType>,
    ) -> CoreResult<Self> {
        for (i, field) in output_type.value_fields().iter().enumerate() {
            if input_type.field_index(field).is_none() {
                return Err(Error::Field(format!(
                    "projection '{}': field '{}' not in '{}'",
                    output_type.name(),
                    field,
                    input_type.name()
                )));
            }
            if output_type.value_fields()[..i].contains(field) {
                return Err(Error::Field(format!(
                    "projection '{}': field '{}' listed twice",
                    output_type.name(),
                    field
                )));
            }
        }
        Ok(Self {
            input,
            input_type: Arc::clone(input_type),
            output_type: Arc::clone(output_type),
            state: OpState::default(),
        })
    }
}

impl<'a> Operator for Project<'a> {
    fn name(&self) -> &'static str {
        "project"
    }

    fn open(&mut self) -> Result<(), OpError> {
        self.state.check_unopened(self.name())?;
        self.input.open()?;
        self.state = OpState::Open;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Row>, OpError> {
        self.state.check_open(self.name())?;
        let Some(row) = self.input.next()? else {
            return Ok(None);
        };
        if row.rowtype().id() != self.input_type.id() {
            return Ok(Some(row));
        }
        let values: Vec<Value> = self
            .output_type
            .value_fields()
            .iter()
            .map(|f| {
                row.get(f)
                    .cloned()
                    .ok_or_else(|| OpError::Schema(format!("field '{}' absent from input row", f)))
            })
            .collect::<Result<_, _>>()?;
        Ok(Some(Row::with_hkey(
            &self.output_type,
            values,
            row.hkey().clone(),
        )))
    }

    fn close(&mut self) {
        self.input.close();
        self.state = OpState::Closed;
    }

    fn stats(&self) -> ExecStats {
        self.input.stats()
    }
}
