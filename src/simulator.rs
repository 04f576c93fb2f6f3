//! Holds the current scenario and its last successfully computed outputs.
use crate::calculator::{CalculatorInputs, CalculatorOutputs, InputsUpdate, InvalidInput, compute};
use crate::parameters::CalculatorParameters;
use log::{debug, warn};

/// The state behind an interactive simulator.
///
/// Inputs are only ever changed through [`Simulator::apply`], which either replaces both inputs
/// and outputs or leaves them untouched, so a caller never sees outputs which don't correspond to
/// the current inputs.
#[derive(Debug, Clone)]
pub struct Simulator {
    params: CalculatorParameters,
    inputs: CalculatorInputs,
    outputs: CalculatorOutputs,
}

impl Simulator {
    /// Create a new simulator starting from the default scenario
    pub fn new(params: CalculatorParameters) -> Result<Self, InvalidInput> {
        let inputs = CalculatorInputs::default();
        let outputs = compute(&inputs, &params)?;
        Ok(Self {
            params,
            inputs,
            outputs,
        })
    }

    /// The current inputs
    pub fn inputs(&self) -> &CalculatorInputs {
        &self.inputs
    }

    /// The outputs for the current inputs
    pub fn outputs(&self) -> &CalculatorOutputs {
        &self.outputs
    }

    /// The parameters used for every computation
    pub fn parameters(&self) -> &CalculatorParameters {
        &self.params
    }

    /// Change some of the inputs and recompute.
    ///
    /// If the new inputs are invalid, the error is returned and the previous inputs and outputs
    /// are kept.
    pub fn apply(&mut self, update: &InputsUpdate) -> Result<&CalculatorOutputs, InvalidInput> {
        let inputs = self.inputs.with_update(update);
        match compute(&inputs, &self.params) {
            Ok(outputs) => {
                debug!("Recomputed outputs for {inputs:?}");
                self.inputs = inputs;
                self.outputs = outputs;
                Ok(&self.outputs)
            }
            Err(err) => {
                warn!("Ignoring input update: {err}");
                Err(err)
            }
        }
    }

    /// Return to the default scenario.
    ///
    /// As with [`Simulator::apply`], nothing changes if the default scenario can't be computed.
    pub fn reset(&mut self) -> Result<&CalculatorOutputs, InvalidInput> {
        let inputs = CalculatorInputs::default();
        let outputs = compute(&inputs, &self.params)?;
        self.inputs = inputs;
        self.outputs = outputs;
        Ok(&self.outputs)
    }
}
