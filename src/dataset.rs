use serde::Deserialize;

use crate::{graph::FactorGraph, observation::FactorGraphObservation, ModelErr, Result};

/// The structured inputs, one factor graph per sample.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct FactorGraphFeatures {
    graphs: Vec<FactorGraph>,
}

impl FactorGraphFeatures {
    pub fn new(graphs: Vec<FactorGraph>) -> Self {
        Self { graphs }
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Returns the graph of sample `index`.
    pub fn sample(&self, index: usize) -> Result<&FactorGraph> {
        let len = self.graphs.len();
        self.graphs
            .get(index)
            .ok_or(ModelErr::SampleOutOfRange { index, len })
    }

    pub(crate) fn sample_mut(&mut self, index: usize) -> Result<&mut FactorGraph> {
        let len = self.graphs.len();
        self.graphs
            .get_mut(index)
            .ok_or(ModelErr::SampleOutOfRange { index, len })
    }
}

/// The ground truth outputs, one observation per sample.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct FactorGraphLabels {
    labels: Vec<FactorGraphObservation>,
}

impl FactorGraphLabels {
    pub fn new(labels: Vec<FactorGraphObservation>) -> Self {
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the ground truth of sample `index`.
    pub fn label(&self, index: usize) -> Result<&FactorGraphObservation> {
        let len = self.labels.len();
        self.labels
            .get(index)
            .ok_or(ModelErr::SampleOutOfRange { index, len })
    }
}
