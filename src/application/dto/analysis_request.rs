use crate::compatibility::domain::{Component, Ecosystem};

/// AnalysisRequest - Internal request DTO for the analysis use cases
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// Components as handed over by the inventory parser
    pub components: Vec<Component>,
    /// Run the fast-path / registry verification after static resolution
    pub runtime: bool,
    /// Additionally run sandbox installs (implies `runtime`)
    pub sandbox: bool,
    /// Drop OS-level packages before analysis
    pub exclude_system: bool,
}

impl AnalysisRequest {
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            components,
            ..Default::default()
        }
    }

    pub fn with_runtime(mut self, runtime: bool) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn with_exclude_system(mut self, exclude_system: bool) -> Self {
        self.exclude_system = exclude_system;
        self
    }

    /// Components left after the `exclude_system` filter
    pub fn selected_components(&self) -> Vec<Component> {
        self.components
            .iter()
            .filter(|c| !(self.exclude_system && c.ecosystem() == Ecosystem::Os))
            .cloned()
            .collect()
    }
}
