/// Settings shared by the graph builder and the cycle validator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphConfig {
    /// Ask the metadata provider for components that were required but not declared
    pub expand_missing: bool,
    /// Log tolerable (purely delayed) cycles at info level
    pub report_tolerable_cycles: bool,
}
impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            expand_missing: true,
            report_tolerable_cycles: true,
        }
    }
}
impl GraphConfig {
    pub fn with_expand_missing(mut self, expand_missing: bool) -> Self {
        self.expand_missing = expand_missing;
        self
    }

    pub fn with_report_tolerable_cycles(mut self, report: bool) -> Self {
        self.report_tolerable_cycles = report;
        self
    }
}
