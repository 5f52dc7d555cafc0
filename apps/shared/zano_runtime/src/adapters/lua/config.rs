use std::time::Duration;

/// Execution limits for a Lua script
///
/// By default no limit is applied and a script that never returns stalls the
/// frame. With a call budget every call into the script (load, `init`,
/// `update`, [`call_function`](super::LuaScript::call_function)) is aborted with
/// a runtime error once it has run for longer than the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LuaScriptConfig {
    max_call_duration: Option<Duration>,
    instruction_interval: u32,
}

impl LuaScriptConfig {
    /// Default number of VM instructions between budget checks
    pub const DEFAULT_INSTRUCTION_INTERVAL: u32 = 1000;

    pub fn new() -> Self {
        Self {
            max_call_duration: None,
            instruction_interval: Self::DEFAULT_INSTRUCTION_INTERVAL,
        }
    }

    /// Abort any single script call running longer than `budget`
    pub fn with_max_call_duration(mut self, budget: Duration) -> Self {
        self.max_call_duration = Some(budget);
        self
    }

    /// Check the budget every `interval` VM instructions (clamped to at least 1)
    pub fn with_instruction_interval(mut self, interval: u32) -> Self {
        self.instruction_interval = interval.max(1);
        self
    }

    pub fn max_call_duration(&self) -> Option<Duration> {
        self.max_call_duration
    }

    pub fn instruction_interval(&self) -> u32 {
        self.instruction_interval
    }
}

impl Default for LuaScriptConfig {
    fn default() -> Self {
        Self::new()
    }
}
