//! Apply context and provider traits
//!
//! The core stays free of terminal, sudo and progress-bar dependencies by
//! taking them through these traits. In particular, confirmation is an
//! injected capability rather than a blocking stdin read, so the
//! reconciliation logic is testable without a terminal.

use crate::types::{ApplyResult, CommandOutput};
use anyhow::Result;

/// Provider for elevated privilege operations
pub trait SudoProvider: Send + Sync {
    /// Run a command with elevated privileges
    fn run(&self, cmd: &str, args: &[&str]) -> Result<CommandOutput>;
}

/// Classifier deciding which resources run privileged
pub trait SudoClassifier: Send + Sync {
    fn requires_sudo(&self, resource_type: &str, resource_id: &str) -> bool;
}

/// Classifier that never requires privileges
pub struct NoSudo;

impl SudoClassifier for NoSudo {
    fn requires_sudo(&self, _resource_type: &str, _resource_id: &str) -> bool {
        false
    }
}

/// Progress callback for a reconciliation run
pub trait ProgressCallback {
    /// Called once before any resource is applied
    fn on_run_start(&mut self, count: usize);

    /// Called before a single resource apply
    fn on_resource_start(&mut self, id: &str, description: &str);

    /// Called after a single resource apply
    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult);

    /// Called after the last resource
    fn on_run_complete(&mut self);
}

/// Confirmation callback for interactive gates
pub trait ConfirmCallback {
    /// Ask whether to proceed; `false` is a normal skip, not an error
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_run_start(&mut self, _count: usize) {}
    fn on_resource_start(&mut self, _id: &str, _description: &str) {}
    fn on_resource_complete(&mut self, _id: &str, _result: &ApplyResult) {}
    fn on_run_complete(&mut self) {}
}

/// Always answers yes
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Always answers no
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Context passed to resource apply operations
pub struct ApplyContext<'a> {
    /// Whether this is a dry run (no actual changes)
    pub dry_run: bool,
    /// Whether to output verbose information
    pub verbose: bool,
    /// Optional provider for privileged operations
    pub sudo: Option<&'a dyn SudoProvider>,
}

impl<'a> ApplyContext<'a> {
    pub fn new(dry_run: bool, verbose: bool) -> Self {
        Self {
            dry_run,
            verbose,
            sudo: None,
        }
    }

    pub fn with_sudo(dry_run: bool, verbose: bool, sudo: &'a dyn SudoProvider) -> Self {
        Self {
            dry_run,
            verbose,
            sudo: Some(sudo),
        }
    }

    /// Get the sudo provider, or error if not available
    pub fn require_sudo(&self) -> Result<&dyn SudoProvider> {
        self.sudo
            .ok_or_else(|| anyhow::anyhow!("sudo required but not available"))
    }
}
