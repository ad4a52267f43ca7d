//! Per-command body synthesis.
//!
//! For every command, in declaration order:
//!
//! 1. an override entry replaces the body outright;
//! 2. otherwise the command is classified, and acquisitions with an
//!    allocation plan get a lock-and-mint body;
//! 3. releases get a marker only, everything else a plain body with a
//!    default success return;
//! 4. every command, whatever happened above, is registered in the
//!    intercept table exactly once.

use crate::allocate::{AllocationPlan, SpecInconsistency, plan_allocation};
use crate::classify::classify;
use crate::error::GenerateError;
use crate::extensions::ExtensionTables;
use crate::guard::Guarded;
use crate::ir::{Command, Role};
use crate::model::SpecModel;
use crate::overrides::{OverrideEntry, OverrideTable, reads_extension_tables};
use std::borrow::Cow;
use std::collections::HashMap;

/// API prefix stripped from command names.
///
/// Fixed: the override bodies and loader exports call the stripped names.
pub const API_PREFIX: &str = "vk";

/// Body chosen for a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Hand-written override text.
    Literal(Cow<'static, str>),
    /// Declaration placeholder awaiting a hand-written body.
    DeclareOnly,
    /// Mint handles into the last parameter under the global lock.
    Acquire(AllocationPlan),
    /// Release marker; freeing is not inferred.
    Release,
    /// Neither acquisition nor release.
    Plain,
    /// The description contradicts the command's role; emitted as plain.
    Inconsistent(SpecInconsistency),
}

/// How a command's body was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Overridden,
    DeclareOnly,
    Synthesized,
}

/// An intercept-table row: API name → internal symbol.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Intercept {
    pub command: String,
    pub symbol: String,
}

/// An intercept row with the guard it is emitted under.
pub type InterceptRegistration = Guarded<Intercept>;

/// A command together with its synthesized body.
#[derive(Debug, Clone)]
pub struct SynthesizedCommand<'m> {
    pub command: &'m Command,
    /// Internal symbol (command name without the API prefix).
    pub symbol: String,
    /// Role, when the command went through classification.
    pub role: Option<Role>,
    pub body: Body,
    /// Effective guard after extension filtering.
    pub guard: Option<String>,
}

/// Everything the backends need to render command definitions.
#[derive(Debug, Clone, Default)]
pub struct Surface<'m> {
    pub commands: Vec<SynthesizedCommand<'m>>,
    pub intercepts: Vec<InterceptRegistration>,
}

/// Strip the API prefix to form the internal symbol name.
pub fn internal_symbol(name: &str) -> &str {
    name.strip_prefix(API_PREFIX)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(name)
}

/// Orchestrates overrides, classification and allocation planning.
///
/// Construction requires the extension tables: overrides such as the
/// extension enumerations read them, so they must exist first.
pub struct Synthesizer<'a> {
    model: &'a dyn SpecModel,
    overrides: &'a OverrideTable,
    tables: &'a ExtensionTables,
}

impl<'a> Synthesizer<'a> {
    pub fn new(
        model: &'a dyn SpecModel,
        overrides: &'a OverrideTable,
        tables: &'a ExtensionTables,
    ) -> Self {
        Self {
            model,
            overrides,
            tables,
        }
    }

    /// Synthesize every command of the model.
    pub fn synthesize(&self) -> Result<Surface<'a>, GenerateError> {
        let mut surface = Surface::default();
        let mut symbols: HashMap<String, &str> = HashMap::new();

        for command in self.model.list_commands() {
            let unit = self.synthesize_command(command);

            if let Some(first) = symbols.get(&unit.symbol) {
                if *first == command.name {
                    return Err(GenerateError::DuplicateCommand(command.name.clone()));
                }
                return Err(GenerateError::SymbolCollision {
                    symbol: unit.symbol.clone(),
                    first: first.to_string(),
                    second: command.name.clone(),
                });
            }
            symbols.insert(unit.symbol.clone(), command.name.as_str());

            surface.intercepts.push(Guarded::new(
                unit.guard.clone(),
                Intercept {
                    command: command.name.clone(),
                    symbol: unit.symbol.clone(),
                },
            ));
            surface.commands.push(unit);
        }

        tracing::info!(
            commands = surface.commands.len(),
            overridden = surface
                .commands
                .iter()
                .filter(|c| c.origin() == Origin::Overridden)
                .count(),
            "synthesized command surface"
        );
        Ok(surface)
    }

    /// Choose the body for one command.
    pub fn synthesize_command(&self, command: &'a Command) -> SynthesizedCommand<'a> {
        let symbol = internal_symbol(&command.name).to_string();
        let guard = self.tables.effective_guard(command).map(str::to_string);

        let (role, body) = match self.overrides.lookup(&command.name) {
            Some(OverrideEntry::Body(text)) => {
                if reads_extension_tables(&command.name) {
                    tracing::debug!(
                        command = %command.name,
                        instance = self.tables.instance.len(),
                        device = self.tables.device.len(),
                        "override reads extension tables"
                    );
                }
                (None, Body::Literal(text.clone()))
            }
            Some(OverrideEntry::DeclareOnly) => {
                tracing::debug!(command = %command.name, "declare-only override");
                (None, Body::DeclareOnly)
            }
            None => {
                let role = classify(command);
                (Some(role), self.synthesize_role(command, role))
            }
        };

        SynthesizedCommand {
            command,
            symbol,
            role,
            body,
            guard,
        }
    }

    fn synthesize_role(&self, command: &Command, role: Role) -> Body {
        match role {
            Role::Acquire => match plan_allocation(command, self.model) {
                Ok(Some(plan)) => Body::Acquire(plan),
                Ok(None) => Body::Plain,
                Err(inconsistency) => {
                    tracing::warn!(%inconsistency, "emitting plain body");
                    Body::Inconsistent(inconsistency)
                }
            },
            Role::Release => Body::Release,
            Role::Plain => Body::Plain,
        }
    }
}

impl SynthesizedCommand<'_> {
    pub fn origin(&self) -> Origin {
        match self.body {
            Body::Literal(_) => Origin::Overridden,
            Body::DeclareOnly => Origin::DeclareOnly,
            _ => Origin::Synthesized,
        }
    }
}
