//! Structured combat log.
//!
//! Entries carry a kind, a message template with `{placeholder}` slots and the
//! numbers/names needed to fill them. Rendering and colouring belong to the
//! presentation layer; [`LogEntry::render`] is only a plain-text fallback.

use std::borrow::Cow;

use sha2::{Digest, Sha256};
use strum::{Display, EnumIter, IntoStaticStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum LogKind {
    Action,
    Damage,
    Heal,
    Status,
    Phase,
    /// Authoring or fallback problems; not part of gameplay.
    Diagnostic,
}

/// Structured payload of an entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LogData {
    pub actor: Option<String>,
    pub target: Option<String>,
    pub technique: Option<String>,
    pub amount: Option<i64>,
    pub remaining: Option<u32>,
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub kind: LogKind,
    pub template: Cow<'static, str>,
    pub data: LogData,
}

impl LogEntry {
    pub fn new(kind: LogKind, template: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            template: template.into(),
            data: LogData::default(),
        }
    }

    pub fn action(template: &'static str) -> Self {
        Self::new(LogKind::Action, template)
    }

    pub fn damage(template: &'static str) -> Self {
        Self::new(LogKind::Damage, template)
    }

    pub fn heal(template: &'static str) -> Self {
        Self::new(LogKind::Heal, template)
    }

    pub fn status(template: &'static str) -> Self {
        Self::new(LogKind::Status, template)
    }

    pub fn phase(template: &'static str) -> Self {
        Self::new(LogKind::Phase, template)
    }

    /// Diagnostic entries carry a free-form message in `label`.
    pub fn diagnostic(message: impl Into<String>) -> Self {
        Self::new(LogKind::Diagnostic, "{label}").label(message)
    }

    pub fn actor(mut self, name: impl Into<String>) -> Self {
        self.data.actor = Some(name.into());
        self
    }

    pub fn target(mut self, name: impl Into<String>) -> Self {
        self.data.target = Some(name.into());
        self
    }

    pub fn technique(mut self, name: impl Into<String>) -> Self {
        self.data.technique = Some(name.into());
        self
    }

    pub fn amount(mut self, amount: impl Into<i64>) -> Self {
        self.data.amount = Some(amount.into());
        self
    }

    pub fn remaining(mut self, remaining: u32) -> Self {
        self.data.remaining = Some(remaining);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.data.label = Some(label.into());
        self
    }

    pub fn is_diagnostic(&self) -> bool {
        self.kind == LogKind::Diagnostic
    }

    /// Fills the template. Missing values render as `?`.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.template.len() + 16);
        let mut rest = self.template.as_ref();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                out.push_str(&rest[open..]);
                return out;
            };
            let key = &after[..close];
            match self.slot(key) {
                Some(value) => out.push_str(&value),
                None => out.push('?'),
            }
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        out
    }

    fn slot(&self, key: &str) -> Option<String> {
        let d = &self.data;
        match key {
            "actor" => d.actor.clone(),
            "target" => d.target.clone(),
            "technique" => d.technique.clone(),
            "amount" => d.amount.map(|v| v.to_string()),
            "remaining" => d.remaining.map(|v| v.to_string()),
            "label" => d.label.clone(),
            _ => None,
        }
    }

    fn write_canonical(&self, hasher: &mut Sha256) {
        fn field(hasher: &mut Sha256, value: Option<&[u8]>) {
            match value {
                Some(bytes) => {
                    hasher.update([1]);
                    hasher.update((bytes.len() as u64).to_le_bytes());
                    hasher.update(bytes);
                }
                None => hasher.update([0]),
            }
        }

        let kind: &'static str = self.kind.into();
        field(hasher, Some(kind.as_bytes()));
        field(hasher, Some(self.template.as_bytes()));
        field(hasher, self.data.actor.as_deref().map(str::as_bytes));
        field(hasher, self.data.target.as_deref().map(str::as_bytes));
        field(hasher, self.data.technique.as_deref().map(str::as_bytes));
        field(hasher, self.data.amount.map(i64::to_le_bytes).as_ref().map(|b| &b[..]));
        field(hasher, self.data.remaining.map(u32::to_le_bytes).as_ref().map(|b| &b[..]));
        field(hasher, self.data.label.as_deref().map(str::as_bytes));
    }
}

/// Ordered log of one encounter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatLog {
    entries: Vec<LogEntry>,
}

impl CombatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = LogEntry>) {
        self.entries.extend(entries);
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn gameplay(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(|e| !e.is_diagnostic())
    }

    pub fn diagnostics(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(|e| e.is_diagnostic())
    }

    /// SHA-256 over a length-prefixed encoding of every entry.
    pub fn digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update((self.entries.len() as u64).to_le_bytes());
        for entry in &self.entries {
            entry.write_canonical(&mut hasher);
        }
        hasher.finalize().into()
    }
}
