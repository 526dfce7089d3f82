//! Per-column filter state.
//!
//! Filter definitions are author-supplied and immutable for the table's
//! lifetime; only the values move. A value key is present in the map only
//! once the user has interacted with that filter, and an absent key reads as
//! the empty string, so "never touched" and "cleared" are indistinguishable,
//! which is exactly the invariant the query layer wants.

use std::collections::HashMap;

use ustr::Ustr;

/// One option of a select filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKind {
    Text,
    Select { options: Vec<SelectOption> },
    NumberRange,
    DateRange,
}

/// The query key(s) a filter writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKeys {
    Single(Ustr),
    Range { low: Ustr, high: Ustr },
}

/// Definition of one column filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDef {
    pub column_id: Ustr,
    pub label: String,
    pub kind: FilterKind,
    /// Explicit query key; defaults to `column_id`. Range kinds derive their
    /// two keys from this base (`<base>:min`/`<base>:max` for numbers,
    /// `<base>:from`/`<base>:to` for dates).
    pub query_key: Option<Ustr>,
}

impl FilterDef {
    pub fn text(column_id: &str, label: impl Into<String>) -> Self {
        Self::new(column_id, label, FilterKind::Text)
    }

    pub fn select(column_id: &str, label: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self::new(column_id, label, FilterKind::Select { options })
    }

    pub fn number_range(column_id: &str, label: impl Into<String>) -> Self {
        Self::new(column_id, label, FilterKind::NumberRange)
    }

    pub fn date_range(column_id: &str, label: impl Into<String>) -> Self {
        Self::new(column_id, label, FilterKind::DateRange)
    }

    fn new(column_id: &str, label: impl Into<String>, kind: FilterKind) -> Self {
        Self {
            column_id: Ustr::from(column_id),
            label: label.into(),
            kind,
            query_key: None,
        }
    }

    pub fn with_query_key(mut self, key: &str) -> Self {
        self.query_key = Some(Ustr::from(key));
        self
    }

    /// The resolved key(s) this filter writes.
    pub fn keys(&self) -> FilterKeys {
        let base = self.query_key.unwrap_or(self.column_id);
        match self.kind {
            FilterKind::Text | FilterKind::Select { .. } => FilterKeys::Single(base),
            FilterKind::NumberRange => FilterKeys::Range {
                low: Ustr::from(&format!("{base}:min")),
                high: Ustr::from(&format!("{base}:max")),
            },
            FilterKind::DateRange => FilterKeys::Range {
                low: Ustr::from(&format!("{base}:from")),
                high: Ustr::from(&format!("{base}:to")),
            },
        }
    }
}

/// The value map for a table's filters.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    defs: Vec<FilterDef>,
    values: HashMap<Ustr, String>,
}

impl FilterSet {
    pub fn new(defs: Vec<FilterDef>) -> Self {
        Self {
            defs,
            values: HashMap::new(),
        }
    }

    pub fn defs(&self) -> &[FilterDef] {
        &self.defs
    }

    pub fn def_for_column(&self, column_id: Ustr) -> Option<&FilterDef> {
        self.defs.iter().find(|def| def.column_id == column_id)
    }

    /// Current value for `key`; absent keys read as empty.
    pub fn value(&self, key: Ustr) -> &str {
        self.values.get(&key).map_or("", String::as_str)
    }

    /// Records an interaction with `key`. Returns `true` when the effective
    /// value changed.
    pub fn set(&mut self, key: Ustr, value: impl Into<String>) -> bool {
        let value = value.into();
        let changed = self.value(key) != value;
        self.values.insert(key, value);
        changed
    }

    /// The query contribution: trimmed, non-empty values keyed by resolved
    /// key, in definition order.
    pub fn extra_filters(&self) -> Vec<(Ustr, String)> {
        let mut out = Vec::new();
        for def in &self.defs {
            match def.keys() {
                FilterKeys::Single(key) => self.push_if_set(&mut out, key),
                FilterKeys::Range { low, high } => {
                    self.push_if_set(&mut out, low);
                    self.push_if_set(&mut out, high);
                }
            }
        }
        out
    }

    fn push_if_set(&self, out: &mut Vec<(Ustr, String)>, key: Ustr) {
        let trimmed = self.value(key).trim();
        if !trimmed.is_empty() {
            out.push((key, trimmed.to_owned()));
        }
    }

    /// Whether any filter currently contributes to the query.
    pub fn is_active(&self) -> bool {
        self.values.values().any(|value| !value.trim().is_empty())
    }

    /// Sets every known key to the empty string.
    pub fn reset(&mut self) {
        for def in &self.defs {
            match def.keys() {
                FilterKeys::Single(key) => {
                    self.values.insert(key, String::new());
                }
                FilterKeys::Range { low, high } => {
                    self.values.insert(low, String::new());
                    self.values.insert(high, String::new());
                }
            }
        }
    }
}
