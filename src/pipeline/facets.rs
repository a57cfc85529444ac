// src/pipeline/facets.rs

use std::borrow::Borrow;

use thiserror::Error;

use crate::domain::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetMode {
    Multi,
    Single,
}

/// Current choice for one facet. An empty multi selection and `Single(None)`
/// both mean "no constraint".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Multi(Vec<String>),
    Single(Option<String>),
}

impl Selection {
    fn unconstrained(mode: FacetMode) -> Self {
        match mode {
            FacetMode::Multi => Selection::Multi(Vec::new()),
            FacetMode::Single => Selection::Single(None),
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        match self {
            Selection::Multi(v) => v.is_empty(),
            Selection::Single(v) => v.is_none(),
        }
    }

    pub fn contains(&self, option: &str) -> bool {
        match self {
            Selection::Multi(v) => v.iter().any(|s| s == option),
            Selection::Single(v) => v.as_deref() == Some(option),
        }
    }

    /// Exact, case-sensitive match of an already trimmed value.
    pub fn accepts(&self, value: &str) -> bool {
        self.is_unconstrained() || self.contains(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetDefinition {
    pub field: String,
    /// Distinct, trimmed, non-empty; first-seen order.
    pub options: Vec<String>,
    pub selected: Selection,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FacetError {
    #[error("unknown filter '{0}'")]
    UnknownField(String),
    #[error("'{option}' is not an option of '{field}'")]
    UnknownOption { field: String, option: String },
    #[error("filters are {0:?}-select; that action is not available")]
    ModeMismatch(FacetMode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetSet {
    mode: FacetMode,
    facets: Vec<FacetDefinition>,
}

impl FacetSet {
    pub fn iter(&self) -> impl Iterator<Item = &FacetDefinition> {
        self.facets.iter()
    }

    pub fn get(&self, field: &str) -> Option<&FacetDefinition> {
        self.facets.iter().find(|f| f.field == field)
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    fn require(&self, mode: FacetMode) -> Result<(), FacetError> {
        if self.mode == mode {
            Ok(())
        } else {
            Err(FacetError::ModeMismatch(self.mode))
        }
    }

    fn facet_mut(&mut self, field: &str) -> Result<&mut FacetDefinition, FacetError> {
        self.facets
            .iter_mut()
            .find(|f| f.field == field)
            .ok_or_else(|| FacetError::UnknownField(field.to_string()))
    }

    fn known_option(facet: &FacetDefinition, option: &str) -> Result<(), FacetError> {
        if facet.options.iter().any(|o| o == option) {
            Ok(())
        } else {
            Err(FacetError::UnknownOption {
                field: facet.field.clone(),
                option: option.to_string(),
            })
        }
    }

    /// Adds the option if absent, removes it if present.
    pub fn toggle_option(&mut self, field: &str, option: &str) -> Result<(), FacetError> {
        self.require(FacetMode::Multi)?;
        let facet = self.facet_mut(field)?;
        Self::known_option(facet, option)?;

        if let Selection::Multi(selected) = &mut facet.selected {
            match selected.iter().position(|s| s == option) {
                Some(i) => {
                    selected.remove(i);
                }
                None => selected.push(option.to_string()),
            }
        }
        Ok(())
    }

    pub fn select_all(&mut self, field: &str) -> Result<(), FacetError> {
        self.require(FacetMode::Multi)?;
        let facet = self.facet_mut(field)?;
        facet.selected = Selection::Multi(facet.options.clone());
        Ok(())
    }

    pub fn clear_all(&mut self, field: &str) -> Result<(), FacetError> {
        self.require(FacetMode::Multi)?;
        let facet = self.facet_mut(field)?;
        facet.selected = Selection::Multi(Vec::new());
        Ok(())
    }

    /// Single-select: pick one option, or `None` to lift the constraint.
    pub fn set_selected(&mut self, field: &str, option: Option<&str>) -> Result<(), FacetError> {
        self.require(FacetMode::Single)?;
        let facet = self.facet_mut(field)?;
        if let Some(option) = option {
            Self::known_option(facet, option)?;
        }
        facet.selected = Selection::Single(option.map(str::to_string));
        Ok(())
    }

    pub fn is_unconstrained(&self) -> bool {
        self.facets.iter().all(|f| f.selected.is_unconstrained())
    }
}

/// Builds one facet per non-reserved field, in first-seen field order.
/// Runs once per dataset load.
pub fn extract_facets<R, F>(rows: &[R], mode: FacetMode, is_reserved: F) -> FacetSet
where
    R: Borrow<Record>,
    F: Fn(&str) -> bool,
{
    let mut facets: Vec<FacetDefinition> = Vec::new();

    for row in rows {
        let row: &Record = row.borrow();
        for (field, value) in row.fields() {
            if is_reserved(field) {
                continue;
            }

            let idx = match facets.iter().position(|f| f.field == field) {
                Some(i) => i,
                None => {
                    facets.push(FacetDefinition {
                        field: field.to_string(),
                        options: Vec::new(),
                        selected: Selection::unconstrained(mode),
                    });
                    facets.len() - 1
                }
            };

            let value = value.trim();
            let options = &mut facets[idx].options;
            if !value.is_empty() && !options.iter().any(|o| o == value) {
                options.push(value.to_string());
            }
        }
    }

    FacetSet { mode, facets }
}
