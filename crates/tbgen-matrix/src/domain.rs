//! Declarative parameter domains.
//!
//! A [`Domain`] describes everything the builder needs to enumerate one component's
//! configurations: the axes to cross, constraints to filter by, an optional baseline, how test
//! cases select modes, and which file artifacts the configurations reference.

use crate::generic::GenericValue;

/// One name component / generic pair decided by an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Key used in the configuration name.
    pub key: &'static str,
    /// Generic bound on the design.
    pub generic: &'static str,
}

/// A set of legal rows for one or more fields that vary together.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub fields: Vec<Field>,
    pub rows: Vec<Vec<GenericValue>>,
}

impl Axis {
    pub fn scalar<V>(
        key: &'static str,
        generic: &'static str,
        values: impl IntoIterator<Item = V>,
    ) -> Self
    where
        V: Into<GenericValue>,
    {
        Self {
            fields: vec![Field { key, generic }],
            rows: values.into_iter().map(|v| vec![v.into()]).collect(),
        }
    }

    /// Two fields drawn as fixed pairs rather than crossed.
    pub fn pairs<A, B>(
        first: (&'static str, &'static str),
        second: (&'static str, &'static str),
        values: impl IntoIterator<Item = (A, B)>,
    ) -> Self
    where
        A: Into<GenericValue>,
        B: Into<GenericValue>,
    {
        Self {
            fields: vec![
                Field {
                    key: first.0,
                    generic: first.1,
                },
                Field {
                    key: second.0,
                    generic: second.1,
                },
            ],
            rows: values
                .into_iter()
                .map(|(a, b)| vec![a.into(), b.into()])
                .collect(),
        }
    }
}

/// Filters applied to every crossed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Keep only points where `output` is strictly less than `input`.
    StrictlyNarrowing {
        input: &'static str,
        output: &'static str,
    },
}

/// A fixed configuration emitted before the crossed points.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    pub name: &'static str,
    pub generics: Vec<(&'static str, GenericValue)>,
}

/// Test cases whose name starts with `prefix` are run in `mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeRule {
    pub prefix: &'static str,
    pub mode: &'static str,
}

/// Per-test-case mode selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modes {
    pub field: Field,
    pub rules: Vec<ModeRule>,
}

/// Files a configuration points at, generated before it is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifacts {
    None,
    /// One raw/reference pair per declared length for the point's data width, joined into a
    /// single `test_cfg` generic.
    FileReader {
        width_generic: &'static str,
        lengths: Vec<(i64, Vec<usize>)>,
    },
    /// The file compare fixture with its error variants.
    FileCompare { data_width: u32, length: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    pub entity: &'static str,
    pub seed_generic: &'static str,
    pub label: Option<&'static str>,
    pub baseline: Option<Baseline>,
    pub axes: Vec<Axis>,
    pub constraints: Vec<Constraint>,
    pub modes: Option<Modes>,
    pub artifacts: Artifacts,
}

impl Domain {
    pub fn new(entity: &'static str, seed_generic: &'static str) -> Self {
        Self {
            entity,
            seed_generic,
            label: None,
            baseline: None,
            axes: Vec::new(),
            constraints: Vec::new(),
            modes: None,
            artifacts: Artifacts::None,
        }
    }

    /// Fixed leading name component.
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn baseline(mut self, baseline: Baseline) -> Self {
        self.baseline = Some(baseline);
        self
    }

    pub fn axis(mut self, axis: Axis) -> Self {
        self.axes.push(axis);
        self
    }

    pub fn constrain(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn modes(mut self, modes: Modes) -> Self {
        self.modes = Some(modes);
        self
    }

    pub fn artifacts(mut self, artifacts: Artifacts) -> Self {
        self.artifacts = artifacts;
        self
    }
}
