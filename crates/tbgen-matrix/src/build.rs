//! The one routine that turns a [`Domain`] into configurations.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use tbgen_refgen::{ArtifactStore, Freshness};

use crate::domain::{Artifacts, Axis, Constraint, Domain, Field};
use crate::error::{MatrixError, Result};
use crate::generic::{GenericValue, Generics};

/// One named set of generics handed to the simulation framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestConfiguration {
    pub name: String,
    /// Test case the configuration is attached to; `None` means every test of the entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test: Option<String>,
    pub generics: Generics,
}

/// Test case names per testbench entity, for domains that select modes per test.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCatalog(BTreeMap<String, Vec<String>>);

impl TestCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<I, S>(&mut self, entity: impl Into<String>, tests: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(entity.into())
            .or_default()
            .extend(tests.into_iter().map(Into::into));
    }

    pub fn tests(&self, entity: &str) -> &[String] {
        self.0.get(entity).map(Vec::as_slice).unwrap_or(&[])
    }
}

pub struct BuildContext<'a, F> {
    pub store: &'a ArtifactStore<F>,
    pub catalog: &'a TestCatalog,
}

#[derive(Debug, Clone)]
struct Assignment {
    field: Field,
    value: GenericValue,
}

type Point = Vec<Assignment>;

/// Enumerates `domain` in declaration order, first axis outermost, attaching `seed` to every
/// configuration. Artifacts are generated before the configuration that references them.
pub fn build<F: Freshness>(
    domain: &Domain,
    seed: i32,
    ctx: &BuildContext<'_, F>,
) -> Result<Vec<TestConfiguration>> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |config: TestConfiguration| -> Result<()> {
        if !seen.insert((config.test.clone(), config.name.clone())) {
            return Err(MatrixError::DuplicateName {
                entity: domain.entity.to_string(),
                name: config.name,
            });
        }
        out.push(config);
        Ok(())
    };

    if let Some(baseline) = &domain.baseline {
        let mut generics = Generics::new();
        for (generic, value) in &baseline.generics {
            generics.insert(*generic, value.clone());
        }
        generics.insert(domain.seed_generic, seed);
        push(TestConfiguration {
            name: baseline.name.to_string(),
            test: None,
            generics,
        })?;
    }

    let points: Vec<Point> = cross_product(&domain.axes)
        .into_iter()
        .filter(|point| domain.constraints.iter().all(|c| admits(c, point)))
        .collect();

    match &domain.modes {
        None => {
            for point in &points {
                let mut name = label_parts(domain);
                name.extend(point.iter().map(render));

                let mut generics = Generics::new();
                for a in point {
                    generics.insert(a.field.generic, a.value.clone());
                }
                attach_artifacts(domain, point, &mut generics, ctx)?;
                generics.insert(domain.seed_generic, seed);

                push(TestConfiguration {
                    name: name.join(","),
                    test: None,
                    generics,
                })?;
            }
        }
        Some(modes) => {
            for test in ctx.catalog.tests(domain.entity) {
                for point in &points {
                    for rule in modes.rules.iter().filter(|r| test.starts_with(r.prefix)) {
                        let mode = Assignment {
                            field: modes.field,
                            value: rule.mode.into(),
                        };

                        let mut name = label_parts(domain);
                        name.push(render(&mode));
                        name.extend(point.iter().map(render));

                        let mut generics = Generics::new();
                        generics.insert(mode.field.generic, mode.value.clone());
                        for a in point {
                            generics.insert(a.field.generic, a.value.clone());
                        }
                        generics.insert(domain.seed_generic, seed);

                        push(TestConfiguration {
                            name: name.join(","),
                            test: Some(test.clone()),
                            generics,
                        })?;
                    }
                }
            }
        }
    }

    Ok(out)
}

fn cross_product(axes: &[Axis]) -> Vec<Point> {
    let mut points: Vec<Point> = vec![Vec::new()];
    for axis in axes {
        let mut next = Vec::with_capacity(points.len() * axis.rows.len());
        for point in &points {
            for row in &axis.rows {
                let mut extended = point.clone();
                extended.extend(axis.fields.iter().zip(row).map(|(field, value)| Assignment {
                    field: *field,
                    value: value.clone(),
                }));
                next.push(extended);
            }
        }
        points = next;
    }
    points
}

fn admits(constraint: &Constraint, point: &[Assignment]) -> bool {
    let int = |generic: &str| {
        point
            .iter()
            .find(|a| a.field.generic == generic)
            .and_then(|a| a.value.as_int())
    };
    match *constraint {
        Constraint::StrictlyNarrowing { input, output } => {
            matches!((int(input), int(output)), (Some(i), Some(o)) if o < i)
        }
    }
}

fn label_parts(domain: &Domain) -> Vec<String> {
    domain.label.iter().map(|l| l.to_string()).collect()
}

fn render(a: &Assignment) -> String {
    format!("{}={}", a.field.key, a.value)
}

fn attach_artifacts<F: Freshness>(
    domain: &Domain,
    point: &[Assignment],
    generics: &mut Generics,
    ctx: &BuildContext<'_, F>,
) -> Result<()> {
    match &domain.artifacts {
        Artifacts::None => {}
        Artifacts::FileReader {
            width_generic,
            lengths,
        } => {
            let invalid = || MatrixError::InvalidGeneric {
                entity: domain.entity.to_string(),
                generic: width_generic.to_string(),
            };
            let width = point
                .iter()
                .find(|a| a.field.generic == *width_generic)
                .and_then(|a| a.value.as_int())
                .ok_or_else(invalid)?;
            let data_width = u32::try_from(width).map_err(|_| invalid())?;
            let (_, length_list) = lengths
                .iter()
                .find(|(w, _)| *w == width)
                .ok_or_else(|| MatrixError::MissingLengths {
                    entity: domain.entity.to_string(),
                    width,
                })?;

            let mut entries = Vec::with_capacity(length_list.len());
            for length in length_list {
                let pair = ctx.store.reader_pair(data_width, *length)?;
                entries.push(format!(
                    "{},{}",
                    pair.input.display(),
                    pair.reference.display()
                ));
            }
            generics.insert("test_cfg", entries.join("|"));
        }
        Artifacts::FileCompare { data_width, length } => {
            let set = ctx.store.compare_set(*data_width, *length)?;
            generics.insert("input_file", set.pair.input.clone());
            generics.insert("reference_file", set.pair.reference.clone());
            generics.insert("tdata_single_error_file", set.single_error.clone());
            generics.insert("tdata_two_errors_file", set.double_error.clone());
            generics.insert("tlast_error_file", set.last_error.clone());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Baseline, ModeRule, Modes};
    use tbgen_refgen::AlwaysStale;

    fn with_ctx<T>(
        catalog: &TestCatalog,
        f: impl FnOnce(&BuildContext<'_, AlwaysStale>) -> T,
    ) -> T {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), 0, AlwaysStale);
        let ctx = BuildContext {
            store: &store,
            catalog,
        };
        f(&ctx)
    }

    fn names(configs: &[TestConfiguration]) -> Vec<&str> {
        configs.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn first_axis_is_outermost() {
        let domain = Domain::new("dut", "SEED")
            .axis(Axis::scalar("a", "A", [1, 2]))
            .axis(Axis::scalar("b", "B", [3, 4]));
        let configs = with_ctx(&TestCatalog::new(), |ctx| build(&domain, 5, ctx)).unwrap();
        assert_eq!(names(&configs), ["a=1,b=3", "a=1,b=4", "a=2,b=3", "a=2,b=4"]);
        assert_eq!(
            configs[0].generics.names().collect::<Vec<_>>(),
            ["A", "B", "SEED"]
        );
        assert_eq!(configs[3].generics.get("SEED"), Some(&GenericValue::Int(5)));
    }

    #[test]
    fn baseline_precedes_filtered_points() {
        let domain = Domain::new("dut", "seed")
            .baseline(Baseline {
                name: "same",
                generics: vec![("IN", GenericValue::Int(4)), ("OUT", GenericValue::Int(4))],
            })
            .axis(Axis::scalar("in", "IN", [2, 4]))
            .axis(Axis::scalar("out", "OUT", [2, 4]))
            .constrain(Constraint::StrictlyNarrowing {
                input: "IN",
                output: "OUT",
            });
        let configs = with_ctx(&TestCatalog::new(), |ctx| build(&domain, 0, ctx)).unwrap();
        assert_eq!(names(&configs), ["same", "in=4,out=2"]);
    }

    #[test]
    fn modes_follow_test_prefixes() {
        let domain = Domain::new("arb", "seed")
            .axis(Axis::scalar("flag", "FLAG", [true, false]))
            .modes(Modes {
                field: Field {
                    key: "mode",
                    generic: "MODE",
                },
                rules: vec![
                    ModeRule {
                        prefix: "test_x",
                        mode: "X",
                    },
                    ModeRule {
                        prefix: "test_y",
                        mode: "Y",
                    },
                ],
            });
        let mut catalog = TestCatalog::new();
        catalog.insert("arb", ["test_x_basic", "test_other"]);

        let configs = with_ctx(&catalog, |ctx| build(&domain, 1, ctx)).unwrap();
        assert_eq!(names(&configs), ["mode=X,flag=True", "mode=X,flag=False"]);
        assert!(configs
            .iter()
            .all(|c| c.test.as_deref() == Some("test_x_basic")));
        assert_eq!(
            configs[0].generics.names().collect::<Vec<_>>(),
            ["MODE", "FLAG", "seed"]
        );
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let domain = Domain::new("dut", "seed").axis(Axis::scalar("a", "A", [1, 1]));
        let err = with_ctx(&TestCatalog::new(), |ctx| build(&domain, 0, ctx)).unwrap_err();
        assert!(matches!(err, MatrixError::DuplicateName { name, .. } if name == "a=1"));
    }

    #[test]
    fn missing_file_lengths_are_reported() {
        let domain = Domain::new("reader", "seed")
            .label("multiple")
            .axis(Axis::scalar("data_width", "DATA_WIDTH", [8]))
            .artifacts(Artifacts::FileReader {
                width_generic: "DATA_WIDTH",
                lengths: vec![(16, vec![1])],
            });
        let err = with_ctx(&TestCatalog::new(), |ctx| build(&domain, 0, ctx)).unwrap_err();
        assert!(matches!(err, MatrixError::MissingLengths { width: 8, .. }));
    }

    #[test]
    fn no_axes_yields_single_labelled_config() {
        let domain = Domain::new("dut", "seed").label("with_seed");
        let configs = with_ctx(&TestCatalog::new(), |ctx| build(&domain, -1, ctx)).unwrap();
        assert_eq!(names(&configs), ["with_seed"]);
        assert_eq!(configs[0].generics.get("seed"), Some(&GenericValue::Int(-1)));
    }
}
