//! The per-component domains of the streaming testbench library.

use serde::Serialize;
use tbgen_refgen::Freshness;

use crate::build::{build, BuildContext, TestCatalog, TestConfiguration};
use crate::domain::{Artifacts, Axis, Baseline, Constraint, Domain, Field, ModeRule, Modes};
use crate::error::Result;
use crate::generic::GenericValue;

pub const ARBITER_ENTITY: &str = "axi_stream_arbiter_tb";

/// Arbiter test cases assumed when the caller does not list them.
pub const DEFAULT_ARBITER_TESTS: &[&str] =
    &["test_round_robin", "test_interleaved", "test_absolute"];

/// Byte lengths of the file reader fixtures, per data width.
const FILE_READER_LENGTHS: &[(i64, &[usize])] = &[
    (1, &[1, 2]),
    (8, &[1, 8, 16, 24]),
    (16, &[1, 2, 3, 4, 8, 9]),
    (64, &[16, 17, 18, 19]),
];

const PASS_THROUGH: &[&str] = &[
    "axi_stream_frame_slicer_tb",
    "axi_stream_frame_padder_tb",
    "axi_stream_frame_fifo_tb",
    "axi_stream_replicate_tb",
];

/// Every component in registration order.
pub fn suite() -> Vec<Domain> {
    let mut domains = vec![
        async_fifo(),
        stream_delay(),
        file_reader(),
        file_compare(),
        width_converter(),
        embiggener(),
        arbiter(),
    ];
    domains.extend(
        PASS_THROUGH
            .iter()
            .map(|&entity| Domain::new(entity, "seed").label("with_seed")),
    );
    domains
}

/// A catalog listing [`DEFAULT_ARBITER_TESTS`] for the arbiter.
pub fn default_catalog() -> TestCatalog {
    let mut catalog = TestCatalog::new();
    catalog.insert(ARBITER_ENTITY, DEFAULT_ARBITER_TESTS.iter().copied());
    catalog
}

fn async_fifo() -> Domain {
    Domain::new("async_fifo_tb", "SEED")
        .axis(Axis::scalar("wr_clk_period", "WR_CLK_PERIOD_NS", [4, 11]))
        .axis(Axis::scalar("rd_clk_period", "RD_CLK_PERIOD_NS", [4, 11]))
        .axis(Axis::pairs(
            ("wr_rand", "WR_EN_RANDOM"),
            ("rd_rand", "RD_EN_RANDOM"),
            [(0, 0), (3, 0), (0, 3), (5, 5)],
        ))
}

fn stream_delay() -> Domain {
    Domain::new("axi_stream_delay_tb", "SEED")
        .axis(Axis::scalar("delay", "DELAY_CYCLES", [1, 2, 8]))
}

fn file_reader() -> Domain {
    Domain::new("axi_file_reader_tb", "seed")
        .label("multiple")
        .axis(Axis::scalar(
            "data_width",
            "DATA_WIDTH",
            FILE_READER_LENGTHS.iter().map(|(w, _)| *w),
        ))
        .artifacts(Artifacts::FileReader {
            width_generic: "DATA_WIDTH",
            lengths: FILE_READER_LENGTHS
                .iter()
                .map(|(w, lengths)| (*w, lengths.to_vec()))
                .collect(),
        })
}

fn file_compare() -> Domain {
    Domain::new("axi_file_compare_tb", "seed")
        .label("all")
        .artifacts(Artifacts::FileCompare {
            data_width: 32,
            length: 32 * 8,
        })
}

fn width_converter() -> Domain {
    Domain::new("axi_stream_width_converter_tb", "seed")
        .baseline(Baseline {
            name: "same_widths",
            generics: vec![
                ("INPUT_DATA_WIDTH", GenericValue::Int(32)),
                ("OUTPUT_DATA_WIDTH", GenericValue::Int(32)),
            ],
        })
        .axis(Axis::scalar("input_data_width", "INPUT_DATA_WIDTH", [1, 8, 24, 32, 128]))
        .axis(Axis::scalar("output_data_width", "OUTPUT_DATA_WIDTH", [1, 3, 8, 24, 32, 128]))
        .constrain(Constraint::StrictlyNarrowing {
            input: "INPUT_DATA_WIDTH",
            output: "OUTPUT_DATA_WIDTH",
        })
}

fn embiggener() -> Domain {
    Domain::new("axi_embiggener_tb", "seed")
        .axis(Axis::scalar("input_data_width", "INPUT_DATA_WIDTH", [32]))
        .axis(Axis::scalar("output_data_width", "OUTPUT_DATA_WIDTH", [128]))
}

fn arbiter() -> Domain {
    Domain::new(ARBITER_ENTITY, "seed")
        .axis(Axis::scalar("register_inputs", "REGISTER_INPUTS", [true, false]))
        .modes(Modes {
            field: Field {
                key: "mode",
                generic: "MODE",
            },
            rules: vec![
                ModeRule {
                    prefix: "test_round_robin",
                    mode: "ROUND_ROBIN",
                },
                ModeRule {
                    prefix: "test_interleaved",
                    mode: "INTERLEAVED",
                },
                ModeRule {
                    prefix: "test_absolute",
                    mode: "ABSOLUTE",
                },
            ],
        })
}

/// All configurations of one testbench entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentMatrix {
    pub entity: String,
    pub configurations: Vec<TestConfiguration>,
}

/// Builds every domain in order with the same seed.
pub fn build_all<F: Freshness>(
    domains: &[Domain],
    seed: i32,
    ctx: &BuildContext<'_, F>,
) -> Result<Vec<ComponentMatrix>> {
    let mut out = Vec::with_capacity(domains.len());
    for domain in domains {
        let configurations = build(domain, seed, ctx)?;
        tracing::info!(
            entity = domain.entity,
            configurations = configurations.len(),
            "built test matrix"
        );
        out.push(ComponentMatrix {
            entity: domain.entity.to_string(),
            configurations,
        });
    }
    Ok(out)
}
