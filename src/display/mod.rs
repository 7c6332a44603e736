use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::*;
use num_traits::Float;

use crate::rdm::DescriptorValue;
use crate::resample::BootstrapSample;

/// Longest label list shown before the draw is elided.
const MAX_SHOWN_LABELS: usize = 12;

fn draw_display(sample: &[DescriptorValue]) -> String {
    let shown: Vec<String> = sample.iter().take(MAX_SHOWN_LABELS).map(ToString::to_string).collect();
    if sample.len() > MAX_SHOWN_LABELS {
        format!("{}, … (+{})", shown.join(", "), sample.len() - MAX_SHOWN_LABELS)
    } else {
        shown.join(", ")
    }
}

fn axis_row(name: &str, sample: &[DescriptorValue], members: usize) -> Vec<Cell> {
    let distinct = sample.iter().collect::<BTreeSet<_>>().len();
    vec![
        Cell::new(name).set_alignment(CellAlignment::Left),
        Cell::new(sample.len()).set_alignment(CellAlignment::Right),
        Cell::new(distinct).set_alignment(CellAlignment::Right),
        Cell::new(members).set_alignment(CellAlignment::Right),
        Cell::new(draw_display(sample)).set_alignment(CellAlignment::Left),
    ]
}

impl<F: Float> BootstrapSample<F> {
    /// Render the draw as a table: per axis, the groups drawn, how many were
    /// distinct, the resulting member count, and the labels in draw order.
    pub fn display(&self) -> String {
        let mut title_table = Table::new();
        title_table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .add_row(vec![
                Cell::new("RDM Bootstrap Sample").set_alignment(CellAlignment::Center),
            ]);

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Axis").set_alignment(CellAlignment::Center),
                Cell::new("Drawn").set_alignment(CellAlignment::Center),
                Cell::new("Distinct").set_alignment(CellAlignment::Center),
                Cell::new("Members").set_alignment(CellAlignment::Center),
                Cell::new("Draw").set_alignment(CellAlignment::Center),
            ])
            .add_row(axis_row("rdm", &self.rdm_sample, self.rdms.n_rdm()))
            .add_row(axis_row("pattern", &self.pattern_sample, self.rdms.n_pattern()));

        format!("{title_table}\n{table}")
    }
}

impl<F: Float> Display for BootstrapSample<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
