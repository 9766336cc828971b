//! Tree assembly from flattened join rows.
//!
//! The partner read path issues one query that left-joins markers, challenges
//! and strategies. Because challenges and strategies are both children of a
//! marker, the join fans out: a marker with 2 challenges and 3 strategies
//! produces 6 rows, repeating every (marker, challenge) pair once per strategy
//! and every (marker, strategy) pair once per challenge.
//!
//! [`TreeAssembler`] folds such a stream back into one [`BoundaryPartner`] in a
//! single pass:
//! - the partner comes from the first row only
//! - markers are appended on first sighting, preserving row order
//! - challenge and strategy ids are deduplicated globally (not per marker);
//!   the first row carrying an id decides which marker owns it

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::entities::{BoundaryPartner, Challenge, ProgressMarker, Strategy};

/// Partner columns, repeated on every row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerColumns {
    pub boundary_partner_id: String,
    pub project_id: String,
    pub partner_name: String,
    pub outcome_statement: String,
}

/// Marker columns. Absent when the partner has no markers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerColumns {
    pub progress_marker_id: String,
    pub title: String,
    pub kind: i64,
    pub order_number: u32,
}

/// `(id, name)` of a challenge or strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafColumns {
    pub id: String,
    pub name: String,
}

/// One row of the partner tree query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRow {
    pub partner: PartnerColumns,
    pub marker: Option<MarkerColumns>,
    pub challenge: Option<LeafColumns>,
    pub strategy: Option<LeafColumns>,
}

/// Incremental builder; feed rows with [`push`](Self::push), then [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct TreeAssembler {
    partner: Option<BoundaryPartner>,
    marker_index: HashMap<String, usize>,
    challenge_ids: HashSet<String>,
    strategy_ids: HashSet<String>,
}

impl TreeAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: FlatRow) {
        let partner = self.partner.get_or_insert_with(|| BoundaryPartner {
            boundary_partner_id: row.partner.boundary_partner_id,
            project_id: row.partner.project_id,
            partner_name: row.partner.partner_name,
            outcome_statement: row.partner.outcome_statement,
            progress_markers: Vec::new(),
        });

        let Some(marker) = row.marker else {
            return;
        };

        let idx = match self.marker_index.entry(marker.progress_marker_id) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                partner.progress_markers.push(ProgressMarker {
                    progress_marker_id: e.key().clone(),
                    boundary_partner_id: partner.boundary_partner_id.clone(),
                    title: marker.title,
                    kind: marker.kind,
                    order_number: marker.order_number,
                    challenges: Vec::new(),
                    strategies: Vec::new(),
                });
                *e.insert(partner.progress_markers.len() - 1)
            }
        };
        let owner = &mut partner.progress_markers[idx];

        if let Some(challenge) = row.challenge {
            if self.challenge_ids.insert(challenge.id.clone()) {
                owner.challenges.push(Challenge {
                    challenge_id: challenge.id,
                    progress_marker_id: owner.progress_marker_id.clone(),
                    challenge_name: challenge.name,
                });
            }
        }

        if let Some(strategy) = row.strategy {
            if self.strategy_ids.insert(strategy.id.clone()) {
                owner.strategies.push(Strategy {
                    strategy_id: strategy.id,
                    progress_marker_id: owner.progress_marker_id.clone(),
                    strategy_name: strategy.name,
                });
            }
        }
    }

    /// The assembled partner, or `None` if no row was pushed (partner not found).
    #[must_use]
    pub fn finish(self) -> Option<BoundaryPartner> {
        self.partner
    }
}

/// Fold a complete row stream. `None` means the stream was empty.
pub fn assemble<I>(rows: I) -> Option<BoundaryPartner>
where
    I: IntoIterator<Item = FlatRow>,
{
    let mut assembler = TreeAssembler::new();
    for row in rows {
        assembler.push(row);
    }
    assembler.finish()
}
