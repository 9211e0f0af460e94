//! Find observations that report the same sighting and resolve them.
//!
//! Two rows are duplicates when they share species, place, date and observer. How a group of
//! duplicates is resolved depends on the use:
//!
//! * [`ReconcilePolicy::Disambiguate`] is for merging sources whose rows are distinct sightings
//!   that happen to share a key. Every row in the group gets its source id appended to the place,
//!   nothing is dropped and no counts are combined.
//! * [`ReconcilePolicy::Collapse`] is for report output. The row with the largest count is kept
//!   and the others are folded into its comment.
//!
//! Groups that still share a key afterwards are withheld and reported, never resolved further.

use crate::{
    diagnostics::{Diagnostic, Diagnostics},
    observation::{Observation, ObservationKey},
};
use std::{collections::HashMap, fmt::Display};
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

/// How to resolve a group of duplicate observations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, IntoStaticStr, EnumIter)]
pub enum ReconcilePolicy {
    /// Make keys unique by appending the source id to the place.
    #[strum(to_string = "disambiguate")]
    Disambiguate,
    /// Keep the row with the largest count, noting the others in its comment.
    #[strum(to_string = "collapse")]
    Collapse,
}

impl Display for ReconcilePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        let name: &'static str = self.into();
        write!(f, "{}", name)
    }
}

/// Rows that could not be told apart, kept for manual review.
#[derive(Clone, Debug, PartialEq)]
pub struct AmbiguousGroup {
    /// The key the rows share after reconciliation.
    pub key: ObservationKey,
    /// The rows, with their source ids.
    pub members: Vec<Observation>,
}

impl AmbiguousGroup {
    /// Source ids of the members, in input order.
    pub fn source_ids(&self) -> Vec<Option<String>> {
        self.members.iter().map(|obs| obs.source_id.clone()).collect()
    }
}

/// The result of reconciling a set of observations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reconciled {
    /// Observations with unique keys and no source ids.
    pub observations: Vec<Observation>,
    /// Groups that are still duplicates.
    pub ambiguous: Vec<AmbiguousGroup>,
}

/// Group observations by key. Groups are in order of first appearance and the indexes in each
/// group are in input order.
pub fn group_by_key(observations: &[Observation]) -> Vec<Vec<usize>> {
    let mut group_of_key: HashMap<ObservationKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = vec![];

    for (idx, obs) in observations.iter().enumerate() {
        let next_group = groups.len();
        let group = *group_of_key.entry(obs.key()).or_insert(next_group);
        if group == next_group {
            groups.push(vec![idx]);
        } else {
            groups[group].push(idx);
        }
    }

    groups
}

/// Number of distinct keys in a set of observations.
pub fn distinct_keys(observations: &[Observation]) -> usize {
    group_by_key(observations).len()
}

/// Resolve duplicate observations with the given policy.
///
/// Under `Disambiguate` the output has as many rows as the input, under `Collapse` one row per
/// distinct key; in both cases less any rows withheld in ambiguous groups. Each ambiguous group
/// is also recorded in `diagnostics`.
pub fn reconcile(
    observations: Vec<Observation>,
    policy: ReconcilePolicy,
    diagnostics: &mut Diagnostics,
) -> Reconciled {
    let groups = group_by_key(&observations);
    let num_duplicate_groups = groups.iter().filter(|group| group.len() > 1).count();
    log::info!(
        "{} records in {} groups, {} of them duplicated, resolving with {}",
        observations.len(),
        groups.len(),
        num_duplicate_groups,
        policy
    );

    let resolved = match policy {
        ReconcilePolicy::Disambiguate => disambiguate(observations, &groups),
        ReconcilePolicy::Collapse => collapse(observations, groups),
    };

    verify(resolved, diagnostics)
}

fn disambiguate(mut observations: Vec<Observation>, groups: &[Vec<usize>]) -> Vec<Observation> {
    for group in groups.iter().filter(|group| group.len() > 1) {
        for &idx in group {
            let obs = &mut observations[idx];
            // Without an id the row keeps its key and is caught when verifying.
            if let Some(source_id) = obs.source_id.as_ref() {
                obs.place = format!("{} - {}", obs.place, source_id);
            }
        }
    }

    observations
}

fn collapse(observations: Vec<Observation>, groups: Vec<Vec<usize>>) -> Vec<Observation> {
    let mut slots: Vec<Option<Observation>> = observations.into_iter().map(Some).collect();
    let mut collapsed = Vec::with_capacity(groups.len());

    for group in groups {
        // First occurrence wins a tie. Unparseable counts lose to any parsed count.
        let mut rep_idx = group[0];
        for &idx in &group[1..] {
            if count_of(&slots[idx]) > count_of(&slots[rep_idx]) {
                rep_idx = idx;
            }
        }

        let mut representative = match slots[rep_idx].take() {
            Some(obs) => obs,
            None => continue,
        };

        let notes: Vec<String> = group
            .iter()
            .filter(|&&idx| idx != rep_idx)
            .filter_map(|&idx| slots[idx].take())
            .map(|folded| {
                format!("including {} {}", folded.count_display(), folded.comment)
                    .trim_end()
                    .to_owned()
            })
            .collect();

        if !notes.is_empty() {
            representative.comment = append_notes(&representative.comment, &notes);
        }

        collapsed.push(representative);
    }

    collapsed
}

fn count_of(slot: &Option<Observation>) -> Option<u64> {
    slot.as_ref().and_then(Observation::resolved_count)
}

fn append_notes(comment: &str, notes: &[String]) -> String {
    let comment = comment.trim();
    let mut parts: Vec<&str> = Vec::with_capacity(notes.len() + 1);
    if !comment.is_empty() {
        parts.push(comment);
    }
    parts.extend(notes.iter().map(String::as_str));
    parts.join("; ")
}

// Withhold any group that still shares a key, and drop the source ids from everything else.
fn verify(resolved: Vec<Observation>, diagnostics: &mut Diagnostics) -> Reconciled {
    let groups = group_by_key(&resolved);
    if groups.len() == resolved.len() {
        return Reconciled {
            observations: resolved.into_iter().map(drop_source_id).collect(),
            ambiguous: vec![],
        };
    }

    let mut withheld = vec![false; resolved.len()];
    let mut ambiguous_indexes = vec![];
    for group in groups.into_iter().filter(|group| group.len() > 1) {
        for &idx in &group {
            withheld[idx] = true;
        }
        ambiguous_indexes.push(group);
    }

    let mut slots: Vec<Option<Observation>> = resolved.into_iter().map(Some).collect();

    let ambiguous: Vec<AmbiguousGroup> = ambiguous_indexes
        .into_iter()
        .filter_map(|group| {
            let members: Vec<Observation> =
                group.iter().filter_map(|&idx| slots[idx].take()).collect();
            let key = members.first()?.key();
            Some(AmbiguousGroup { key, members })
        })
        .collect();

    for group in &ambiguous {
        diagnostics.record(Diagnostic::AmbiguousReconciliation {
            key: group.key.clone(),
            source_ids: group.source_ids(),
        });
    }

    let observations = slots
        .into_iter()
        .zip(withheld)
        .filter(|(_, is_withheld)| !is_withheld)
        .filter_map(|(slot, _)| slot)
        .map(drop_source_id)
        .collect();

    Reconciled {
        observations,
        ambiguous,
    }
}

fn drop_source_id(obs: Observation) -> Observation {
    Observation {
        source_id: None,
        ..obs
    }
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
