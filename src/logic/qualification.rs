//! Qualifier selection: the top of each finalized group advances.

use crate::logic::standings::group_standings;
use crate::models::{category_matches, Group, Qualifier, Standing};

/// Top `qualifiers_count` standings of every finalized group, group by group.
///
/// Groups still in progress contribute nothing. An empty result is valid.
pub fn select_qualifiers(
    groups: &[Group],
    standings: &[Standing],
    category: Option<&str>,
) -> Vec<Qualifier> {
    groups
        .iter()
        .filter(|g| g.is_finalized() && category_matches(g.category.as_deref(), category))
        .flat_map(|g| {
            group_standings(standings, g)
                .take(g.qualifiers_count as usize)
                .map(Qualifier::from)
        })
        .collect()
}
