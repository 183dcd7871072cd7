use lane_tactics_core::{BoardQuery, Location, Oracle, Turn};

/// Reports whether a unit passing through `gap` could reach the far edge.
///
/// A friendly structure on the gap is lifted for the duration of the path
/// query and put back before returning, whatever the outcome.
pub fn hole_check<O: Oracle>(turn: &mut Turn<'_, O>, gap: Location) -> bool {
    let probe = turn.probe_gap(gap);
    let path = probe.path_to_exit(gap);
    let reachable = path
        .last()
        .is_some_and(|end| end.edge().is_some() && end.is_own_half() != gap.is_own_half());
    tracing::debug!(%gap, lifted = probe.lifted().is_some(), reachable, "hole check");
    reachable
}
