use engine_logging::{engine_debug, engine_info};

use crate::{DiscoverySession, Effect, Msg};

/// Pure update function: applies a message to the session and returns any effects.
///
/// A session in a terminal state ignores further messages.
pub fn update<'k>(
    mut session: DiscoverySession<'k>,
    msg: Msg,
) -> (DiscoverySession<'k>, Vec<Effect>) {
    let effects = match msg {
        Msg::SnapshotObserved {
            candidates,
            observed_at,
        } => {
            if session.state().is_terminal() {
                return (session, Vec::new());
            }
            let candidate_count = candidates.len();
            let new_items = session.absorb(candidates, observed_at);
            engine_debug!(
                "query={:?} iteration={} candidates={} new={} accumulated={}",
                session.query(),
                session.iteration(),
                candidate_count,
                new_items,
                session.items().len()
            );
            match session.evaluate_stop(new_items) {
                Some(state) => {
                    engine_info!(
                        "query={:?} finished {} after {} iterations with {} items",
                        session.query(),
                        state,
                        session.iteration(),
                        session.items().len()
                    );
                    vec![Effect::Finished { state }]
                }
                None => vec![Effect::RevealMore],
            }
        }
    };

    (session, effects)
}
