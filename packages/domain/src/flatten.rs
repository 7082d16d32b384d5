//! Script tree → flat job list.

use crate::dialogue_turn::DialogueTurn;
use crate::synthesis_job::SynthesisJob;

/// Flatten a script into synthesis jobs.
///
/// Pre-order: each top-level turn, then its overlaps in listed order (each
/// followed by its own overlaps), before the next top-level turn. Duplicate
/// lines are kept; deduplication is the synthesizer's concern.
pub fn flatten(turns: &[DialogueTurn]) -> Vec<SynthesisJob> {
    let capacity = turns.iter().map(DialogueTurn::line_count).sum();
    let mut jobs = Vec::with_capacity(capacity);
    for turn in turns {
        push_subtree(turn, 0, &mut jobs);
    }
    jobs
}

fn push_subtree(turn: &DialogueTurn, depth: usize, jobs: &mut Vec<SynthesisJob>) {
    jobs.push(SynthesisJob::at_depth(turn.speaker.clone(), turn.text.clone(), depth));
    for overlap in &turn.overlaps {
        push_subtree(overlap, depth + 1, jobs);
    }
}
