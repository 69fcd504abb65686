//! Property tests for the round-trip laws of spec §8, exercised purely
//! through the command-stream protocol so they double as `CommandSource`/
//! `OutputSink` seam tests.

mod common;

use common::run;
use proptest::prelude::*;

/// `1,{n}c` plus one payload per line, using `line{i}` as filler text.
fn seed_script(n: usize) -> Vec<String> {
    let mut v = vec![format!("1,{n}c")];
    for i in 1..=n {
        v.push(format!("line{i}"));
    }
    v
}

fn print_all(n: usize) -> Vec<String> {
    vec![format!("1,{n}p")]
}

proptest! {
    // For any prefix of input followed by a CHANGE or DELETE C, then
    // UNDO(1): document state equals the state before C.
    #[test]
    fn undo_one_after_change_restores_prior_document(
        n in 1usize..8,
        target in 1usize..8,
        new_payload in "[a-z]{1,5}",
    ) {
        let target = target.min(n);
        let mut script = seed_script(n);
        script.extend(print_all(n));
        script.push(format!("{target},{target}c"));
        script.push(new_payload);
        script.push(format!("{target},{target}u"));
        script.extend(print_all(n));

        let out = run(script);
        prop_assert_eq!(out.len(), 2 * n);
        let (baseline, after_undo) = out.split_at(n);
        prop_assert_eq!(baseline, after_undo);
    }

    #[test]
    fn undo_one_after_delete_restores_prior_document(
        n in 2usize..8,
        target in 1usize..8,
    ) {
        let target = target.min(n);
        let mut script = seed_script(n);
        script.extend(print_all(n));
        script.push(format!("{target},{target}d"));
        script.push(format!("{target},{target}u"));
        script.extend(print_all(n));

        let out = run(script);
        prop_assert_eq!(out.len(), 2 * n);
        let (baseline, after_undo) = out.split_at(n);
        prop_assert_eq!(baseline, after_undo);
    }

    // UNDO(k) followed by REDO(k) is identity on document state when both
    // clamp equally (k bounded by the number of mutating commands issued).
    #[test]
    fn undo_k_then_redo_k_is_identity(n in 1usize..6, k in 1usize..4) {
        let mut script = seed_script(n);
        // One extra mutating command per k, each touching line 1, so there
        // are at least k groups to undo/redo.
        for i in 0..k {
            script.push("1,1c".to_string());
            script.push(format!("mutation{i}"));
        }
        script.extend(print_all(n));
        script.push(format!("{k},0u"));
        script.push(format!("{k},0r"));
        script.extend(print_all(n));

        let out = run(script);
        prop_assert_eq!(out.len(), 2 * n);
        let (baseline, after) = out.split_at(n);
        prop_assert_eq!(baseline, after);
    }

    // Arbitrary interleavings of UNDO/REDO with net signed sum delta behave
    // like a single application of delta (coalescing equivalence): compare
    // a coalesced run against its single-step equivalent.
    #[test]
    fn coalescing_run_matches_single_equivalent_step(
        n in 1usize..6,
        mutations in 2usize..5,
    ) {
        let mut seed = seed_script(n);
        for i in 0..mutations {
            seed.push("1,1c".to_string());
            seed.push(format!("m{i}"));
        }

        // Stream A: a run that nets to undoing everything, one group at a
        // time, interleaved with redo noise that cancels out.
        let mut a = seed.clone();
        a.push(format!("{mutations},0u"));
        a.push("1,0r".to_string());
        a.push("1,0u".to_string());
        a.extend(print_all(n));

        // Stream B: the single equivalent step (delta = mutations).
        let mut b = seed;
        b.push(format!("{mutations},0u"));
        b.extend(print_all(n));

        prop_assert_eq!(run(a), run(b));
    }
}
