//! End-to-end prompt suggestion scenarios: a buffer wired to a live
//! autocompleter the way the TUI assembles them.

use std::sync::Arc;
use std::time::Duration;

use husky_engine::{
    NaiveSpellChecker, PromptAutocompleter, SpellChecker, SuggestBuff, TernarySearchTree,
    BUCKET_ALIASES, BUCKET_HISTORY, BUCKET_NAMESPACES,
};
use husky_types::BufferKind;

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn seeded_completer() -> Arc<PromptAutocompleter> {
    Arc::new(PromptAutocompleter::new(
        Box::new(|completer| {
            completer.index(BUCKET_HISTORY, &strings(&["history1", "history2 ns2"]));
            completer.index(BUCKET_ALIASES, &strings(&["alias1", "alias2"]));
            completer.index(BUCKET_NAMESPACES, &strings(&["ns1", "ns2"]));
        }),
        Duration::from_millis(200),
    ))
}

#[test]
fn typed_input_produces_expected_suggestions() {
    let completer = seeded_completer();

    let mut buff = SuggestBuff::new(BufferKind::Command);
    buff.add_listener_with_priority(completer.clone(), 3);
    buff.add_suggest_mode_listener(completer.clone());
    {
        let completer = completer.clone();
        buff.set_suggestion_fn(Box::new(move |text, _| completer.suggest(text)));
    }

    let cases: &[(&str, &[&str])] = &[
        ("a", &["alias1", "alias2"]),
        ("ali", &["alias1", "alias2"]),
        ("alias2", &["alias2"]),
        ("alias1 n", &["alias1 ns1", "alias1 ns2"]),
        ("history2 n", &["history2 ns2", "history2 ns1"]),
    ];

    for (input, expected) in cases {
        buff.set_active(true);
        for r in input.chars() {
            buff.add(r);
        }
        assert_eq!(
            completer.suggest(&buff.text()),
            strings(expected),
            "suggestions do not match for input {input}"
        );
        assert_eq!(
            buff.current_suggestion(),
            Some(expected[0]),
            "ring front does not match for input {input}"
        );
        buff.reset();
    }
}

#[test]
fn spellchecker_rescues_prompt_typos() {
    let mut tree = TernarySearchTree::new();
    tree.insert_all(["po", "pod", "deploy", "deployment"]);
    let checker = NaiveSpellChecker::new(&tree, 3);

    let cases: &[(&str, &[&str])] = &[
        ("pdo", &["pod"]),
        ("delpoy", &["deploy", "deployment"]),
        ("deply", &["deploy", "deployment"]),
        ("depoly", &["deploy", "deployment"]),
        ("dployment", &["deployment"]),
    ];

    for (typo, expected) in cases {
        let mut suggestions: Vec<String> = checker
            .candidates(typo)
            .into_iter()
            .map(|candidate| candidate.suggestion)
            .collect();
        suggestions.sort_unstable();
        assert_eq!(
            suggestions,
            strings(expected),
            "suggestions do not match for typo {typo}"
        );
    }
}

#[test]
fn concurrent_reindex_never_tears_a_bucket() {
    let completer = Arc::new(PromptAutocompleter::new(
        Box::new(|_| {}),
        Duration::from_secs(300),
    ));

    let old = strings(&["alpha one", "alpha two"]);
    let new = strings(&["beta one", "beta two"]);
    completer.index(BUCKET_HISTORY, &old);

    let mut old_sorted = old.clone();
    old_sorted.sort_unstable();
    let mut new_sorted = new.clone();
    new_sorted.sort_unstable();

    std::thread::scope(|scope| {
        let writer = {
            let completer = completer.clone();
            let old = old.clone();
            let new = new.clone();
            scope.spawn(move || {
                for round in 0..200 {
                    let words = if round % 2 == 0 { &new } else { &old };
                    completer.index(BUCKET_HISTORY, words);
                }
            })
        };

        for _ in 0..200 {
            let mut seen = completer.suggest("");
            seen.sort_unstable();
            assert!(
                seen == old_sorted || seen == new_sorted,
                "read a torn history snapshot: {seen:?}"
            );
        }

        writer.join().expect("writer thread panicked");
    });
}
