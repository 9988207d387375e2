//! End-to-end run flow against the on-disk store

use abc_algo::ledger::StateUpdate;
use abc_algo::letter::letters;
use abc_algo::{
    AlgoConfig, AlgoError, CurriculumSet, JsonFileStore, Letter, MasteryLedger, Medal, Mode,
    SeededRng, Session, UnitRng,
};

fn play_run<S: abc_algo::ProgressStore, R: UnitRng>(
    ledger: &MasteryLedger<S>,
    rng: &mut R,
    miss_first: bool,
) -> abc_algo::RunSummary {
    let mut session = Session::start(ledger, &Letter::prefix(26), Some(5)).unwrap();
    let mut first = true;
    while session.has_next() {
        let prompt = session.next_prompt(rng).unwrap();
        assert!(prompt.options.contains(&prompt.target));

        let chosen = if miss_first && first {
            *prompt.options.iter().find(|&&l| l != prompt.target).unwrap()
        } else {
            prompt.target
        };
        first = false;
        session.answer(chosen.as_str()).unwrap();
    }
    session.finish().unwrap()
}

#[test]
fn test_guided_path_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = SeededRng::seeded(11);

    {
        let ledger = MasteryLedger::new(JsonFileStore::open(dir.path()).unwrap(), AlgoConfig::default());
        ledger.save_progress(&StateUpdate {
            mode: Some(Mode::Path),
            ..StateUpdate::default()
        });

        let first = play_run(&ledger, &mut rng, false);
        assert_eq!(first.medal, Medal::Gold);
        assert_eq!(first.unlocked_after, 4);

        let second = play_run(&ledger, &mut rng, false);
        assert_eq!(second.unlocked_before, 4);
        assert_eq!(second.unlocked_after, 8);
    }

    let reopened = MasteryLedger::new(JsonFileStore::open(dir.path()).unwrap(), AlgoConfig::default());
    let state = reopened.get_progress();
    assert_eq!(state.mode, Mode::Path);
    assert_eq!(state.unlocked, 8);
    assert_eq!(state.flawless_streak, 0);
    assert_eq!(state.attempt_log.len(), 10);
    assert!(state.attempt_log.iter().all(|a| a.correct));
}

#[test]
fn test_mistake_blocks_unlock_and_is_remediated() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = MasteryLedger::new(JsonFileStore::open(dir.path()).unwrap(), AlgoConfig::default());
    ledger.save_progress(&StateUpdate {
        mode: Some(Mode::Path),
        unlocked: Some(8),
        flawless_streak: Some(1),
        ..StateUpdate::default()
    });
    let mut rng = SeededRng::seeded(3);

    let summary = play_run(&ledger, &mut rng, true);
    assert_eq!(summary.bad, 1);
    assert_eq!(summary.ok, 4);
    assert_eq!(summary.percent, 80);
    assert_eq!(summary.medal, Medal::Silver);
    assert_eq!(summary.unlocked_after, 8);

    let state = ledger.get_progress();
    assert_eq!(state.flawless_streak, 0);
    let missed = state.attempt_log.iter().find(|a| !a.correct).unwrap();
    assert_eq!(missed.chosen.map(|c| c != missed.target), Some(true));

    // the missed letter is forced back once two other letters were asked
    let asked_again = state
        .attempt_log
        .iter()
        .skip(1)
        .take(3)
        .any(|a| a.target == missed.target && a.correct);
    assert!(asked_again);
}

#[test]
fn test_free_mode_and_curriculum_switch() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = MasteryLedger::new(JsonFileStore::open(dir.path()).unwrap(), AlgoConfig::default());
    let mut rng = SeededRng::seeded(5);

    ledger.save_progress(&StateUpdate {
        free_letter_count: Some(6),
        ..StateUpdate::default()
    });
    let mut session = Session::start(&ledger, &letters("A B C D E F G H"), Some(4)).unwrap();
    while session.has_next() {
        let prompt = session.next_prompt(&mut rng).unwrap();
        assert!(prompt.target.index() < 6);
        session.answer(prompt.target.as_str()).unwrap();
    }
    let summary = session.finish().unwrap();
    assert_eq!(summary.mode, Mode::Free);
    assert_eq!(summary.unlocked_after, summary.unlocked_before);

    ledger.save_progress(&StateUpdate {
        mode: Some(Mode::Path),
        unlocked: Some(26),
        flawless_streak: Some(1),
        ..StateUpdate::default()
    });
    let summary = play_run(&ledger, &mut rng, false);
    assert!(summary.curriculum_changed());
    assert_eq!(summary.curriculum_after, CurriculumSet::Secondary);
    assert_eq!(summary.unlocked_after, 4);
}

#[test]
fn test_no_playable_letters_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = MasteryLedger::new(JsonFileStore::open(dir.path()).unwrap(), AlgoConfig::default());
    let result = Session::start(&ledger, &["X", "Y", "Z"], None);
    assert!(matches!(result, Err(AlgoError::EmptyPool)));
}
