use std::time::Duration;

use assert_matches::assert_matches;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wordfall::focus_policy::FocusPolicy;
use wordfall::session::ScoreChange;
use wordfall::word::WordState;
use wordfall::{GameSession, SessionConfig, SessionEvent, SessionStatus, WordBank, WordBankError};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn config(enemies: u32, delay_ms: u64) -> SessionConfig {
    SessionConfig {
        enemies,
        min_delay: ms(delay_ms),
        max_delay: ms(delay_ms),
        ..SessionConfig::default()
    }
}

fn session(cfg: SessionConfig, words: &[&str]) -> GameSession<StdRng> {
    GameSession::new(cfg, WordBank::from_words(words), StdRng::seed_from_u64(2024))
}

#[test]
fn bank_runs_dry_after_two_draws() {
    let mut bank = WordBank::from_words(["cat", "dog"]);
    let mut rng = StdRng::seed_from_u64(3);

    let mut drawn = vec![
        bank.draw(3, &mut rng).unwrap(),
        bank.draw(3, &mut rng).unwrap(),
    ];
    drawn.sort();
    assert_eq!(drawn, vec!["cat".to_string(), "dog".to_string()]);
    assert_matches!(
        bank.draw(3, &mut rng),
        Err(WordBankError::ExhaustedBucket { length: 3 })
    );
}

#[test]
fn quick_typing_scores_the_creation_and_speed_bonus() {
    let mut s = session(config(1, 1000), &["cat"]);
    s.advance(Duration::ZERO);

    s.handle_key('c', ms(100));
    s.handle_key('a', ms(200));
    s.handle_key('t', ms(300));
    s.handle_key(' ', ms(400));

    // 4 * (1 + 1/0.3) * (1 + 0.3 * 4 / 0.3)
    assert_eq!(s.score(), 87);
    assert_eq!(s.status(), SessionStatus::Won);
}

#[test]
fn slower_reaction_scores_less() {
    let mut quick = session(config(1, 1000), &["cat"]);
    let mut slow = session(config(1, 1000), &["cat"]);
    quick.advance(Duration::ZERO);
    slow.advance(Duration::ZERO);

    for (i, c) in "cat ".chars().enumerate() {
        quick.handle_key(c, ms(300 + 100 * i as u64));
        slow.handle_key(c, ms(2000 + 100 * i as u64));
    }

    assert!(quick.score() > slow.score());
    assert!(slow.score() > 0);
}

#[test]
fn wrong_letter_resets_the_word() {
    let mut s = session(config(1, 1000), &["cat"]);
    s.advance(Duration::ZERO);

    s.handle_key('c', ms(100));
    assert_eq!(s.active_words()[0].matched_len(), 1);

    s.handle_key('x', ms(200));
    let word = &s.active_words()[0];
    assert_eq!(word.matched_len(), 0);
    assert!(word.key_times().is_empty());
    assert_eq!(word.state(), WordState::Falling);
    assert_eq!(s.input(), "");
    assert_eq!(s.focused(), None);
}

#[test]
fn miss_penalty_scales_with_length_over_speed() {
    let mut slow = session(config(1, 1000), &["cat"]);
    slow.advance(Duration::from_secs(60));
    assert_eq!(slow.score(), -40);

    let mut fast = session(config(1, 2000), &["cat"]);
    fast.advance(Duration::from_secs(60));
    assert_eq!(fast.score(), -20);

    let mut long_cfg = config(1, 1000);
    long_cfg.start_level = 7;
    let mut long = session(long_cfg, &["giraffe"]);
    long.advance(Duration::from_secs(60));
    assert_eq!(long.score(), -80);

    for s in [&slow, &fast, &long] {
        assert_eq!(s.status(), SessionStatus::Lost);
        assert_eq!(s.max_score(), 0);
    }
}

#[test]
fn matching_a_younger_word_does_not_take_focus() {
    let mut s = session(config(2, 1000), &["ant", "cat"]);
    s.advance(ms(1000));
    let oldest = s.active_words()[0].text().to_string();
    let younger = s.active_words()[1].text().to_string();
    assert_ne!(oldest, younger);

    let c = younger.chars().next().unwrap();
    s.handle_key(c, ms(1100));

    assert_eq!(s.focused(), None);
    assert_eq!(s.input(), "");
    assert_eq!(s.active_words()[0].matched_len(), 0);
}

#[test]
fn lenient_focus_follows_the_first_match() {
    let mut cfg = config(2, 1000);
    cfg.focus_policy = FocusPolicy::FirstMatch;
    let mut s = session(cfg, &["ant", "cat"]);
    s.advance(ms(1000));
    let younger = s.active_words()[1].id();
    let c = s.active_words()[1].text().chars().next().unwrap();

    s.handle_key(c, ms(1100));
    assert_eq!(s.focused(), Some(younger));
    assert_eq!(s.input(), c.to_string());
}

#[test]
fn clearing_every_enemy_wins() {
    let mut s = session(config(2, 1000), &["ant", "cat"]);
    s.advance(ms(1000));
    assert_eq!(s.remaining_spawns(), 0);

    let mut now = ms(1000);
    while let Some(word) = s.active_words().first() {
        let text = word.text().to_string();
        for c in text.chars() {
            now += ms(100);
            s.handle_key(c, now);
        }
    }

    assert_eq!(s.status(), SessionStatus::Won);
    let summary = s.summary();
    assert_eq!(summary.outcome, SessionStatus::Won);
    assert_eq!(summary.final_score, s.max_score());
    assert!(summary.missed_words.is_empty());
    assert_eq!(s.pending_timers(), 0);
}

#[test]
fn best_score_never_drops() {
    let mut s = session(config(3, 1000), &["ant", "cat", "owl"]);
    let mut best = 0;
    for delta in [50, -20, 30, -40, 5] {
        assert_eq!(s.apply_score_delta(delta), ScoreChange::Ok);
        assert!(s.max_score() >= best);
        best = s.max_score();
    }
    assert_eq!(best, 60);
    assert_eq!(s.score(), 25);
}

#[test]
fn negative_score_loses_and_freezes_the_game() {
    let mut s = session(config(3, 1000), &["ant", "cat", "owl"]);
    s.advance(ms(500));
    assert_eq!(s.apply_score_delta(-1), ScoreChange::Lost);

    assert_eq!(s.status(), SessionStatus::Lost);
    assert_eq!(s.pending_timers(), 0);
    assert!(!s.spawn_pending());

    let remaining = s.remaining_spawns();
    s.advance(Duration::from_secs(30));
    assert_eq!(s.remaining_spawns(), remaining);
    let game_overs = s
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, SessionEvent::GameOver(_)))
        .count();
    assert_eq!(game_overs, 1);
}

#[test]
fn quit_stops_all_timers() {
    let mut s = session(config(3, 1000), &["ant", "cat", "owl"]);
    s.advance(ms(1500));
    assert_eq!(s.active_words().len(), 2);
    assert!(s.spawn_pending());

    s.quit();

    assert_eq!(s.status(), SessionStatus::Quit);
    assert_eq!(s.pending_timers(), 0);
    assert!(!s.spawn_pending());
    s.advance(Duration::from_secs(60));
    assert_eq!(s.active_words().len(), 2);
    assert!(s.missed_words().is_empty());
}

#[test]
fn short_bank_skips_spawns_but_still_finishes() {
    let mut s = session(config(3, 1000), &["cat"]);
    s.advance(ms(2000));
    assert_eq!(s.remaining_spawns(), 0);

    let skipped = s
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, SessionEvent::SpawnSkipped { .. }))
        .count();
    assert_eq!(skipped, 2);

    for (i, c) in "cat ".chars().enumerate() {
        s.handle_key(c, ms(2100 + 100 * i as u64));
    }
    assert_eq!(s.status(), SessionStatus::Won);
}
