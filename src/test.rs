#[cfg(test)]
pub mod test {
    use anyhow::Result;
    use std::collections::HashMap;
    use std::io::{Cursor, Write};
    use std::sync::{Arc, Mutex};

    use crate::{
        apply_move,
        database::DatabaseKey,
        evaluate,
        evaluator::{LOSS_SCORE, WIN_SCORE},
        explorer::LogRow,
        legal_moves, DatabaseBuilder, DatabaseEntry, Difficulty, Explorer, GameLogWriter, Hands,
        History, Move, MoveDatabase, MoveError, MoveSelector, Path, Player, PlayerMove, Position,
        Searcher, Side, FINGER_MODULUS, MAX_FINGERS,
    };

    fn hands(left: u8, right: u8) -> Hands {
        Hands::new(left, right).unwrap()
    }

    fn position(one: (u8, u8), two: (u8, u8), mover: Player) -> Position {
        Position::from_hands(hands(one.0, one.1), hands(two.0, two.1), mover).unwrap()
    }

    fn tap(attacker: Side, defender: Side) -> Move {
        Move::Tap { attacker, defender }
    }

    fn split(from: (u8, u8), to: (u8, u8)) -> Move {
        Move::Split {
            from: hands(from.0, from.1),
            to: hands(to.0, to.1),
        }
    }

    /// Every valid position of the game, terminal ones included
    fn all_positions() -> Vec<Position> {
        let mut positions = Vec::new();
        for code in 0..(5u32.pow(4)) {
            let digit = |i: u32| ((code / 5u32.pow(i)) % 5) as u8;
            for &mover in Player::ALL.iter() {
                if let Ok(position) = Position::from_hands(
                    hands(digit(0), digit(1)),
                    hands(digit(2), digit(3)),
                    mover,
                ) {
                    positions.push(position);
                }
            }
        }
        positions
    }

    fn temp_file(name: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "chopsticks_{}_{}",
            std::process::id(),
            name
        ));
        let _ = std::fs::remove_file(&path);
        path
    }

    // collects written bytes and counts flushes
    #[derive(Clone, Default)]
    struct SharedBuffer {
        bytes: Arc<Mutex<Vec<u8>>>,
        flushes: Arc<Mutex<usize>>,
    }

    impl SharedBuffer {
        fn contents(&self) -> Vec<u8> {
            self.bytes.lock().unwrap().clone()
        }

        fn flushes(&self) -> usize {
            *self.flushes.lock().unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.bytes.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            *self.flushes.lock().unwrap() += 1;
            Ok(())
        }
    }

    #[test]
    pub fn opening_tap() -> Result<()> {
        let start = Position::new();
        let next = apply_move(&start, Some(&tap(Side::Left, Side::Right)), &History::new(&start))?;

        assert_eq!(next.to_string(), "= 1-1 | 1-2");
        assert_eq!(next.mover(), Player::Two);
        assert_eq!(next, Position::from_notation("= 1-1 | 1-2", Player::Two)?);
        // the start position is untouched
        assert_eq!(start.to_string(), "= 1-1 | 1-1");
        Ok(())
    }

    #[test]
    pub fn tap_wraps_around_and_kills() {
        let before = position((3, 1), (2, 4), Player::One);

        let killed = before.apply_tap(Side::Left, Side::Left).unwrap();
        assert_eq!(killed.hands(Player::Two), hands(0, 4));
        assert_eq!(killed.hands(Player::One), hands(3, 1));

        let wrapped = before.apply_tap(Side::Left, Side::Right).unwrap();
        assert_eq!(wrapped.hands(Player::Two), hands(2, 2));
        assert_eq!(wrapped.mover(), Player::Two);
    }

    #[test]
    pub fn tap_involving_dead_hand_overflows() {
        let target_dead = position((1, 1), (1, 0), Player::One);
        assert_eq!(
            target_dead.apply_tap(Side::Left, Side::Right),
            Err(MoveError::Overflow)
        );

        let attacker_dead = position((0, 2), (1, 1), Player::One);
        assert_eq!(
            attacker_dead.apply_tap(Side::Left, Side::Left),
            Err(MoveError::Overflow)
        );
        assert!(attacker_dead.apply_tap(Side::Right, Side::Left).is_ok());
    }

    #[test]
    pub fn split_rules() {
        let four_zero = position((4, 0), (1, 1), Player::One);

        let even = four_zero.apply_split(hands(4, 0), hands(2, 2)).unwrap();
        assert_eq!(even.hands(Player::One), hands(2, 2));
        assert_eq!(even.mover(), Player::Two);

        assert_eq!(
            four_zero.apply_split(hands(4, 0), hands(0, 4)),
            Err(MoveError::Reversal)
        );
        // no-op
        assert_eq!(
            four_zero.apply_split(hands(4, 0), hands(4, 0)),
            Err(MoveError::InvalidSplit)
        );
        // fingers not conserved
        assert_eq!(
            four_zero.apply_split(hands(4, 0), hands(2, 1)),
            Err(MoveError::InvalidSplit)
        );
        // stale starting pair
        assert_eq!(
            four_zero.apply_split(hands(3, 1), hands(2, 2)),
            Err(MoveError::InvalidSplit)
        );

        let asymmetric = position((3, 1), (1, 1), Player::One);
        assert_eq!(
            asymmetric.apply_split(hands(3, 1), hands(1, 3)),
            Err(MoveError::Reversal)
        );

        // a single finger has nowhere to go
        let lone_finger = position((1, 0), (1, 1), Player::One);
        assert_eq!(
            lone_finger.apply_split(hands(1, 0), hands(0, 1)),
            Err(MoveError::InvalidSplit)
        );

        // swapping a symmetric pair is the same pair
        let pair = position((2, 2), (1, 1), Player::One);
        assert_eq!(
            pair.apply_split(hands(2, 2), hands(2, 2)),
            Err(MoveError::InvalidSplit)
        );

        // player two splits their own hands
        let second = position((1, 1), (3, 0), Player::Two);
        let moved = second.apply_split(hands(3, 0), hands(1, 2)).unwrap();
        assert_eq!(moved.hands(Player::Two), hands(1, 2));
        assert_eq!(moved.hands(Player::One), hands(1, 1));
    }

    #[test]
    pub fn missing_move() {
        let start = Position::new();
        assert_eq!(
            apply_move(&start, None, &History::new(&start)),
            Err(MoveError::NoMove)
        );
    }

    #[test]
    pub fn repetition_within_a_path() -> Result<()> {
        // both players shuffle fingers back and forth until the start returns
        let path = Path::new()
            .extend(split((1, 1), (2, 0)))?
            .extend(split((1, 1), (2, 0)))?
            .extend(split((2, 0), (1, 1)))?;
        assert_eq!(path.current().to_string(), "= 1-1 | 2-0");

        let back_to_start = split((2, 0), (1, 1));
        assert_eq!(path.current().apply(&back_to_start), Ok(Position::new()));
        assert_eq!(path.extend(back_to_start).err(), Some(MoveError::Repeat));

        // a fresh path has not seen the position and allows it
        let fresh = Path::from_position(*path.current());
        assert!(fresh.extend(back_to_start).is_ok());
        Ok(())
    }

    #[test]
    pub fn terminal_positions() {
        let lost = position((0, 0), (1, 2), Player::One);
        assert!(lost.is_terminal());
        assert_eq!(lost.winner(), Some(Player::Two));
        assert!(legal_moves(&lost).is_empty());

        let won = position((3, 0), (0, 0), Player::One);
        assert_eq!(won.winner(), Some(Player::One));
        assert!(legal_moves(&won).is_empty());
        assert_eq!(
            won.apply_split(hands(3, 0), hands(2, 1)),
            Err(MoveError::InvalidSplit)
        );

        for position in all_positions() {
            let dead = Player::ALL
                .iter()
                .filter(|&&player| position.hands(player).is_dead())
                .count();
            assert_eq!(position.is_terminal(), dead == 1);
        }
        assert!(Position::from_hands(Hands::DEAD, Hands::DEAD, Player::One).is_err());
    }

    #[test]
    pub fn all_moves_keep_hands_in_range() {
        for position in all_positions() {
            for mv in legal_moves(&position) {
                let next = position.apply(&mv).unwrap();
                for &player in Player::ALL.iter() {
                    let hands = next.hands(player);
                    assert!(hands.left() <= MAX_FINGERS && hands.right() <= MAX_FINGERS);
                }
                assert_eq!(next.mover(), position.mover().other());

                match mv {
                    Move::Tap { attacker, defender } => {
                        let added = position.mover_hands().get(attacker);
                        let old = position.opponent_hands().get(defender);
                        assert_eq!(
                            next.hands(position.mover().other()).get(defender),
                            (old + added) % FINGER_MODULUS
                        );
                    }
                    Move::Split { from, to } => {
                        assert_eq!(from.total(), to.total());
                        assert_eq!(next.hands(position.mover()), to);
                    }
                }
            }
        }
    }

    #[test]
    pub fn move_generation_order() {
        let start = Position::new();
        assert_eq!(
            legal_moves(&start).to_vec(),
            vec![
                tap(Side::Left, Side::Left),
                tap(Side::Left, Side::Right),
                tap(Side::Right, Side::Left),
                tap(Side::Right, Side::Right),
                split((1, 1), (0, 2)),
                split((1, 1), (2, 0)),
            ]
        );

        let four_zero = position((4, 0), (1, 1), Player::One);
        assert_eq!(
            legal_moves(&four_zero).to_vec(),
            vec![
                tap(Side::Left, Side::Left),
                tap(Side::Left, Side::Right),
                split((4, 0), (1, 3)),
                split((4, 0), (2, 2)),
                split((4, 0), (3, 1)),
            ]
        );

        let lone = position((0, 1), (0, 3), Player::One);
        assert_eq!(legal_moves(&lone).to_vec(), vec![tap(Side::Right, Side::Right)]);
    }

    #[test]
    pub fn notation() -> Result<()> {
        let tap_notation = "P1L>P2R";
        let parsed = tap_notation.parse::<PlayerMove>()?;
        assert_eq!(parsed, PlayerMove::new(Player::One, tap(Side::Left, Side::Right)));
        assert_eq!(parsed.to_string(), tap_notation);

        let split_notation = "Sp(P2:4|0 → 2|2)";
        let parsed = split_notation.parse::<PlayerMove>()?;
        assert_eq!(parsed, PlayerMove::new(Player::Two, split((4, 0), (2, 2))));
        assert_eq!(parsed.to_string(), split_notation);

        assert_eq!(
            tap(Side::Right, Side::Left).notation(Player::Two),
            "P2R>P1L"
        );

        let state = "= 0-4 | 2-1";
        assert_eq!(Position::from_notation(state, Player::One)?.to_string(), state);

        assert!("P1L>P1R".parse::<PlayerMove>().is_err());
        assert!("P3L>P1R".parse::<PlayerMove>().is_err());
        assert!("Sp(P1:4|0 → 5|0)".parse::<PlayerMove>().is_err());
        assert!("Sp(P1:4|0 2|2)".parse::<PlayerMove>().is_err());
        assert!(Position::from_notation("= 1-1", Player::One).is_err());
        Ok(())
    }

    #[test]
    pub fn evaluation() {
        // split potential 2 + 5, mirror bonus 5
        assert_eq!(evaluate(&Position::new()), 12);

        // fingers 4 * 5, hands 1 * 20, split potential 5 + 5,
        // opponent vulnerable 10, 4 kills the opponent's 1
        assert_eq!(evaluate(&position((4, 1), (1, 0), Player::One)), 68);

        assert_eq!(evaluate(&position((0, 0), (1, 2), Player::One)), LOSS_SCORE);
        assert_eq!(evaluate(&position((0, 0), (1, 2), Player::Two)), WIN_SCORE);

        for position in all_positions() {
            let score = evaluate(&position);
            assert!((LOSS_SCORE..=WIN_SCORE).contains(&score));
            assert_eq!(score.abs() == WIN_SCORE, position.is_terminal());
        }
    }

    #[test]
    pub fn search_terminal_and_forced_win() {
        let lost = position((0, 0), (1, 2), Player::One);
        assert_eq!(Searcher::new().best_move(&lost, 0), (None, evaluate(&lost)));
        assert_eq!(Searcher::new().best_move(&lost, 4), (None, LOSS_SCORE));

        // 2 + 3 wipes out player two's last hand
        let winning = position((2, 0), (3, 0), Player::One);
        for depth in 1..=4 {
            let (best, score) = Searcher::new().with_seed(depth as u64).best_move(&winning, depth);
            assert_eq!(best, Some(tap(Side::Left, Side::Left)));
            assert_eq!(score, WIN_SCORE);
        }
    }

    // plain negamax without pruning, skipping repeated positions the same way
    fn reference_negamax(position: &Position, depth: u32, history: &mut History) -> i32 {
        if depth == 0 || position.is_terminal() {
            return evaluate(position);
        }
        let mut best = None;
        for mv in legal_moves(position) {
            if let Ok(child) = apply_move(position, Some(&mv), history) {
                history.visit(child);
                let score = -reference_negamax(&child, depth - 1, history);
                history.forget(&child);
                best = Some(best.map_or(score, |best: i32| best.max(score)));
            }
        }
        best.unwrap_or_else(|| evaluate(position))
    }

    #[test]
    pub fn pruning_matches_full_search() {
        let positions = [
            Position::new(),
            position((2, 3), (1, 4), Player::Two),
            position((4, 1), (1, 0), Player::One),
            position((0, 3), (2, 2), Player::One),
            position((1, 2), (3, 0), Player::Two),
        ];
        for position in positions.iter() {
            for depth in 1..=4 {
                let mut history = History::new(position);
                let expected = reference_negamax(position, depth, &mut history);

                let mut searcher = Searcher::new().with_seed(11);
                let (best, score) = searcher.best_move(position, depth);
                assert_eq!(score, expected, "{} at depth {}", position, depth);

                let best = best.unwrap();
                let child = position.apply(&best).unwrap();
                let mut history = History::new(position);
                history.visit(child);
                assert_eq!(-reference_negamax(&child, depth - 1, &mut history), expected);
            }
        }
    }

    #[test]
    pub fn search_respects_game_history() -> Result<()> {
        // forbid the result of the only split so a tap has to be played
        let position = position((2, 0), (1, 1), Player::One);
        let mut history = History::new(&position);
        history.visit(position.apply(&split((2, 0), (1, 1)))?);

        let mut searcher = Searcher::new().with_history(history);
        let (best, _) = searcher.best_move(&position, 3);
        assert!(matches!(best, Some(Move::Tap { .. })));
        Ok(())
    }

    #[test]
    pub fn repeating_root_moves_are_not_warnings() -> Result<()> {
        let position = position((2, 0), (1, 1), Player::One);
        let mut history = History::new(&position);
        history.visit(position.apply(&split((2, 0), (1, 1)))?);

        let output = SharedBuffer::default();
        let writer = output.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let (best, _) = tracing::subscriber::with_default(subscriber, || {
            Searcher::new()
                .with_seed(1)
                .with_history(history)
                .best_move(&position, 2)
        });
        assert!(best.is_some());
        assert_eq!(String::from_utf8(output.contents())?, "");
        Ok(())
    }

    #[test]
    pub fn exploration_bounds() -> Result<()> {
        let (games, summary) = Explorer::new(0).explore_games()?;
        assert!(games.is_empty());
        assert_eq!(summary.paths_examined, 1);

        // the shortest game takes four plies, which a two move bound cuts off
        let (games, summary) = Explorer::new(2).explore_games()?;
        assert!(games.is_empty());
        assert_eq!(summary.paths_examined, 999);
        Ok(())
    }

    #[test]
    pub fn exploration_finds_games() -> Result<()> {
        let (games, summary) = Explorer::new(3).explore_games()?;

        assert_eq!(summary.games, 196);
        assert_eq!(games.len(), 196);
        assert_eq!(summary.paths_examined, 21015);
        assert_eq!(summary.player_one_wins, 148);
        assert_eq!(summary.player_two_wins, 48);

        let first: Vec<String> = games[0].notations().collect();
        assert_eq!(
            first,
            vec!["P1L>P2L", "P2L>P1L", "Sp(P1:3|1 → 0|4)", "P2R>P1R"]
        );

        let mut hashes = std::collections::HashSet::new();
        for game in games.iter() {
            assert!(game.plies() < 6);
            assert!(hashes.insert(game.content_hash()));

            let rows = game.rows("G0001");
            let (last, rest) = rows.split_last().unwrap();
            assert!(last.winner.is_some());
            assert_eq!(last.winner, game.winner());
            assert!(rest.iter().all(|row| row.winner.is_none()));
        }
        Ok(())
    }

    #[test]
    pub fn log_rows() -> Result<()> {
        let line = "G0007\t3\t= 3-1 | 2-1\tSp(P1:3|1 → 0|4)\t= 0-4 | 2-1\t\t";
        let row = LogRow::parse(line)?;

        assert_eq!(row.game_id, "G0007");
        assert_eq!(row.turn, 3);
        assert_eq!(row.state.mover(), Player::One);
        assert_eq!(row.next_state.mover(), Player::Two);
        assert_eq!(row.state.apply(&row.mv.mv), Ok(row.next_state));
        assert_eq!(row.winner, None);
        assert_eq!(row.to_string(), line);

        let last = LogRow::parse("G0007\t4\t= 0-4 | 2-1\tP2R>P1R\t= 0-0 | 2-1\t\tP2")?;
        assert_eq!(last.winner, Some(Player::Two));

        assert!(LogRow::parse("G0007\t4\t= 0-4 | 2-1\tP2R>P1R").is_err());
        Ok(())
    }

    #[test]
    pub fn game_log_round_trip() -> Result<()> {
        let output = SharedBuffer::default();
        let mut writer = GameLogWriter::new(output.clone())?.with_checkpoint_interval(50);
        let summary = Explorer::new(3).explore(&mut writer)?;
        assert_eq!(writer.games_written(), summary.games);
        // 196 games give checkpoints at 50, 100 and 150
        assert_eq!(output.flushes(), 3);
        writer.finish()?;
        assert_eq!(output.flushes(), 4);
        let log = output.contents();

        let text = String::from_utf8(log.clone())?;
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("GameID\tTurn\tState\tMove\tNextState\tError\tWinner")
        );
        assert_eq!(
            lines.next(),
            Some("G0001\t1\t= 1-1 | 1-1\tP1L>P2L\t= 1-1 | 2-1\t\t")
        );

        let mut from_log = DatabaseBuilder::new();
        from_log.read_log(Cursor::new(log))?;
        assert_eq!(from_log.games(), summary.games);
        assert_eq!(from_log.skipped_rows(), 0);

        let (games, _) = Explorer::new(3).explore_games()?;
        let mut from_paths = DatabaseBuilder::new();
        for game in games.iter() {
            from_paths.add_path(game);
        }

        let logged = from_log.build();
        let direct = from_paths.build();
        assert_eq!(logged.len(), direct.len());
        for (key, entry) in logged.entries() {
            let other = direct.entries().find(|(other, _)| *other == key).unwrap().1;
            assert_eq!(entry, other);
        }
        Ok(())
    }

    #[test]
    pub fn database_scores() -> Result<()> {
        let (games, _) = Explorer::new(3).explore_games()?;
        let mut builder = DatabaseBuilder::new();
        for game in games.iter() {
            builder.add_path(game);
        }
        let database = builder.build();
        assert_eq!(database.len(), 79);

        // 148 of 196 games from the start are won by player one
        let start = database.get(&Position::new()).unwrap();
        assert_eq!(start.moves, legal_moves(&Position::new()).to_vec());
        assert!(start.scores.iter().all(|&score| score == 51));
        assert_eq!(
            database.best_move(&Position::new()),
            Some((tap(Side::Left, Side::Left), 51))
        );

        for (_, entry) in database.entries() {
            assert_eq!(entry.moves.len(), entry.scores.len());
            assert!(entry.scores.iter().all(|&score| score == entry.scores[0]));
            assert!(entry.scores.iter().all(|score| (-100..=100).contains(score)));
        }
        Ok(())
    }

    #[test]
    pub fn database_round_trip() -> Result<()> {
        let mut entries = HashMap::new();
        entries.insert(
            DatabaseKey::of(&position((4, 0), (1, 1), Player::One)),
            DatabaseEntry {
                moves: vec![split((4, 0), (2, 2)), tap(Side::Left, Side::Right)],
                scores: vec![-40, 75],
            },
        );
        entries.insert(
            DatabaseKey::of(&Position::new()),
            DatabaseEntry {
                moves: vec![tap(Side::Left, Side::Right)],
                scores: vec![10],
            },
        );
        let database = MoveDatabase::from_entries(entries);

        let mut bytes = Vec::new();
        database.write_to(&mut bytes)?;
        let loaded = MoveDatabase::read_from(Cursor::new(bytes))?;

        assert_eq!(loaded.len(), 2);
        let entry = loaded.get(&position((4, 0), (1, 1), Player::One)).unwrap();
        assert_eq!(entry.scores, vec![-40, 75]);
        assert_eq!(entry.best(), Some((tap(Side::Left, Side::Right), 75)));
        assert!(!loaded.contains(&position((4, 0), (1, 1), Player::Two)));

        assert!(MoveDatabase::read_from(Cursor::new(vec![0, 0, 0, 1, 9])).is_err());
        Ok(())
    }

    #[test]
    pub fn database_fallbacks() -> Result<()> {
        let database_path = temp_file("fallback.bin");
        let log_path = temp_file("missing.tsv");

        let database = MoveDatabase::load_or_build(&database_path, &log_path);
        assert_eq!(database.len(), 1);
        assert_eq!(
            database.best_move(&Position::new()),
            Some((tap(Side::Left, Side::Right), 10))
        );

        // a corrupt database file is rebuilt, here from a missing log
        std::fs::write(&database_path, [0xFF; 4])?;
        assert!(MoveDatabase::load(&database_path).is_err());
        let database = MoveDatabase::load_or_build(&database_path, &log_path);
        assert_eq!(database.len(), 1);
        assert!(database.contains(&Position::new()));
        std::fs::remove_file(&database_path)?;

        // a log with nothing usable in it falls back as well
        std::fs::write(&log_path, "GameID\tTurn\tState\tMove\tNextState\tError\tWinner\nnonsense\n")?;
        assert_eq!(MoveDatabase::load_or_build(&database_path, &log_path).len(), 1);
        std::fs::remove_file(&log_path)?;
        Ok(())
    }

    #[test]
    pub fn database_rejects_impossible_counts() {
        assert!(MoveDatabase::read_from(Cursor::new([0xFF; 4])).is_err());

        // one entry with more candidates than any position has
        let mut bytes = vec![0, 0, 0, 1, 1, 1, 1, 1, 0, 9];
        bytes.extend_from_slice(&[0; 54]);
        assert!(MoveDatabase::read_from(Cursor::new(bytes)).is_err());
    }

    #[test]
    pub fn log_rows_with_bad_bytes_are_skipped() -> Result<()> {
        let mut writer = GameLogWriter::new(Vec::new())?;
        Explorer::new(3).explore(&mut writer)?;
        let log = writer.finish()?;

        let header_end = log.iter().position(|&byte| byte == b'\n').unwrap() + 1;
        let mut corrupted = log[..header_end].to_vec();
        corrupted.extend_from_slice(b"G0000\t1\t\xff\xfe\n");
        corrupted.extend_from_slice(&log[header_end..]);

        let mut builder = DatabaseBuilder::new();
        builder.read_log(Cursor::new(corrupted))?;
        assert_eq!(builder.skipped_rows(), 1);
        assert_eq!(builder.games(), 196);
        assert_eq!(builder.build().len(), 79);
        Ok(())
    }

    #[test]
    pub fn database_built_from_log_file() -> Result<()> {
        let database_path = temp_file("built.bin");
        let log_path = temp_file("games.tsv");

        let mut writer = GameLogWriter::create(&log_path)?;
        Explorer::new(3).explore(&mut writer)?;
        writer.finish()?;

        let built = MoveDatabase::load_or_build(&database_path, &log_path);
        assert_eq!(built.len(), 79);
        assert!(database_path.exists());

        let loaded = MoveDatabase::load(&database_path)?;
        assert_eq!(loaded.len(), 79);
        assert_eq!(loaded.best_move(&Position::new()), built.best_move(&Position::new()));

        std::fs::remove_file(&database_path)?;
        std::fs::remove_file(&log_path)?;
        Ok(())
    }

    #[test]
    pub fn selector_prefers_database() -> Result<()> {
        let start = Position::new();
        let mut selector = MoveSelector::new(MoveDatabase::minimal()).with_seed(3);

        for &difficulty in [Difficulty::Novice, Difficulty::Intermediate, Difficulty::Master].iter() {
            let selection = selector.select(&start, &History::new(&start), difficulty)?;
            assert_eq!(selection.notation(&start), "P1L>P2R");
            assert_eq!(selection.score, 10);
            assert!(selection.perfect);
        }
        Ok(())
    }

    #[test]
    pub fn selector_searches_unknown_positions() -> Result<()> {
        let position = position((2, 0), (3, 0), Player::One);
        let history = History::new(&position);
        let mut selector = MoveSelector::new(MoveDatabase::minimal()).with_seed(5);

        let selection = selector.select(&position, &history, Difficulty::Master)?;
        assert!(!selection.perfect);
        assert_eq!(selection.mv, tap(Side::Left, Side::Left));
        assert_eq!(selection.score, WIN_SCORE);

        for seed in 0..20 {
            let mut novice = MoveSelector::new(MoveDatabase::minimal()).with_seed(seed);
            let selection = novice.select(&position, &history, Difficulty::Novice)?;
            assert!(!selection.perfect);
            assert!(apply_move(&position, Some(&selection.mv), &history).is_ok());
            assert!(selection.score == 0 || selection.score == WIN_SCORE);
        }

        let lost = position_lost();
        assert_eq!(
            selector.select(&lost, &History::new(&lost), Difficulty::Master),
            Err(MoveError::NoMove)
        );
        Ok(())
    }

    fn position_lost() -> Position {
        position((0, 0), (1, 1), Player::One)
    }

    #[test]
    pub fn selector_skips_repeating_database_move() -> Result<()> {
        let start = Position::new();
        let mut history = History::new(&start);
        history.visit(start.apply(&tap(Side::Left, Side::Right))?);

        let mut selector = MoveSelector::new(MoveDatabase::minimal()).with_seed(9);
        let selection = selector.select(&start, &history, Difficulty::Intermediate)?;
        assert!(!selection.perfect);
        assert_ne!(selection.mv, tap(Side::Left, Side::Right));
        assert!(apply_move(&start, Some(&selection.mv), &history).is_ok());
        Ok(())
    }

    #[test]
    pub fn difficulty_depths() -> Result<()> {
        assert_eq!("novice".parse::<Difficulty>()?.depth(), 2);
        assert_eq!("Intermediate".parse::<Difficulty>()?.depth(), 4);
        assert_eq!("master".parse::<Difficulty>()?.depth(), 6);
        assert!("grandmaster".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Master.to_string(), "master");
        Ok(())
    }
}
