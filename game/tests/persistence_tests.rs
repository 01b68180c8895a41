use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use tile2048::board::{Board, MAX_TILE};
use tile2048::moves::{MAX_SCORE, move_left};
use tile2048::persist::{
    PersistError, PersistedState, SAVE_IMAGE_LEN, deserialize, read_save_file, serialize,
    write_save_file,
};
use tile2048::undo::UndoHistory;
use tile2048::{Direction, GameSession, SpawnMode};

fn unique_save_path(test_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "tile2048_{test_name}_{}_{nanos}.dat",
        std::process::id()
    ))
}

fn played_session() -> GameSession {
    let mut session = GameSession::with_seed(SpawnMode::Random, 99);
    session.start_new_game(SpawnMode::Random);
    for dir in [
        Direction::Left,
        Direction::Down,
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ] {
        session.play_turn(dir);
    }
    session
}

#[test]
fn serialize_then_deserialize_reproduces_every_field() {
    let mut history = UndoHistory::new();
    history.push(&Board::from_rows([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]), 0);
    history.push(&Board::from_rows([[4, 2, 0, 0], [0; 4], [0; 4], [0; 4]]), 4);
    let state = PersistedState {
        board: Board::from_rows([[4, 2, 0, 0], [0; 4], [0; 4], [0; 4]]),
        score: 4,
        history,
    };

    let bytes = serialize(&state).expect("encodable state");
    assert_eq!(bytes.len(), SAVE_IMAGE_LEN);
    let restored = deserialize(&bytes).expect("decode save image");
    assert_eq!(restored, state);
    assert_eq!(restored.history.write_index(), state.history.write_index());
    assert_eq!(restored.history.count(), 2);
}

#[test]
fn wrong_length_is_rejected() {
    let bytes = serialize(&played_session().persisted_state()).expect("encodable state");

    for len in [0, SAVE_IMAGE_LEN - 1, SAVE_IMAGE_LEN + 1] {
        let mut blob = bytes.clone();
        blob.resize(len, 0);
        assert!(matches!(
            deserialize(&blob),
            Err(PersistError::Length { expected, actual }) if expected == SAVE_IMAGE_LEN && actual == len
        ));
    }
}

#[test]
fn save_and_load_round_trip_preserves_undo_history() {
    let path = unique_save_path("round_trip");
    let original = played_session();
    assert!(original.save_to_file(&path));

    let mut loaded = GameSession::with_seed(SpawnMode::Random, 1);
    loaded.start_new_game(SpawnMode::Random);
    assert!(loaded.load_from_file(&path));
    assert_eq!(loaded.persisted_state(), original.persisted_state());
    assert_eq!(
        loaded.state_digest().expect("digest"),
        original.state_digest().expect("digest")
    );

    let mut expected = original.clone();
    while expected.undo() {
        assert!(loaded.undo());
        assert_eq!(loaded.board(), expected.board());
        assert_eq!(loaded.current_score(), expected.current_score());
    }
    assert!(!loaded.undo());

    let _ = fs::remove_file(path);
}

#[test]
fn truncated_file_fails_and_leaves_live_state_untouched() {
    let path = unique_save_path("truncated");
    let bytes = serialize(&played_session().persisted_state()).expect("encodable state");
    fs::write(&path, &bytes[..bytes.len() - 4]).expect("write truncated save");

    let mut live = GameSession::with_seed(SpawnMode::Deterministic, 0);
    live.start_new_game(SpawnMode::Deterministic);
    live.play_turn(Direction::Right);
    let before = live.persisted_state();

    assert!(!live.load_from_file(&path));
    assert!(matches!(
        live.try_load(&path),
        Err(PersistError::Length { .. })
    ));
    assert_eq!(live.persisted_state(), before);

    let _ = fs::remove_file(path);
}

#[test]
fn missing_file_is_an_io_error() {
    let path = unique_save_path("missing");
    let mut live = GameSession::with_seed(SpawnMode::Deterministic, 0);
    live.start_new_game(SpawnMode::Deterministic);
    let before = live.persisted_state();

    assert!(matches!(live.try_load(&path), Err(PersistError::Io(_))));
    assert_eq!(live.persisted_state(), before);
}

#[test]
fn save_into_missing_directory_creates_it() {
    let dir = unique_save_path("nested_dir");
    let path = dir.join("slot").join("save.dat");
    let state = played_session().persisted_state();

    write_save_file(&path, &state).expect("write save");
    assert_eq!(read_save_file(&path).expect("read save"), state);
    assert!(!path.with_file_name("save.dat.tmp").exists());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn save_to_unwritable_location_reports_failure() {
    let blocker = unique_save_path("blocker");
    fs::write(&blocker, b"not a directory").expect("write blocker file");
    let path = blocker.join("save.dat");

    let session = played_session();
    assert!(!session.save_to_file(&path));

    let _ = fs::remove_file(blocker);
}

fn near_ceiling_state(row: [u32; 4], score: u32) -> PersistedState {
    let board = Board::from_rows([row, [0; 4], [0; 4], [0; 4]]);
    let mut history = UndoHistory::new();
    history.push(&board, score);
    let bytes = serialize(&PersistedState {
        board,
        score,
        history,
    })
    .expect("encodable state");
    deserialize(&bytes).expect("decode save image")
}

#[test]
fn score_near_the_ceiling_still_round_trips_after_a_merge() {
    let mut state = near_ceiling_state([2, 2, 0, 0], MAX_SCORE - 2);
    assert!(move_left(&mut state.board, &mut state.score));
    assert_eq!(state.score, MAX_SCORE);

    let restored = deserialize(&serialize(&state).expect("encodable state"))
        .expect("decode save image");
    assert_eq!(restored, state);
}

#[test]
fn largest_tiles_stay_loadable_after_a_move() {
    let mut state = near_ceiling_state([MAX_TILE, MAX_TILE, 0, 0], 0);
    assert!(!move_left(&mut state.board, &mut state.score));
    assert_eq!(state.board.rows()[0], [MAX_TILE, MAX_TILE, 0, 0]);

    let restored = deserialize(&serialize(&state).expect("encodable state"))
        .expect("decode save image");
    assert_eq!(restored, state);
}

#[test]
fn unencodable_state_is_not_reported_as_saved() {
    let path = unique_save_path("unencodable");
    let state = PersistedState {
        board: Board::from_rows([[1 << 31, 0, 0, 0], [0; 4], [0; 4], [0; 4]]),
        score: 0,
        history: UndoHistory::new(),
    };

    assert!(matches!(
        write_save_file(&path, &state),
        Err(PersistError::Unencodable { .. })
    ));
    assert!(!path.exists());
}

#[test]
fn save_leaves_sibling_files_alone() {
    let dir = unique_save_path("siblings");
    fs::create_dir_all(&dir).expect("create save dir");
    let sibling = dir.join("game.tmp");
    fs::write(&sibling, b"unrelated").expect("write sibling");
    let state = played_session().persisted_state();

    write_save_file(&dir.join("game.dat"), &state).expect("write save");
    assert_eq!(fs::read(&sibling).expect("sibling survives"), b"unrelated");

    let tmp_named = dir.join("slot.tmp");
    write_save_file(&tmp_named, &state).expect("write save");
    assert_eq!(read_save_file(&tmp_named).expect("read save"), state);
    assert!(!dir.join("slot.tmp.tmp").exists());

    let _ = fs::remove_dir_all(dir);
}
