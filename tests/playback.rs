use std::path::Path;
use voice_assistant::{NoopPlayer, OsKind, Player, SystemPlayer};

#[test]
fn missing_file_and_players_never_panic() {
    let player = SystemPlayer::new();
    let missing = std::env::temp_dir().join(format!("absent-{}.mp3", uuid::Uuid::new_v4()));
    for os in [
        OsKind::MacOs,
        OsKind::Windows,
        OsKind::Linux,
        OsKind::Other("plan9".into()),
    ] {
        player.play(&missing, &os);
    }
}

#[test]
fn players_work_behind_a_box() {
    let players: Vec<Box<dyn Player>> = vec![Box::new(NoopPlayer), Box::new(SystemPlayer::new())];
    for player in &players {
        player.play(Path::new("nowhere.wav"), &OsKind::Other("haiku".into()));
    }
}
