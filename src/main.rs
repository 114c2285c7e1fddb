use log::{error, info};
use std::env;
use std::process::ExitCode;

use seeker_pursuit::config::Config;
use seeker_pursuit::game::Game;
use seeker_pursuit::policy::RandomWalk;
use seeker_pursuit::turn_logger::TurnLogger;

fn main() -> ExitCode {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    // An explicit config path wins over Pursuit.toml in the working directory
    let config = match env::args().nth(1) {
        Some(path) => match Config::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Config::load_or_default(),
    };

    let board = match config
        .starting_layout()
        .and_then(|layout| layout.to_board().map_err(Into::into))
    {
        Ok(board) => board,
        Err(e) => {
            error!("Cannot start game: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Starting seeker/pursuit game (seed {})", config.game.seed);
    println!("{}\n", board);

    let logger = TurnLogger::new(config.debug.enabled, &config.debug.log_file_path);
    let mut policy = RandomWalk::seeded(config.game.seed);
    let mut game = Game::new(board).with_logger(logger);
    let report = game.play(
        &config.search_limits(),
        config.timing.game_time_limit(),
        &mut policy,
    );

    println!("{}\n", report.board);
    println!("Outcome: {}", report.status);
    println!("Turns: {}", report.turns);
    println!("Scores: {:?}", report.score_history);

    ExitCode::SUCCESS
}
