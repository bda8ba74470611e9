use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stderr, Stderr};
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::{interval, sleep_until, Instant};

use crate::audio::{AudioPlayer, Cue};
use crate::game::{Consumed, GameConfig, GameEngine, TickReport};
use crate::input::{InputHandler, KeyAction};
use crate::render::Renderer;
use crate::score::HighScoreStore;

/// Ties the game core to the terminal: input, tick and render timers,
/// the special-food countdown, audio, and high-score persistence.
pub struct App {
    engine: GameEngine,
    store: HighScoreStore,
    audio: AudioPlayer,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    /// Token and deadline of the one live special-food countdown
    special_expiry: Option<(u64, Instant)>,
}

impl App {
    pub fn new(config: GameConfig, high_score_file: PathBuf, muted: bool) -> Self {
        let store = HighScoreStore::load(high_score_file);
        let engine = GameEngine::new(config, store.best());

        Self {
            engine,
            store,
            audio: AudioPlayer::new(muted),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            special_expiry: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_timer = interval(self.engine.config().tick_interval());

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        loop {
            let expiry_at = self.special_expiry.map(|(_, at)| at);

            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                // Game logic tick
                _ = tick_timer.tick() => {
                    self.update_game();
                }

                // Special food expiry
                _ = async {
                    match expiry_at {
                        Some(at) => sleep_until(at).await,
                        None => std::future::pending().await,
                    }
                } => {
                    if let Some((token, _)) = self.special_expiry.take() {
                        self.engine.on_special_food_expiry(token);
                    }
                }

                // Render frame
                _ = render_timer.tick() => {
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.engine, self.audio.music_enabled());
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return;
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Turn(direction) => {
                    self.engine.set_direction(direction);
                }
                KeyAction::Start => {
                    self.start_game();
                }
                KeyAction::ToggleMusic => {
                    self.audio.toggle_music();
                }
                KeyAction::Quit => {
                    self.should_quit = true;
                }
                KeyAction::None => {}
            }
        }
    }

    fn update_game(&mut self) {
        let Some(report) = self.engine.tick() else {
            return;
        };
        self.apply_report(&report);
    }

    fn apply_report(&mut self, report: &TickReport) {
        match report.consumed {
            Consumed::Normal => self.audio.play(Cue::AteNormal),
            Consumed::Special => self.audio.play(Cue::AteSpecial),
            Consumed::None => {}
        }

        if let Some(token) = report.armed_special {
            self.arm_special_countdown(token);
        }

        if let Some(over) = &report.game_over {
            self.special_expiry = None;
            self.audio.stop_music();
            self.audio.play(Cue::GameOver);
            if over.new_record {
                // A failed write degrades to a session-only record
                self.store.record(over.final_score).ok();
            }
        }
    }

    fn start_game(&mut self) {
        let armed = self.engine.start();
        self.special_expiry = None;
        if let Some(token) = armed {
            self.arm_special_countdown(token);
        }
        self.audio.start_music();
    }

    fn arm_special_countdown(&mut self, token: u64) {
        let deadline = Instant::now() + self.engine.config().special_food_duration();
        self.special_expiry = Some((token, deadline));
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GamePhase;
    use tempfile::TempDir;

    fn test_app(dir: &TempDir) -> App {
        App::new(
            GameConfig::default(),
            dir.path().join("scores.json"),
            true,
        )
    }

    #[test]
    fn test_app_starts_on_pre_game_board() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir);
        assert_eq!(app.engine.phase(), GamePhase::NotStarted);
        assert_eq!(app.engine.best_score(), 0);
    }

    #[test]
    fn test_start_game_enters_running() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.start_game();
        assert_eq!(app.engine.phase(), GamePhase::Running);
        assert_eq!(app.engine.score(), 0);
    }

    #[test]
    fn test_game_over_persists_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scores.json");
        let mut app = App::new(GameConfig::default(), path.clone(), true);
        app.start_game();

        let report = TickReport {
            consumed: Consumed::None,
            armed_special: None,
            game_over: Some(crate::game::GameOverReport {
                final_score: 15,
                best_score: 15,
                new_record: true,
            }),
            snapshot: app.engine.snapshot(),
        };
        app.apply_report(&report);

        assert_eq!(HighScoreStore::load(&path).best(), 15);
    }

    #[test]
    fn test_countdown_armed_and_cleared() {
        let dir = TempDir::new().unwrap();
        let mut app = test_app(&dir);
        app.start_game();

        app.arm_special_countdown(7);
        assert!(app.special_expiry.is_some());

        let report = TickReport {
            consumed: Consumed::None,
            armed_special: None,
            game_over: Some(crate::game::GameOverReport {
                final_score: 0,
                best_score: 0,
                new_record: false,
            }),
            snapshot: app.engine.snapshot(),
        };
        app.apply_report(&report);
        assert!(app.special_expiry.is_none());
    }
}
