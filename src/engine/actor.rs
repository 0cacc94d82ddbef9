use super::{EngineError, MoveEngine, MovesConsidered, PlannedMove};
use crate::game::{GameModel, Side};
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum EngineCommand<G> {
    SetLevel(u32),
    Generate { request: u64, game: G, side: Side },
    Quit,
}

#[derive(Debug)]
pub enum EngineEvent {
    Move {
        request: u64,
        result: Result<PlannedMove, EngineError>,
    },
    Terminated,
}

/// Owns a [`MoveEngine`] on its own thread and serves requests one at a time.
pub struct EngineActor<G, E> {
    cmd_rx: mpsc::Receiver<EngineCommand<G>>,
    event_tx: mpsc::Sender<EngineEvent>,
    engine: E,
    progress: MovesConsidered,
}

impl<G, E> EngineActor<G, E>
where
    G: GameModel,
    E: MoveEngine<G>,
{
    pub fn spawn(engine: E) -> EngineLink<G> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand<G>>();
        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();
        let progress = MovesConsidered::default();

        let mut actor = EngineActor {
            cmd_rx,
            event_tx,
            engine,
            progress: progress.clone(),
        };
        thread::spawn(move || actor.run());

        EngineLink {
            cmd_tx,
            event_rx,
            progress,
            disconnected: Cell::new(false),
        }
    }

    fn run(&mut self) {
        tracing::info!("EngineActor run loop started");
        loop {
            let cmd = match self.cmd_rx.recv() {
                Ok(cmd) => cmd,
                Err(_) => {
                    tracing::info!("Command channel closed, shutting down engine");
                    break;
                }
            };

            match cmd {
                EngineCommand::SetLevel(level) => {
                    tracing::debug!("Setting engine level to {}", level);
                    if let Err(e) = self.engine.set_level(level) {
                        tracing::error!("Failed to set engine level: {}", e);
                    }
                }
                EngineCommand::Generate { request, game, side } => {
                    self.progress.reset();
                    tracing::debug!("Request {}: generating move for {:?}", request, side);

                    let engine = &mut self.engine;
                    let progress = &self.progress;
                    let result = panic::catch_unwind(AssertUnwindSafe(|| {
                        engine.generate_move(&game, side, progress)
                    }))
                    .unwrap_or_else(|payload| Err(EngineError::Panicked(panic_message(&*payload))));

                    if self.event_tx.send(EngineEvent::Move { request, result }).is_err() {
                        break;
                    }
                }
                EngineCommand::Quit => break,
            }
        }

        self.engine.shutdown();
        tracing::debug!("EngineActor stopped");
        let _ = self.event_tx.send(EngineEvent::Terminated);
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// The session's handle on a running engine actor.
///
/// Once the actor thread is gone the link reports [`EngineEvent::Terminated`]
/// exactly once and stays quiet afterwards.
pub struct EngineLink<G> {
    cmd_tx: mpsc::Sender<EngineCommand<G>>,
    event_rx: mpsc::Receiver<EngineEvent>,
    progress: MovesConsidered,
    disconnected: Cell<bool>,
}

impl<G> EngineLink<G> {
    pub fn set_level(&self, level: u32) {
        if self.cmd_tx.send(EngineCommand::SetLevel(level)).is_err() {
            tracing::warn!("Engine is gone; level {} not applied", level);
        }
    }

    pub fn request_move(&self, request: u64, game: G, side: Side) -> Result<(), EngineError> {
        self.cmd_tx
            .send(EngineCommand::Generate { request, game, side })
            .map_err(|_| EngineError::Terminated)
    }

    pub fn moves_considered(&self) -> u64 {
        self.progress.get()
    }

    pub fn try_event(&self) -> Option<EngineEvent> {
        self.observe(match self.event_rx.try_recv() {
            Ok(event) => Some(event),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => self.disconnect(),
        })
    }

    pub fn wait_event(&self, timeout: Duration) -> Option<EngineEvent> {
        if self.disconnected.get() {
            return None;
        }
        self.observe(match self.event_rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => self.disconnect(),
        })
    }

    fn observe(&self, event: Option<EngineEvent>) -> Option<EngineEvent> {
        if matches!(event, Some(EngineEvent::Terminated)) {
            self.disconnected.set(true);
        }
        event
    }

    fn disconnect(&self) -> Option<EngineEvent> {
        if self.disconnected.replace(true) {
            None
        } else {
            Some(EngineEvent::Terminated)
        }
    }
}

impl<G> Drop for EngineLink<G> {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Quit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ChessGame, Position};

    struct Counting {
        level: u32,
    }

    impl MoveEngine<ChessGame> for Counting {
        fn set_level(&mut self, level: u32) -> Result<(), EngineError> {
            self.level = level;
            Ok(())
        }

        fn generate_move(
            &mut self,
            _game: &ChessGame,
            _side: Side,
            progress: &MovesConsidered,
        ) -> Result<PlannedMove, EngineError> {
            progress.add(u64::from(self.level) + 1);
            Ok(PlannedMove {
                from: "e7".parse::<Position>().unwrap(),
                to: "e5".parse::<Position>().unwrap(),
            })
        }
    }

    #[test]
    fn test_actor_answers_requests_in_order() {
        let link = EngineActor::spawn(Counting { level: 0 });
        link.set_level(4);
        link.request_move(7, ChessGame::new(), Side::Black).unwrap();

        match link.wait_event(Duration::from_secs(5)) {
            Some(EngineEvent::Move { request, result }) => {
                assert_eq!(request, 7);
                assert_eq!(result.unwrap().to, "e5".parse::<Position>().unwrap());
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(link.moves_considered(), 5);
    }

    /// Panics while searching; the level hook panics too when asked for `u32::MAX`.
    struct Explosive;

    impl MoveEngine<ChessGame> for Explosive {
        fn set_level(&mut self, level: u32) -> Result<(), EngineError> {
            assert_ne!(level, u32::MAX, "level hook exploded");
            Ok(())
        }

        fn generate_move(
            &mut self,
            _game: &ChessGame,
            _side: Side,
            _progress: &MovesConsidered,
        ) -> Result<PlannedMove, EngineError> {
            panic!("search exploded")
        }
    }

    #[test]
    fn test_search_panic_becomes_error_answer() {
        let link = EngineActor::spawn(Explosive);
        for request in 0..2 {
            link.request_move(request, ChessGame::new(), Side::White).unwrap();
            match link.wait_event(Duration::from_secs(5)) {
                Some(EngineEvent::Move { request: answered, result }) => {
                    assert_eq!(answered, request);
                    match result {
                        Err(EngineError::Panicked(msg)) => assert!(msg.contains("search exploded")),
                        other => panic!("unexpected result: {:?}", other),
                    }
                }
                other => panic!("unexpected event: {:?}", other),
            }
        }
    }

    #[test]
    fn test_dead_actor_reports_termination_once() {
        let link = EngineActor::spawn(Explosive);
        link.set_level(u32::MAX);

        assert!(matches!(
            link.wait_event(Duration::from_secs(5)),
            Some(EngineEvent::Terminated)
        ));
        assert!(link.try_event().is_none());
        assert!(link.try_event().is_none());
        assert!(link.wait_event(Duration::from_millis(10)).is_none());
        assert!(matches!(
            link.request_move(0, ChessGame::new(), Side::White),
            Err(EngineError::Terminated)
        ));
    }

    #[test]
    fn test_counter_resets_per_request() {
        let link = EngineActor::spawn(Counting { level: 1 });
        for request in 0..2 {
            link.request_move(request, ChessGame::new(), Side::Black).unwrap();
            assert!(matches!(
                link.wait_event(Duration::from_secs(5)),
                Some(EngineEvent::Move { .. })
            ));
            assert_eq!(link.moves_considered(), 2);
        }
    }
}
